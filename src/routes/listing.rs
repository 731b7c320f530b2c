use crate::assets::{AssetStore, Child};
use std::fmt::Write;

/// HTML index of a directory that has no `index.html` of its own.
pub fn render(store: &AssetStore, dir: &str) -> String {
    let mut entries = String::new();
    for child in store.children(dir) {
        // writing to a String can't fail
        let _ = match child {
            Child::Dir { name } => write!(
                entries,
                "<div><a href=\"{href}/\">{name}/</a></div>",
                href = urlencoding::encode(name),
                name = escape(name),
            ),
            Child::File { name, len } => write!(
                entries,
                "<div><a href=\"{href}\">{name}</a> {len} bytes</div>",
                href = urlencoding::encode(name),
                name = escape(name),
                len = len,
            ),
        };
    }

    format!(
        concat!(
            "<!DOCTYPE html>",
            "<html>",
            "<head><meta name=\"viewport\" content=\"width=device-width\"></head>",
            "<body>",
            "<h1>/{dir}</h1>",
            "{entries}",
            "</body>",
            "</html>",
        ),
        dir = escape(dir),
        entries = entries
    )
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
