use std::borrow::Cow;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("request path is not valid utf-8 once decoded")]
pub struct PathError;

/// Percent-decodes a request path and resolves it to a store-relative path.
///
/// `.` and empty segments are dropped and `..` pops a segment, but never above the root,
/// so the result can't name anything outside the store.
pub fn to_relative(raw: &str) -> Result<String, PathError> {
    let decoded = urlencoding::decode(raw).map_err(|_| PathError)?;
    Ok(clean(&decoded).trim_start_matches('/').to_string())
}

/// Lexically normalizes `path` as if it were rooted at `/`. Always returns an absolute path
/// without a trailing slash (except for the root itself).
pub fn clean(path: &str) -> Cow<'_, str> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }

    let cleaned = format!("/{}", segments.join("/"));
    if cleaned == path {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(cleaned)
    }
}
