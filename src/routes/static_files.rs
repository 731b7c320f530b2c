use crate::assets::{Entry, INDEX};
use crate::body::BytesBody;
use crate::path;
use crate::routes::{listing, not_found, redirect, State};
use headers::{AcceptRanges, ContentLength, ContentRange, HeaderMapExt, Range};
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use std::cmp;
use std::ops::Bound;

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";
const IMMUTABLE: &str = "public, max-age=31536000, immutable";
const HTML: &str = "text/html; charset=utf-8";

pub fn get<B>(req: &Request<B>, state: &State) -> Response<BytesBody> {
    let raw = req.uri().path();
    if raw == "/" {
        return index(req, state);
    }

    let relative = match path::to_relative(raw) {
        Ok(relative) => relative,
        Err(e) => {
            log::debug!("{} {} -> [bad path] {}", req.method(), req.uri(), e);
            let mut resp = Response::new(BytesBody::empty());
            *resp.status_mut() = StatusCode::BAD_REQUEST;
            return resp;
        }
    };

    match state.assets.open(&relative) {
        Err(e) if relative.contains('.') => {
            log::debug!("{} {} -> [asset missing] {}", req.method(), req.uri(), e);
            not_found()
        }
        Err(_) => {
            log::debug!("{} {} -> [client route]", req.method(), req.uri());
            index(req, state)
        }
        Ok(Entry::Dir) if !raw.ends_with('/') => {
            // built from the cleaned path, so it can't start with `//` and leave this host
            let dir = relative
                .split('/')
                .map(urlencoding::encode)
                .collect::<Vec<_>>()
                .join("/");
            let location = match req.uri().query() {
                Some(query) => format!("/{}/?{}", dir, query),
                None => format!("/{}/", dir),
            };
            log::debug!("{} {} -> [directory] {}", req.method(), req.uri(), location);
            redirect(&location)
        }
        Ok(Entry::Dir) => directory(req, state, &relative),
        Ok(Entry::File(file)) => {
            let cache = if relative == INDEX { NO_CACHE } else { IMMUTABLE };
            file_response(req, file, &content_type(&relative), cache)
        }
    }
}

fn index<B>(req: &Request<B>, state: &State) -> Response<BytesBody> {
    match state.assets.index() {
        Ok(file) => file_response(req, file, HTML, NO_CACHE),
        Err(e) => {
            log::warn!("{} {} -> [no index] {}", req.method(), req.uri(), e);
            not_found()
        }
    }
}

fn directory<B>(req: &Request<B>, state: &State, dir: &str) -> Response<BytesBody> {
    let dir_index = match dir {
        "" => INDEX.to_string(),
        dir => format!("{}/{}", dir, INDEX),
    };
    if let Ok(file) = state.assets.read(&dir_index) {
        return file_response(req, file, HTML, NO_CACHE);
    }

    log::debug!("{} {} -> [listing]", req.method(), req.uri());
    let html = Bytes::from(listing::render(&state.assets, dir));
    file_response(req, &html, HTML, NO_CACHE)
}

fn content_type(path: &str) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() == mime_guess::mime::TEXT && mime.get_param("charset").is_none() {
        format!("{}; charset=utf-8", mime)
    } else {
        mime.to_string()
    }
}

/// Answers with `file`, or the part of it named by a `Range` header. HEAD gets the headers only.
fn file_response<B>(
    req: &Request<B>,
    file: &Bytes,
    content_type: &str,
    cache: &'static str,
) -> Response<BytesBody> {
    let file_len = file.len();
    let range = requested_range(req, file_len as u64);

    let (status, body, content_range) = match range {
        None => (StatusCode::OK, file.clone(), None),
        Some(Some((start, end))) => {
            let start_inclusive = match start {
                Bound::Included(start) => start as usize,
                Bound::Excluded(start) => (start as usize).saturating_add(1),
                Bound::Unbounded => 0,
            };
            let end_exclusive = match end {
                Bound::Included(end) => (end as usize).saturating_add(1),
                Bound::Excluded(end) => end as usize,
                Bound::Unbounded => file_len,
            };
            // a range running past the end is cut short, one starting past it can't be served
            let end_exclusive = cmp::min(end_exclusive, file_len);
            let content_range = if start_inclusive < end_exclusive {
                ContentRange::bytes(
                    (start_inclusive as u64)..(end_exclusive as u64),
                    file_len as u64,
                )
                .ok()
            } else {
                None
            };
            match content_range {
                Some(content_range) => {
                    log::debug!(
                        "{} {} -> [range {}..{} of {} bytes]",
                        req.method(),
                        req.uri(),
                        start_inclusive,
                        end_exclusive,
                        file_len
                    );
                    (
                        StatusCode::PARTIAL_CONTENT,
                        file.slice(start_inclusive..end_exclusive),
                        Some(content_range),
                    )
                }
                None => unsatisfiable(req, file_len),
            }
        }
        Some(None) => unsatisfiable(req, file_len),
    };

    let body_len = body.len();
    let mut resp = Response::new(if req.method() == Method::HEAD {
        BytesBody::empty()
    } else {
        BytesBody::new(body)
    });
    *resp.status_mut() = status;
    let headers = resp.headers_mut();
    headers.typed_insert(ContentLength(body_len as u64));
    headers.typed_insert(AcceptRanges::bytes());
    if let Some(content_range) = content_range {
        headers.typed_insert(content_range);
    }
    if status != StatusCode::RANGE_NOT_SATISFIABLE {
        if let Ok(content_type) = HeaderValue::from_str(content_type) {
            headers.insert(header::CONTENT_TYPE, content_type);
        }
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache));
    }
    resp
}

/// `None` without a usable `Range` header, `Some(None)` when it can't be satisfied.
fn requested_range<B>(
    req: &Request<B>,
    file_len: u64,
) -> Option<Option<(Bound<u64>, Bound<u64>)>> {
    let range = req.headers().typed_get::<Range>()?;
    if file_len == 0 {
        return None;
    }
    let first = range.satisfiable_ranges(file_len).next();
    match first {
        Some(bounds) => Some(Some(bounds)),
        // a suffix longer than the file asks for all of it
        None if is_long_suffix(req, file_len) => {
            Some(Some((Bound::Included(0), Bound::Unbounded)))
        }
        None => Some(None),
    }
}

fn is_long_suffix<B>(req: &Request<B>, file_len: u64) -> bool {
    req.headers()
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("bytes=-"))
        .and_then(|n| n.trim().parse::<u64>().ok())
        .map_or(false, |n| n > file_len)
}

fn unsatisfiable<B>(
    req: &Request<B>,
    file_len: usize,
) -> (StatusCode, Bytes, Option<ContentRange>) {
    log::debug!("{} {} -> [bad range]", req.method(), req.uri());
    (
        StatusCode::RANGE_NOT_SATISFIABLE,
        Bytes::new(),
        Some(ContentRange::unsatisfied_bytes(file_len as u64)),
    )
}
