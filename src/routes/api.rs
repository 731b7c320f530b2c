use crate::body::BytesBody;
use crate::routes::{not_found, State};
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;

#[derive(Serialize)]
struct Hello<'a> {
    message: &'a str,
}

/// Dispatches on the path with the `/api` prefix already removed.
pub fn respond(path: &str, state: &State) -> Response<BytesBody> {
    match path {
        "/" => {
            let message = format!("{} is running", state.name);
            log::debug!("API {} -> [hello]", path);
            json(&Hello { message: &message })
        }
        _ => {
            log::debug!("API {} -> [unknown endpoint]", path);
            not_found()
        }
    }
}

fn json<T: Serialize>(value: &T) -> Response<BytesBody> {
    match serde_json::to_vec(value) {
        Ok(bytes) => {
            let mut resp = Response::new(BytesBody::from(bytes));
            resp.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            resp
        }
        Err(e) => {
            log::error!("Failed to marshal response: {}", e);
            let mut resp = Response::new(BytesBody::from("failed to marshal response\n"));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
            resp
        }
    }
}
