use crate::assets::AssetStore;
use crate::body::BytesBody;
use crate::path;
use hyper::header::{self, HeaderValue};
use hyper::{Method, Request, Response, StatusCode};
use std::time::Instant;

mod api;
mod cors;
mod listing;
mod static_files;

pub struct State {
    /// Shown in the health message, e.g. "sampha API is running".
    pub name: &'static str,
    pub assets: AssetStore,
}

pub fn log_endpoints() {
    log::info!("Available endpoints:");
    log::info!("  GET  /api/  - health check");
    log::info!("  GET  /      - web client (unknown routes fall back to index.html)");
}

pub async fn respond_to_request<B>(req: Request<B>, state: &State) -> Response<BytesBody> {
    let start = Instant::now();

    let mut resp = if req.method() == Method::OPTIONS {
        let mut resp = Response::new(BytesBody::empty());
        *resp.status_mut() = StatusCode::NO_CONTENT;
        resp
    } else {
        route(&req, state)
    };
    cors::apply(resp.headers_mut());

    log::info!(
        "{} {} -> {} in {:?}",
        req.method(),
        req.uri().path(),
        resp.status(),
        start.elapsed()
    );
    resp
}

fn route<B>(req: &Request<B>, state: &State) -> Response<BytesBody> {
    let path = dispatch_path(req.uri().path());
    match path.strip_prefix("/api") {
        Some("") => redirect("/api/"),
        Some(rest) if rest.starts_with('/') => api::respond(rest, state),
        _ => static_files::get(req, state),
    }
}

/// The cleaned request path used to pick a handler, keeping any trailing slash,
/// so `//api/` and `/x/../api/` reach the API and `/api/../index.html` doesn't.
fn dispatch_path(raw: &str) -> String {
    let cleaned = path::clean(raw);
    if raw.ends_with('/') && cleaned != "/" {
        format!("{}/", cleaned)
    } else {
        cleaned.into_owned()
    }
}

fn not_found() -> Response<BytesBody> {
    let mut resp = Response::new(BytesBody::from("404 page not found\n"));
    *resp.status_mut() = StatusCode::NOT_FOUND;
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    resp
}

fn redirect(location: &str) -> Response<BytesBody> {
    let mut resp = Response::new(BytesBody::empty());
    match HeaderValue::from_str(location) {
        Ok(location) => {
            *resp.status_mut() = StatusCode::MOVED_PERMANENTLY;
            resp.headers_mut().insert(header::LOCATION, location);
        }
        Err(e) => {
            log::warn!("Invalid redirect location {:?}: {}", location, e);
            *resp.status_mut() = StatusCode::BAD_REQUEST;
        }
    }
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::body::Bytes;

    const INDEX_HTML: &str = "<!DOCTYPE html><div id=app></div>";

    fn state() -> State {
        State {
            name: "sampha API",
            assets: AssetStore::from_files([
                ("index.html", INDEX_HTML),
                (".keep", ""),
                ("assets/index-9c3f05e1.js", "export {}"),
                ("assets/logo.svg", "<svg/>"),
            ]),
        }
    }

    async fn send(method: Method, uri: &str, state: &State) -> (Response<()>, Bytes) {
        let req = Request::builder().method(method).uri(uri).body(()).unwrap();
        let (parts, body) = respond_to_request(req, state).await.into_parts();
        let body = body.collect().await.unwrap().to_bytes();
        (Response::from_parts(parts, ()), body)
    }

    fn assert_cors(resp: &Response<()>) {
        let headers = resp.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, DELETE, OPTIONS, PATCH"
        );
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Accept, Authorization, Content-Type, X-CSRF-Token"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "false");
    }

    #[tokio::test]
    async fn root_serves_index_uncached() {
        let (resp, body) = send(Method::GET, "/", &state()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(
            resp.headers()[header::CACHE_CONTROL],
            "no-cache, no-store, must-revalidate"
        );
        assert_cors(&resp);
        assert_eq!(&body[..], INDEX_HTML.as_bytes());
    }

    #[tokio::test]
    async fn root_without_index_is_404() {
        let state = State {
            name: "sampha API",
            assets: AssetStore::from_files([("assets/app.js", "x")]),
        };
        let (resp, _) = send(Method::GET, "/", &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let (resp, _) = send(Method::GET, "/dashboard", &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn stored_assets_are_served_with_long_cache() {
        let state = state();
        for (uri, contents) in [
            ("/assets/index-9c3f05e1.js", "export {}"),
            ("/assets/logo.svg", "<svg/>"),
        ] {
            let (resp, body) = send(Method::GET, uri, &state).await;
            assert_eq!(resp.status(), StatusCode::OK, "{}", uri);
            assert_eq!(
                resp.headers()[header::CACHE_CONTROL],
                "public, max-age=31536000, immutable"
            );
            assert_eq!(&body[..], contents.as_bytes());
        }
    }

    #[tokio::test]
    async fn missing_file_with_dot_is_404() {
        let (resp, body) = send(Method::GET, "/missing.js", &state()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(&body[..], b"404 page not found\n");
        assert_cors(&resp);

        // known limitation: a client route containing a dot looks like a file
        let (resp, _) = send(Method::GET, "/user/john.doe", &state()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn client_routes_fall_back_to_index() {
        let (resp, body) = send(Method::GET, "/dashboard/settings", &state()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CACHE_CONTROL],
            "no-cache, no-store, must-revalidate"
        );
        assert_eq!(&body[..], INDEX_HTML.as_bytes());
    }

    #[tokio::test]
    async fn directory_without_slash_redirects() {
        let (resp, body) = send(Method::GET, "/assets", &state()).await;
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()[header::LOCATION], "/assets/");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn traversal_cannot_escape() {
        // resolves to `etc/passwd` inside the store: a miss without a dot
        let (resp, body) = send(Method::GET, "/../../etc/passwd", &state()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&body[..], INDEX_HTML.as_bytes());

        let (resp, _) = send(Method::GET, "/../../etc/passwd.bak", &state()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let (resp, body) = send(Method::GET, "/assets/../../assets/logo.svg", &state()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&body[..], b"<svg/>");
    }

    #[tokio::test]
    async fn preflight_short_circuits() {
        for uri in ["/", "/api/", "/assets/logo.svg", "/nowhere.js"] {
            let (resp, body) = send(Method::OPTIONS, uri, &state()).await;
            assert_eq!(resp.status(), StatusCode::NO_CONTENT, "{}", uri);
            assert_cors(&resp);
            assert!(resp.headers().get(header::CONTENT_TYPE).is_none());
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn api_hello() {
        let (resp, body) = send(Method::GET, "/api/", &state()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        assert_cors(&resp);
        assert_eq!(&body[..], br#"{"message":"sampha API is running"}"#);
    }

    #[tokio::test]
    async fn api_unknown_is_404() {
        let (resp, _) = send(Method::GET, "/api/unknown", &state()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn dispatch_path_keeps_trailing_slash() {
        assert_eq!(dispatch_path("/"), "/");
        assert_eq!(dispatch_path("//api/"), "/api/");
        assert_eq!(dispatch_path("/api"), "/api");
        assert_eq!(dispatch_path("/api/../index.html"), "/index.html");
        assert_eq!(dispatch_path("/assets//app.js"), "/assets/app.js");
    }

    #[tokio::test]
    async fn api_dispatch_uses_cleaned_path() {
        let (resp, body) = send(Method::GET, "//api/", &state()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&body[..], br#"{"message":"sampha API is running"}"#);

        let (resp, body) = send(Method::GET, "/assets/../api/", &state()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&body[..], br#"{"message":"sampha API is running"}"#);

        let (resp, body) = send(Method::GET, "/api/../index.html", &state()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&body[..], INDEX_HTML.as_bytes());
    }

    #[tokio::test]
    async fn api_without_slash_redirects() {
        let (resp, _) = send(Method::GET, "/api", &state()).await;
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()[header::LOCATION], "/api/");

        // only the exact prefix belongs to the API
        let (resp, body) = send(Method::GET, "/apiary", &state()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&body[..], INDEX_HTML.as_bytes());
    }
}
