use hyper::header::{self, HeaderMap, HeaderValue};

#[allow(clippy::declare_interior_mutable_const)]
pub fn apply(headers: &mut HeaderMap) {
    const ANY: HeaderValue = HeaderValue::from_static("*");
    const METHODS: HeaderValue = HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS, PATCH");
    const HEADERS: HeaderValue =
        HeaderValue::from_static("Accept, Authorization, Content-Type, X-CSRF-Token");
    const NO_CREDENTIALS: HeaderValue = HeaderValue::from_static("false");

    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, ANY);
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, METHODS);
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HEADERS);
    headers.insert(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, NO_CREDENTIALS);
}
