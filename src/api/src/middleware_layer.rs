//! Thin middleware layer, mirroring `api-gateway/src/middleware_layer/`'s
//! naming even though this service only needs one cross-cutting concern:
//! the rule that every JSON response carries `application/json; charset=utf-8`,
//! which `axum::Json` alone does not guarantee.

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

pub async fn json_charset(req: Request<Body>, next: Next) -> Response {
    let mut res = next.run(req).await;
    let needs_charset = res
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.as_bytes() == b"application/json")
        .unwrap_or(false);
    if needs_charset {
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
    }
    res
}
