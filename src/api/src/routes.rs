//! Route table. Mirrors `api-gateway/src/routes/public.rs` and
//! `routes/api.rs`'s split, collapsed into one router since this service
//! has no authenticated surface of its own.

use axum::http::{header, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware_layer::json_charset;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/metrics", get(handlers::health::metrics))
        .route("/api/v1/scraping-batch", post(handlers::ingest::upload_batch))
        .route(
            "/api/v1/scraping-batch/:batch_id",
            get(handlers::batch::batch_status),
        )
        .route(
            "/api/v1/scraping-batch/:batch_id/export",
            get(handlers::batch::batch_export),
        )
        .route(
            "/api/v1/scraping-batch/:batch_id/stream",
            get(handlers::stream::batch_stream),
        )
        .layer(middleware::from_fn(json_charset))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Accepts the host server's own origin and local dev origins with
/// credentials. `AllowOrigin::mirror_request` reflects
/// whatever origin the client sent rather than enumerating a fixed list,
/// since credentialed CORS cannot combine with a wildcard origin.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}
