//! Liveness endpoint and the ambient Prometheus surface. Everything else
//! this process exposes lives behind the
//! explicit ingest/batch/export/stream surface; routing, container
//! orchestration, and TLS termination are named-only collaborators.

use axum::Json;
use prometheus::Encoder;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Text-format Prometheus exposition, mirroring `api-gateway`'s
/// `metrics_handler`: gather the default registry and encode it, falling
/// back to a comment line rather than failing the request on encode error.
pub async fn metrics() -> String {
    let metric_families = prometheus::gather();
    let encoder = prometheus::TextEncoder::new();
    match encoder.encode_to_string(&metric_families) {
        Ok(output) => output,
        Err(_) => "# Failed to encode metrics\n".to_string(),
    }
}
