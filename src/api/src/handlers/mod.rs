//! HTTP handlers: ingest (F), batch status/export (G), progress stream (H),
//! and the bare liveness probe kept in scope alongside them.

pub mod batch;
pub mod health;
pub mod ingest;
pub mod stream;
