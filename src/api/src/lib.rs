//! HTTP surface: ingest/batch API (F), batch aggregator and CSV export (G),
//! and the progress stream (H). The binary (`src/main.rs`) additionally
//! hosts the worker fleet (E) when `APP_MODE` calls for it.

pub mod config;
pub mod csv_io;
pub mod error;
pub mod handlers;
pub mod middleware_layer;
pub mod routes;
pub mod state;

pub use config::{AppMode, Config};
pub use error::{ApiError, Result};
pub use routes::build_router;
pub use state::AppState;
