//! Worker fleet: pulls jobs off the queue, drives the scrape engine against
//! a pooled browser, and reports progress/outcomes (component E).

mod config;
mod fleet;
pub mod metrics;
mod slot;

pub use config::WorkerConfig;
pub use fleet::WorkerFleet;
