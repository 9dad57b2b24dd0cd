//! Worker fleet sizing (env var `WORKER_CONCURRENCY`).

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of concurrent slots (`C_worker`), each a cooperative Tokio
    /// task effectively blocking on browser I/O.
    pub concurrency: usize,
    /// How long in-flight slots get to finish their current job after a
    /// shutdown signal before the process gives up waiting on them.
    pub shutdown_grace: Duration,
    /// How long a slot sleeps after finding no job before polling again.
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            shutdown_grace: Duration::from_secs(30),
            poll_interval: scraping_queue::DEFAULT_POLL_INTERVAL,
        }
    }
}
