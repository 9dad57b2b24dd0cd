//! Worker fleet: spawns `WORKER_CONCURRENCY` slot tasks and drives
//! graceful shutdown with the same `tokio::select!` + signal-handling
//! shape the HTTP server uses for its own shutdown.

use scraping_browser_pool::BrowserPool;
use scraping_engine::ScrapeEngine;
use scraping_queue::Queue;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::WorkerConfig;
use crate::slot::run_slot;

pub struct WorkerFleet {
    queue: Queue,
    browser_pool: BrowserPool,
    engine: ScrapeEngine,
    config: WorkerConfig,
}

impl WorkerFleet {
    pub fn new(queue: Queue, browser_pool: BrowserPool, engine: ScrapeEngine, config: WorkerConfig) -> Self {
        Self {
            queue,
            browser_pool,
            engine,
            config,
        }
    }

    /// Spawn all slots, then block until a shutdown signal arrives and the
    /// grace period elapses (or every slot finishes sooner).
    pub async fn run(self) {
        let maintenance = self.queue.clone().spawn_maintenance();

        let mut slots = Vec::with_capacity(self.config.concurrency);
        for i in 0..self.config.concurrency {
            let slot_id = format!("worker-{}-slot-{i}", short_id());
            let queue = self.queue.clone();
            let pool = self.browser_pool.clone();
            let engine = self.engine.clone();
            let config = self.config.clone();
            slots.push(tokio::spawn(async move {
                run_slot(&slot_id, queue, pool, engine, config).await;
            }));
        }

        info!(slots = self.config.concurrency, "worker fleet started");
        shutdown_signal().await;

        info!("shutdown signal received, draining queue");
        self.queue.drain().await;

        let grace = self.config.shutdown_grace;
        let drain_all = futures::future::join_all(slots);
        if tokio::time::timeout(grace, drain_all).await.is_err() {
            warn!("shutdown grace period elapsed with slots still in flight");
        }

        maintenance.abort();
        self.browser_pool.shutdown().await;
        info!("worker fleet shutdown complete");
    }
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("received Ctrl+C, shutting down worker fleet gracefully");
        },
        _ = terminate => {
            warn!("received SIGTERM, shutting down worker fleet gracefully");
        },
    }
}
