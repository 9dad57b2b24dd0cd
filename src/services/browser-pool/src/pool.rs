//! Public pool API: acquire/release (via RAII guard)/shutdown.

use std::sync::Arc;

use deadpool::managed::{BuildError, Pool, PoolError};
use scraping_shared::ScrapeError;

use crate::config::PoolConfig;
use crate::manager::BrowserManager;

pub type BrowserGuard = deadpool::managed::Object<BrowserManager>;

/// Bounded pool of long-lived headless browser instances (
/// component B). `acquire` borrows one instance; dropping the returned
/// guard releases it back to the pool automatically, matching the
/// "release is mandatory on every exit path" contract without requiring
/// callers to remember to call it explicitly.
#[derive(Clone)]
pub struct BrowserPool {
    inner: Pool<BrowserManager>,
    config: Arc<PoolConfig>,
}

impl BrowserPool {
    pub fn new(config: PoolConfig) -> Result<Self, ScrapeError> {
        let max = config.max_instances;
        let manager = BrowserManager::new(config.clone());
        let inner = Pool::builder(manager)
            .max_size(max)
            .build()
            .map_err(|e: BuildError| ScrapeError::Internal(format!("pool build failed: {e}")))?;
        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Borrow one browser instance, waiting up to `acquire_timeout`.
    pub async fn acquire(&self) -> Result<BrowserGuard, ScrapeError> {
        tokio::time::timeout(self.config.acquire_timeout, self.inner.get())
            .await
            .map_err(|_| ScrapeError::BrowserAcquireTimeout)?
            .map_err(|e: PoolError<ScrapeError>| match e {
                PoolError::Timeout(_) => ScrapeError::BrowserAcquireTimeout,
                other => ScrapeError::Internal(format!("pool acquire failed: {other}")),
            })
    }

    /// Drains and closes every pooled instance. Called once during process
    /// shutdown alongside `Queue::drain`.
    pub async fn shutdown(&self) {
        self.inner.close();
    }

    pub fn status(&self) -> deadpool::managed::Status {
        self.inner.status()
    }

    /// Spawn the periodic idle-reaper: destroys instances unused for longer
    /// than `idle_timeout`, but never below `min_instances`, per the pool's
    /// "idle timeout destroys surplus above min".
    pub fn spawn_idle_reaper(self) -> tokio::task::JoinHandle<()> {
        let mut ticker = tokio::time::interval(self.config.idle_timeout);
        tokio::spawn(async move {
            loop {
                ticker.tick().await;
                let min = self.config.min_instances;
                let idle_timeout = self.config.idle_timeout;
                let mut kept = self.status().size;
                self.inner.retain(|_, metrics| {
                    let surplus = kept > min;
                    let stale = metrics.last_used() >= idle_timeout;
                    let reap = surplus && stale;
                    if reap {
                        kept = kept.saturating_sub(1);
                    }
                    !reap
                });
            }
        })
    }
}
