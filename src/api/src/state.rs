//! Shared application state, following `api-gateway/src/state.rs`'s
//! "build every dependency once in `new`, clone the handle into handlers"
//! shape — simplified since this service has no degraded-mode path.

use std::sync::Arc;

use scraping_browser_pool::BrowserPool;
use scraping_engine::{EngineConfig, ScrapeEngine};
use scraping_queue::{Queue, QueueConfig};

use crate::config::Config;
use crate::error::Result;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub queue: Queue,
    pub browser_pool: BrowserPool,
    pub engine: ScrapeEngine,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let queue = Queue::connect(&config.redis_url(), QueueConfig::default())
            .await
            .map_err(crate::error::ApiError::Scrape)?;

        let mut pool_config = scraping_browser_pool::PoolConfig::default();
        pool_config.max_instances = config.max_browser_instances;
        pool_config.launch_timeout = std::time::Duration::from_millis(config.browser_timeout);
        let browser_pool = BrowserPool::new(pool_config).map_err(crate::error::ApiError::Scrape)?;

        let engine = ScrapeEngine::new(EngineConfig::default());

        Ok(Self {
            config: Arc::new(config),
            queue,
            browser_pool,
            engine,
        })
    }
}
