//! `deadpool::managed::Manager` implementation wrapping `chromiumoxide`,
//! pooling launched browser instances behind a `deadpool`-shaped manager.

use chromiumoxide::browser::{Browser, BrowserConfig};
use deadpool::managed::{self, Metrics, RecycleError, RecycleResult};
use scraping_shared::ScrapeError;
use tracing::{debug, warn};

use crate::config::{launch_args, PoolConfig};

/// One pooled browser instance plus the background task that drives its CDP
/// event loop. `chromiumoxide` hands back a `Handler` stream alongside the
/// `Browser` handle; it must be polled continuously or the connection stalls.
pub struct ManagedBrowser {
    pub browser: Browser,
    handler_task: tokio::task::JoinHandle<()>,
    uses: u32,
}

impl Drop for ManagedBrowser {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

pub struct BrowserManager {
    config: PoolConfig,
}

impl BrowserManager {
    pub fn new(config: PoolConfig) -> Self {
        Self { config }
    }
}

impl managed::Manager for BrowserManager {
    type Type = ManagedBrowser;
    type Error = ScrapeError;

    async fn create(&self) -> Result<Self::Type, Self::Error> {
        let config = BrowserConfig::builder()
            .args(launch_args())
            .request_timeout(self.config.launch_timeout)
            .build()
            .map_err(|e| ScrapeError::Internal(format!("browser launch config: {e}")))?;

        let (browser, mut handler) = tokio::time::timeout(
            self.config.launch_timeout,
            Browser::launch(config),
        )
        .await
        .map_err(|_| ScrapeError::Internal("browser launch timed out".into()))?
        .map_err(|e| ScrapeError::Internal(format!("browser launch failed: {e}")))?;

        let handler_task = tokio::spawn(async move {
            use futures::StreamExt;
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("browser event loop error: {e}");
                }
            }
        });

        debug!("launched new browser instance");
        Ok(ManagedBrowser {
            browser,
            handler_task,
            uses: 0,
        })
    }

    async fn recycle(
        &self,
        instance: &mut Self::Type,
        _metrics: &Metrics,
    ) -> RecycleResult<Self::Error> {
        instance.uses += 1;
        if instance.uses > self.config.max_uses {
            return Err(RecycleError::Message(
                "max_uses exceeded, recycling instance".into(),
            ));
        }

        match instance.browser.version().await {
            Ok(_) => Ok(()),
            Err(e) => Err(RecycleError::Message(format!(
                "browser ping failed, dropping instance: {e}"
            ))),
        }
    }
}
