//! Pool sizing and launch-profile knobs (env vars
//! `MAX_BROWSER_INSTANCES` / `BROWSER_TIMEOUT`).

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Minimum instances kept warm even when idle.
    pub min_instances: usize,
    /// Hard cap on concurrently live instances (`MAX_BROWSER_INSTANCES`).
    pub max_instances: usize,
    /// How long `acquire` waits before giving up.
    pub acquire_timeout: Duration,
    /// Launch timeout for a fresh browser process (`BROWSER_TIMEOUT`).
    pub launch_timeout: Duration,
    /// Recycle an instance after this many borrows to bound memory growth.
    pub max_uses: u32,
    /// Destroy idle instances above `min_instances` after this long unused.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_instances: 1,
            max_instances: 4,
            acquire_timeout: Duration::from_secs(30),
            launch_timeout: Duration::from_secs(15),
            max_uses: 50,
            idle_timeout: Duration::from_secs(120),
        }
    }
}

/// Chromium launch args profile: headless, GPU/sandbox/throttling disabled,
/// no extensions/sync/default-apps, large old-space headroom. These are
/// performance/stability hints, not correctness requirements.
pub fn launch_args() -> Vec<&'static str> {
    vec![
        "--disable-gpu",
        "--no-sandbox",
        "--disable-dev-shm-usage",
        "--disable-background-timer-throttling",
        "--disable-backgrounding-occluded-windows",
        "--disable-renderer-backgrounding",
        "--disable-extensions",
        "--disable-sync",
        "--disable-default-apps",
        "--js-flags=--max-old-space-size=4096",
    ]
}
