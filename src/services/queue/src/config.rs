//! Retry, retention, and stall-detection knobs for the queue. Defaults:
//! keep the last 100 completed jobs and 50 failed jobs, reclaim an active
//! job after 30s without a heartbeat.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Maximum attempts per job before it is marked terminally `Failed`.
    pub max_attempts: u32,
    /// Base of the exponential backoff applied between retry attempts.
    pub backoff_base: Duration,
    /// How long an `active` job may go without a heartbeat before it is
    /// considered stalled and reclaimed.
    pub stall_interval: Duration,
    /// How many completed jobs to retain per queue before evicting the
    /// oldest.
    pub retain_completed: usize,
    /// How many failed jobs to retain per queue before evicting the oldest.
    pub retain_failed: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(2),
            stall_interval: Duration::from_secs(30),
            retain_completed: 100,
            retain_failed: 50,
        }
    }
}

impl QueueConfig {
    /// Exponential backoff delay before attempt number `attempt` (1-based).
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.backoff_base * 2u32.saturating_pow(exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        let cfg = QueueConfig::default();
        assert_eq!(cfg.backoff_for_attempt(1), Duration::from_secs(2));
        assert_eq!(cfg.backoff_for_attempt(2), Duration::from_secs(4));
        assert_eq!(cfg.backoff_for_attempt(3), Duration::from_secs(8));
    }
}
