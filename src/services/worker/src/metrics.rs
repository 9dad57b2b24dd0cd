//! Process-level scrape counters, exposed by `scraping-api`'s `/metrics`
//! route via the default `prometheus` registry (mirrors
//! `api-gateway/src/routes/public.rs`'s `metrics_handler`). These are the
//! ambient operational counters, not the scraped business fields.

use once_cell::sync::Lazy;
use prometheus::{register_int_counter, IntCounter};

pub static JOBS_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "scraping_jobs_completed_total",
        "Jobs that reached a terminal Completed state"
    )
    .expect("metric registration is infallible for a unique name")
});

pub static JOBS_FAILED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "scraping_jobs_failed_total",
        "Scrape attempts that errored, whether or not the job is later retried"
    )
    .expect("metric registration is infallible for a unique name")
});

pub static BROWSER_ACQUIRE_TIMEOUTS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "scraping_browser_acquire_timeouts_total",
        "Times a worker slot gave up waiting for a pooled browser"
    )
    .expect("metric registration is infallible for a unique name")
});
