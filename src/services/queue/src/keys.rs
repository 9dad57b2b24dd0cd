//! Redis key naming for the job queue (component D).

use scraping_shared::{BatchId, JobId};

pub const WAITING_LIST: &str = "scraping:queue:waiting";
pub const DELAYED_ZSET: &str = "scraping:queue:delayed";
pub const ACTIVE_HASH: &str = "scraping:queue:active";
pub const COMPLETED_ORDER_LIST: &str = "scraping:queue:completed:order";
pub const FAILED_ORDER_LIST: &str = "scraping:queue:failed:order";

pub fn job_key(job_id: JobId) -> String {
    format!("scraping:job:{}", job_id)
}

/// Same as [`job_key`] but for a raw id string pulled out of a list entry,
/// where parsing back to a [`JobId`] would be pure overhead.
pub fn job_key_str(job_id: &str) -> String {
    format!("scraping:job:{}", job_id)
}

pub fn batch_jobs_key(batch_id: BatchId) -> String {
    format!("scraping:batch:{}:jobs", batch_id)
}
