//! One worker slot: pull job, open isolated context, hand to the engine,
//! report the outcome, always release.

use scraping_browser_pool::{BrowserPool, ChromiumPageDriver};
use scraping_engine::{detect_locale, ScrapeEngine};
use scraping_queue::Queue;

use crate::config::WorkerConfig;
use crate::metrics;

const PROGRESS_ENTER: u8 = 10;
const PROGRESS_PRE_SCRAPE: u8 = 20;
const PROGRESS_POST_EXTRACT: u8 = 90;

pub async fn run_slot(
    slot_id: &str,
    queue: Queue,
    browser_pool: BrowserPool,
    engine: ScrapeEngine,
    config: WorkerConfig,
) {
    loop {
        if queue.is_draining() {
            tracing::info!(slot = slot_id, "slot stopping: queue is draining");
            return;
        }

        let job = match queue.next_job(slot_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                tokio::time::sleep(config.poll_interval).await;
                continue;
            }
            Err(e) => {
                tracing::warn!(slot = slot_id, "failed to pull next job: {e}");
                tokio::time::sleep(config.poll_interval).await;
                continue;
            }
        };

        let job_id = job.job_id;
        let _ = queue.update_progress(job_id, PROGRESS_ENTER).await;

        let locale = detect_locale(&job.input);

        let guard = match browser_pool.acquire().await {
            Ok(guard) => guard,
            Err(e) => {
                tracing::warn!(slot = slot_id, job_id = %job_id, "browser acquire failed: {e}");
                metrics::BROWSER_ACQUIRE_TIMEOUTS.inc();
                let _ = queue.fail(job_id, sanitize(&e.to_string())).await;
                continue;
            }
        };

        let mut driver = match ChromiumPageDriver::open(&guard, locale.user_agent, locale.accept_language).await {
            Ok(driver) => driver,
            Err(e) => {
                tracing::warn!(slot = slot_id, job_id = %job_id, "failed to open isolated page: {e}");
                let _ = queue.fail(job_id, sanitize(&e.to_string())).await;
                drop(guard);
                continue;
            }
        };

        let _ = queue.update_progress(job_id, PROGRESS_PRE_SCRAPE).await;

        match engine.scrape(&mut driver, &job.input).await {
            Ok(result) => {
                let _ = queue.update_progress(job_id, PROGRESS_POST_EXTRACT).await;
                let _ = queue.complete(job_id, result).await;
                metrics::JOBS_COMPLETED.inc();
            }
            Err(e) => {
                tracing::info!(slot = slot_id, job_id = %job_id, "scrape failed: {e}");
                let _ = queue.fail(job_id, sanitize(&e.to_string())).await;
                metrics::JOBS_FAILED.inc();
            }
        }

        drop(driver);
        drop(guard);
    }
}

/// Never propagate raw page content or internal error chains into a job's
/// user-visible failure reason.
fn sanitize(message: &str) -> String {
    message.chars().take(200).collect()
}
