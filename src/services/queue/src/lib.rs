//! Durable job queue, retry/backoff, retention, and batch aggregation
//! (component D). Redis is the external "in-memory store" collaborator
//! the job store described above names; this crate is the adapter over it, not a
//! reimplementation of Redis itself.

mod batch;
mod config;
mod keys;

pub use batch::BatchJobs;
pub use config::QueueConfig;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use scraping_shared::{BatchId, InputRecord, Job, JobId, JobState, ScrapeError, ScrapeResult};
use tracing::{info, warn};

fn redis_err(e: redis::RedisError) -> ScrapeError {
    ScrapeError::Internal(format!("redis error: {e}"))
}

fn json_err(e: serde_json::Error) -> ScrapeError {
    ScrapeError::Internal(format!("job serialization error: {e}"))
}

/// Handle to the durable job queue. Cheap to clone: the underlying
/// `ConnectionManager` multiplexes over one connection and reconnects
/// transparently.
#[derive(Clone)]
pub struct Queue {
    conn: ConnectionManager,
    config: QueueConfig,
    draining: Arc<AtomicBool>,
}

impl Queue {
    pub async fn connect(redis_url: &str, config: QueueConfig) -> Result<Self, ScrapeError> {
        let client = redis::Client::open(redis_url).map_err(redis_err)?;
        let conn = ConnectionManager::new(client).await.map_err(redis_err)?;
        Ok(Self {
            conn,
            config,
            draining: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Durable enqueue: appends the job to the batch's membership list and
    /// the FIFO waiting list. Never loses a queued job before it reaches a
    /// terminal state or is evicted by retention.
    pub async fn enqueue(&self, batch_id: BatchId, input: InputRecord) -> Result<JobId, ScrapeError> {
        let job_id = JobId::new_v4();
        let job = Job::new(job_id, batch_id, input, Utc::now());
        let payload = serde_json::to_string(&job).map_err(json_err)?;

        let mut conn = self.conn.clone();
        let job_key = keys::job_key(job_id);
        let batch_key = keys::batch_jobs_key(batch_id);

        redis::pipe()
            .atomic()
            .set(&job_key, &payload)
            .rpush(&batch_key, job_id.to_string())
            .rpush(keys::WAITING_LIST, job_id.to_string())
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(redis_err)?;

        Ok(job_id)
    }

    /// Pull the next waiting (or backoff-ready retry) job for `worker_id`.
    /// Returns `None` when there is nothing to do right now, or while the
    /// queue is draining.
    pub async fn next_job(&self, worker_id: &str) -> Result<Option<Job>, ScrapeError> {
        if self.draining.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let mut conn = self.conn.clone();

        let job_id = match self.pop_ready_delayed(&mut conn).await? {
            Some(id) => Some(id),
            None => {
                let popped: Option<String> = conn
                    .lpop(keys::WAITING_LIST, None::<std::num::NonZeroUsize>)
                    .await
                    .map_err(redis_err)?;
                popped.and_then(|s| s.parse::<JobId>().ok())
            }
        };

        let Some(job_id) = job_id else {
            return Ok(None);
        };

        let Some(mut job) = self.load_job(&mut conn, job_id).await? else {
            return Ok(None);
        };

        job.state = JobState::Active;
        job.attempts += 1;
        job.progress = 0;
        job.started_at = Some(Utc::now());
        self.save_job(&mut conn, &job).await?;

        let heartbeat = ActiveEntry {
            worker_id: worker_id.to_string(),
            heartbeat_at: Utc::now(),
        };
        let _: () = conn
            .hset(
                keys::ACTIVE_HASH,
                job_id.to_string(),
                serde_json::to_string(&heartbeat).map_err(json_err)?,
            )
            .await
            .map_err(redis_err)?;

        Ok(Some(job))
    }

    async fn pop_ready_delayed(&self, conn: &mut ConnectionManager) -> Result<Option<JobId>, ScrapeError> {
        let now = Utc::now().timestamp_millis();
        let ready: Vec<String> = conn
            .zrangebyscore_limit(keys::DELAYED_ZSET, 0, now, 0, 1)
            .await
            .map_err(redis_err)?;
        let Some(id_str) = ready.into_iter().next() else {
            return Ok(None);
        };
        let _: () = conn.zrem(keys::DELAYED_ZSET, &id_str).await.map_err(redis_err)?;
        Ok(id_str.parse::<JobId>().ok())
    }

    /// Progress is non-decreasing within a single attempt.
    pub async fn update_progress(&self, job_id: JobId, progress: u8) -> Result<(), ScrapeError> {
        let mut conn = self.conn.clone();
        let Some(mut job) = self.load_job(&mut conn, job_id).await? else {
            return Ok(());
        };
        if job.state != JobState::Active {
            return Ok(());
        }
        job.progress = progress.max(job.progress).min(100);
        self.save_job(&mut conn, &job).await?;
        self.touch_heartbeat(&mut conn, job_id).await?;
        Ok(())
    }

    /// Idempotent per attempt: a job already in a terminal state is left
    /// untouched.
    pub async fn complete(&self, job_id: JobId, result: ScrapeResult) -> Result<(), ScrapeError> {
        let mut conn = self.conn.clone();
        let Some(mut job) = self.load_job(&mut conn, job_id).await? else {
            return Ok(());
        };
        if job.state.is_terminal() {
            return Ok(());
        }

        job.state = JobState::Completed;
        job.progress = 100;
        job.finished_at = Some(Utc::now());
        job.result = Some(result);
        self.save_job(&mut conn, &job).await?;

        let _: () = conn.hdel(keys::ACTIVE_HASH, job_id.to_string()).await.map_err(redis_err)?;
        self.push_with_retention(&mut conn, keys::COMPLETED_ORDER_LIST, job_id, self.config.retain_completed)
            .await?;
        Ok(())
    }

    /// Idempotent per attempt. Retries (up to `max_attempts`) by scheduling
    /// the job back onto the delayed set with exponential backoff; beyond
    /// that the job becomes terminally `Failed`.
    pub async fn fail(&self, job_id: JobId, reason: impl Into<String>) -> Result<(), ScrapeError> {
        let mut conn = self.conn.clone();
        let Some(mut job) = self.load_job(&mut conn, job_id).await? else {
            return Ok(());
        };
        if job.state.is_terminal() {
            return Ok(());
        }

        let _: () = conn.hdel(keys::ACTIVE_HASH, job_id.to_string()).await.map_err(redis_err)?;

        if job.attempts < self.config.max_attempts {
            job.state = JobState::Waiting;
            job.progress = 0;
            self.save_job(&mut conn, &job).await?;

            let delay = self.config.backoff_for_attempt(job.attempts);
            let ready_at = (Utc::now() + chrono::Duration::from_std(delay).unwrap_or_default())
                .timestamp_millis();
            let _: () = conn
                .zadd(keys::DELAYED_ZSET, job_id.to_string(), ready_at)
                .await
                .map_err(redis_err)?;
            info!(job_id = %job_id, attempt = job.attempts, "job failed, scheduled for retry");
            return Ok(());
        }

        job.state = JobState::Failed;
        job.finished_at = Some(Utc::now());
        job.failure_reason = Some(reason.into());
        self.save_job(&mut conn, &job).await?;
        self.push_with_retention(&mut conn, keys::FAILED_ORDER_LIST, job_id, self.config.retain_failed)
            .await?;
        Ok(())
    }

    /// All jobs observable for a batch, bucketed by state. Jobs whose keys
    /// were already evicted by retention are silently absent.
    pub async fn list_by_batch(&self, batch_id: BatchId) -> Result<BatchJobs, ScrapeError> {
        let mut conn = self.conn.clone();
        let batch_key = keys::batch_jobs_key(batch_id);
        let job_ids: Vec<String> = conn.lrange(&batch_key, 0, -1).await.map_err(redis_err)?;

        let mut jobs = Vec::with_capacity(job_ids.len());
        for id in job_ids {
            if let Ok(job_id) = id.parse::<JobId>() {
                if let Some(job) = self.load_job(&mut conn, job_id).await? {
                    jobs.push(job);
                }
            }
        }
        Ok(BatchJobs::from_jobs(jobs))
    }

    /// Graceful shutdown: stop dispatching new work. Active jobs finish
    /// normally via `complete`/`fail`.
    pub async fn drain(&self) {
        self.draining.store(true, Ordering::SeqCst);
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    /// Reclaim active jobs whose worker has not heartbeated within
    /// `stall_interval`, feeding them back through the same retry/fail path
    /// as any other failure.
    pub async fn reclaim_stalled(&self) -> Result<usize, ScrapeError> {
        let mut conn = self.conn.clone();
        let entries: Vec<(String, String)> = conn.hgetall(keys::ACTIVE_HASH).await.map_err(redis_err)?;
        let now = Utc::now();
        let mut reclaimed = 0usize;

        for (id_str, raw) in entries {
            let Ok(job_id) = id_str.parse::<JobId>() else { continue };
            let Ok(entry) = serde_json::from_str::<ActiveEntry>(&raw) else { continue };
            let age = now.signed_duration_since(entry.heartbeat_at);
            if age.to_std().unwrap_or_default() > self.config.stall_interval {
                warn!(job_id = %job_id, worker_id = %entry.worker_id, "reclaiming stalled job");
                self.fail(job_id, "worker disappeared").await?;
                reclaimed += 1;
            }
        }
        Ok(reclaimed)
    }

    /// Spawn the periodic stall-reclamation sweep (a fixed
    /// interval, default 30s"). Runs until the returned handle is aborted.
    pub fn spawn_maintenance(self) -> tokio::task::JoinHandle<()> {
        let interval = self.config.stall_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = self.reclaim_stalled().await {
                    warn!("stall reclamation sweep failed: {e}");
                }
            }
        })
    }

    async fn touch_heartbeat(&self, conn: &mut ConnectionManager, job_id: JobId) -> Result<(), ScrapeError> {
        let exists: bool = conn.hexists(keys::ACTIVE_HASH, job_id.to_string()).await.map_err(redis_err)?;
        if !exists {
            return Ok(());
        }
        let raw: String = conn.hget(keys::ACTIVE_HASH, job_id.to_string()).await.map_err(redis_err)?;
        if let Ok(mut entry) = serde_json::from_str::<ActiveEntry>(&raw) {
            entry.heartbeat_at = Utc::now();
            let _: () = conn
                .hset(
                    keys::ACTIVE_HASH,
                    job_id.to_string(),
                    serde_json::to_string(&entry).map_err(json_err)?,
                )
                .await
                .map_err(redis_err)?;
        }
        Ok(())
    }

    async fn load_job(&self, conn: &mut ConnectionManager, job_id: JobId) -> Result<Option<Job>, ScrapeError> {
        let raw: Option<String> = conn.get(keys::job_key(job_id)).await.map_err(redis_err)?;
        match raw {
            Some(s) => Ok(Some(serde_json::from_str(&s).map_err(json_err)?)),
            None => Ok(None),
        }
    }

    async fn save_job(&self, conn: &mut ConnectionManager, job: &Job) -> Result<(), ScrapeError> {
        let payload = serde_json::to_string(job).map_err(json_err)?;
        let _: () = conn.set(keys::job_key(job.job_id), payload).await.map_err(redis_err)?;
        Ok(())
    }

    async fn push_with_retention(
        &self,
        conn: &mut ConnectionManager,
        list_key: &str,
        job_id: JobId,
        retain: usize,
    ) -> Result<(), ScrapeError> {
        let _: () = conn.rpush(list_key, job_id.to_string()).await.map_err(redis_err)?;
        let len: usize = conn.llen(list_key).await.map_err(redis_err)?;
        if len > retain {
            let evicted: Option<String> = conn
                .lpop(list_key, None::<std::num::NonZeroUsize>)
                .await
                .map_err(redis_err)?;
            if let Some(id) = evicted {
                let _: () = conn.del(keys::job_key_str(&id)).await.map_err(redis_err)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct ActiveEntry {
    worker_id: String,
    heartbeat_at: chrono::DateTime<Utc>,
}

/// Default Redis polling interval used by callers that loop on
/// `next_job` returning `None` (the blocking-pull contract is
/// modeled here as a short sleep-and-retry rather than a literal BLPOP, so
/// the queue stays trivially testable without a live Redis).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);
