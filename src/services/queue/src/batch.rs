//! Read-side view of all jobs sharing a `batchId`.

use scraping_shared::Job;

/// Jobs belonging to one batch, bucketed by state. Tolerates partial
/// eviction: a job whose key has already been reclaimed by retention is
/// simply absent from its bucket, never fabricated.
#[derive(Debug, Clone, Default)]
pub struct BatchJobs {
    pub waiting: Vec<Job>,
    pub active: Vec<Job>,
    pub completed: Vec<Job>,
    pub failed: Vec<Job>,
}

impl BatchJobs {
    pub fn from_jobs(jobs: Vec<Job>) -> Self {
        let mut out = BatchJobs::default();
        for job in jobs {
            match job.state {
                scraping_shared::JobState::Waiting => out.waiting.push(job),
                scraping_shared::JobState::Active => out.active.push(job),
                scraping_shared::JobState::Completed => out.completed.push(job),
                scraping_shared::JobState::Failed => out.failed.push(job),
            }
        }
        out
    }

    pub fn total_observable(&self) -> usize {
        self.waiting.len() + self.active.len() + self.completed.len() + self.failed.len()
    }
}
