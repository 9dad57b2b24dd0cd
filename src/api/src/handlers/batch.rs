//! Batch aggregator and CSV export (component G). Read-only:
//! never mutates a `Job`.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use scraping_shared::{Job, JobState};

use crate::csv_io::{build_export_csv, export_filename};
use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverallState {
    Queued,
    Processing,
    Completed,
    CompletedWithErrors,
}

#[derive(Debug, Serialize)]
pub struct JobResultView {
    #[serde(rename = "jobId")]
    pub job_id: Uuid,
    pub status: String,
    pub progress: u8,
    pub name: String,
    pub rating: String,
    #[serde(rename = "reviewsCount")]
    pub reviews_count: String,
    pub phone: String,
    pub address: String,
    pub website: String,
    pub category: String,
    pub latitude: String,
    pub longitude: String,
    #[serde(rename = "openingHours")]
    pub opening_hours: HashMap<String, String>,
    #[serde(rename = "socialMedia")]
    pub social_media: HashMap<String, String>,
    pub error: Option<String>,
}

impl JobResultView {
    fn from_job(job: &Job) -> Self {
        let status = match job.state {
            JobState::Waiting => "waiting",
            JobState::Active => "processing",
            JobState::Completed => job
                .result
                .as_ref()
                .map(|r| if r.status == scraping_shared::ScrapeStatus::Partial { "partial" } else { "completed" })
                .unwrap_or("completed"),
            JobState::Failed => "failed",
        }
        .to_string();

        let result = job.result.as_ref();
        Self {
            job_id: job.job_id,
            status,
            progress: job.progress,
            name: result.map(|r| r.full_name.clone()).unwrap_or_default(),
            rating: result.map(|r| r.rating.clone()).unwrap_or_default(),
            reviews_count: result.map(|r| r.reviews_count.clone()).unwrap_or_default(),
            phone: result.map(|r| r.phone.clone()).unwrap_or_default(),
            address: result.map(|r| r.full_address.clone()).unwrap_or_default(),
            website: result.map(|r| r.website.clone()).unwrap_or_default(),
            category: result.map(|r| r.category.clone()).unwrap_or_default(),
            latitude: result.map(|r| r.latitude.clone()).unwrap_or_default(),
            longitude: result.map(|r| r.longitude.clone()).unwrap_or_default(),
            opening_hours: result
                .map(|r| {
                    r.opening_hours
                        .iter()
                        .map(|(day, hours)| (day.as_str().to_string(), hours.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            social_media: result
                .map(|r| {
                    r.social_media
                        .iter()
                        .map(|(p, href)| (p.as_str().to_string(), href.clone()))
                        .collect()
                })
                .unwrap_or_default(),
            error: job.failure_reason.clone().or_else(|| result.and_then(|r| r.error.clone())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchStatusResponse {
    #[serde(rename = "batchId")]
    pub batch_id: Uuid,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub processing: usize,
    pub waiting: usize,
    pub percentage: u32,
    #[serde(rename = "overallState")]
    pub overall_state: OverallState,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "lastProcessedAt")]
    pub last_processed_at: Option<DateTime<Utc>>,
    #[serde(rename = "estimatedTimeRemaining")]
    pub estimated_time_remaining: Option<String>,
    pub results: Vec<JobResultView>,
}

pub async fn batch_status(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Result<Json<BatchStatusResponse>> {
    Ok(Json(compute_status(&state, batch_id).await?))
}

pub async fn batch_export(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Result<Response> {
    let jobs = all_jobs(&state, batch_id).await?;
    let body = build_export_csv(&jobs).map_err(ApiError::Scrape)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export_filename()),
            ),
        ],
        body,
    )
        .into_response())
}

async fn all_jobs(state: &AppState, batch_id: Uuid) -> Result<Vec<Job>> {
    let batch = state.queue.list_by_batch(batch_id).await.map_err(ApiError::Scrape)?;
    if batch.total_observable() == 0 {
        return Err(ApiError::BatchNotFound(batch_id));
    }
    let mut jobs = Vec::with_capacity(batch.total_observable());
    jobs.extend(batch.waiting);
    jobs.extend(batch.active);
    jobs.extend(batch.completed);
    jobs.extend(batch.failed);
    Ok(jobs)
}

pub(crate) async fn compute_status(state: &AppState, batch_id: Uuid) -> Result<BatchStatusResponse> {
    let batch = state.queue.list_by_batch(batch_id).await.map_err(ApiError::Scrape)?;
    let total = batch.total_observable();
    if total == 0 {
        return Err(ApiError::BatchNotFound(batch_id));
    }

    let completed = batch.completed.len();
    let failed = batch.failed.len();
    let processing = batch.active.len();
    let waiting = batch.waiting.len();
    let percentage = ((completed + failed) * 100 / total) as u32;

    let overall_state = if completed + failed == total {
        if failed == 0 {
            OverallState::Completed
        } else {
            OverallState::CompletedWithErrors
        }
    } else if processing == 0 && waiting == total {
        OverallState::Queued
    } else {
        OverallState::Processing
    };

    let all_created = batch
        .waiting
        .iter()
        .chain(&batch.active)
        .chain(&batch.completed)
        .chain(&batch.failed)
        .map(|j| j.created_at);
    let created_at = all_created.min();

    let last_processed_at = batch
        .completed
        .iter()
        .chain(&batch.failed)
        .filter_map(|j| j.finished_at)
        .max();

    let estimated_time_remaining = estimate_remaining(
        created_at,
        completed,
        waiting + processing,
    );

    let mut results = Vec::with_capacity(total);
    results.extend(batch.completed.iter().map(JobResultView::from_job));
    results.extend(batch.failed.iter().map(JobResultView::from_job));
    results.extend(batch.active.iter().map(JobResultView::from_job));
    results.extend(batch.waiting.iter().map(JobResultView::from_job));

    Ok(BatchStatusResponse {
        batch_id,
        total,
        completed,
        failed,
        processing,
        waiting,
        percentage,
        overall_state,
        created_at,
        last_processed_at,
        estimated_time_remaining,
        results,
    })
}

/// `(elapsed/completed) * remaining`, rendered as `Hh Mm` / `Mm Ss` / `Ss`;
/// `None` until at least one job has completed (no rate to extrapolate
/// from yet).
fn estimate_remaining(created_at: Option<DateTime<Utc>>, completed: usize, remaining: usize) -> Option<String> {
    if completed == 0 || remaining == 0 {
        return None;
    }
    let created_at = created_at?;
    let elapsed = Utc::now().signed_duration_since(created_at).num_milliseconds().max(0) as f64;
    let per_job = elapsed / completed as f64;
    let remaining_ms = (per_job * remaining as f64).round() as i64;
    Some(format_duration_ms(remaining_ms))
}

fn format_duration_ms(ms: i64) -> String {
    let total_seconds = (ms / 1000).max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_minutes() {
        assert_eq!(format_duration_ms(3 * 3_600_000 + 5 * 60_000), "3h 5m");
    }

    #[test]
    fn formats_minutes_seconds() {
        assert_eq!(format_duration_ms(4 * 60_000 + 20_000), "4m 20s");
    }

    #[test]
    fn formats_seconds_only() {
        assert_eq!(format_duration_ms(42_000), "42s");
    }

    #[test]
    fn no_estimate_before_any_completion() {
        assert_eq!(estimate_remaining(Some(Utc::now()), 0, 5), None);
    }
}
