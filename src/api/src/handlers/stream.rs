//! Progress stream (component H): a per-subscription cooperative
//! task that polls the queue on a fixed interval, maintains a `seenJobIds`
//! set, and writes framed SSE records. Follows the per-connection
//! task-plus-channel shape of `notification/src/websocket.rs`, adapted from a
//! socket-per-client fan-out to axum's `Sse` response since this component
//! is server-push-only (no client -> server messages).

use std::collections::HashSet;
use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use scraping_shared::{Job, JobState, ScrapeStatus, Weekday};

use crate::handlers::batch::compute_status;
use crate::state::AppState;

/// Server-side poll interval; not a client-tunable knob.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

pub async fn batch_stream(
    State(state): State<AppState>,
    Path(batch_id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let initial = StreamState {
        state,
        batch_id,
        seen: HashSet::new(),
        pending: Default::default(),
        sent_connected: false,
        done: false,
        next_index: 1,
    };
    Sse::new(futures::stream::unfold(initial, next_frame)).keep_alive(KeepAlive::default())
}

struct StreamState {
    state: AppState,
    batch_id: Uuid,
    seen: HashSet<Uuid>,
    pending: std::collections::VecDeque<Event>,
    sent_connected: bool,
    done: bool,
    next_index: usize,
}

async fn next_frame(mut s: StreamState) -> Option<(Result<Event, Infallible>, StreamState)> {
    if let Some(event) = s.pending.pop_front() {
        return Some((Ok(event), s));
    }
    if s.done {
        return None;
    }

    if !s.sent_connected {
        s.sent_connected = true;
        let frame = json!({
            "batchId": s.batch_id,
            "message": "subscribed to batch progress",
            "timestamp": Utc::now(),
        });
        return Some((Ok(Event::default().event("connected").json_data(frame).unwrap()), s));
    }

    tokio::time::sleep(POLL_INTERVAL).await;

    let status = match compute_status(&s.state, s.batch_id).await {
        Ok(status) => status,
        Err(e) => {
            s.done = true;
            let frame = json!({
                "error": "stream_error",
                "message": e.to_string(),
                "timestamp": Utc::now(),
            });
            return Some((Ok(Event::default().event("error").json_data(frame).unwrap()), s));
        }
    };

    let batch = match s.state.queue.list_by_batch(s.batch_id).await {
        Ok(batch) => batch,
        Err(e) => {
            s.done = true;
            let frame = json!({
                "error": "stream_error",
                "message": e.to_string(),
                "timestamp": Utc::now(),
            });
            return Some((Ok(Event::default().event("error").json_data(frame).unwrap()), s));
        }
    };

    let mut newly_terminal: Vec<&Job> = batch
        .completed
        .iter()
        .chain(batch.failed.iter())
        .filter(|j| !s.seen.contains(&j.job_id))
        .collect();
    newly_terminal.sort_by_key(|j| j.finished_at.unwrap_or(j.created_at));

    let mut frames = std::collections::VecDeque::new();

    let progress_frame = json!({
        "total": status.total,
        "completed": status.completed,
        "failed": status.failed,
        "processing": status.processing,
        "waiting": status.waiting,
        "percentage": status.percentage,
        "timestamp": Utc::now(),
    });
    frames.push_back(Event::default().event("progress").json_data(progress_frame).unwrap());

    for job in newly_terminal {
        s.seen.insert(job.job_id);
        let frame = result_frame(job, s.next_index);
        s.next_index += 1;
        frames.push_back(Event::default().event("result").json_data(frame).unwrap());
    }

    if status.completed + status.failed == status.total {
        s.done = true;
        let complete_frame = json!({
            "batchId": s.batch_id,
            "completed": status.completed,
            "total": status.total,
            "message": "batch finished",
            "timestamp": Utc::now(),
        });
        frames.push_back(Event::default().event("complete").json_data(complete_frame).unwrap());
    }

    s.pending = frames;
    let first = s.pending.pop_front()?;
    Some((Ok(first), s))
}

/// Flattened view of one newly-terminal job: the same keys as an export
/// row, plus `latitude`, `longitude`, `index`, `timestamp`.
#[derive(Serialize)]
struct ResultFrame {
    #[serde(rename = "jobId")]
    job_id: Uuid,
    name: String,
    rating: String,
    #[serde(rename = "reviewsCount")]
    reviews_count: String,
    phone: String,
    address: String,
    website: String,
    category: String,
    #[serde(rename = "mondayHours")]
    monday_hours: String,
    #[serde(rename = "tuesdayHours")]
    tuesday_hours: String,
    #[serde(rename = "wednesdayHours")]
    wednesday_hours: String,
    #[serde(rename = "thursdayHours")]
    thursday_hours: String,
    #[serde(rename = "fridayHours")]
    friday_hours: String,
    #[serde(rename = "saturdayHours")]
    saturday_hours: String,
    #[serde(rename = "sundayHours")]
    sunday_hours: String,
    status: String,
    latitude: String,
    longitude: String,
    index: usize,
    timestamp: DateTime<Utc>,
}

fn result_frame(job: &Job, index: usize) -> ResultFrame {
    let result = job.result.as_ref();
    let status = match job.state {
        JobState::Failed => "failed".to_string(),
        JobState::Completed => result
            .map(|r| if r.status == ScrapeStatus::Partial { "partial" } else { "completed" })
            .unwrap_or("completed")
            .to_string(),
        _ => "processing".to_string(),
    };

    ResultFrame {
        job_id: job.job_id,
        name: result.map(|r| r.full_name.clone()).unwrap_or_default(),
        rating: result.map(|r| r.rating.clone()).unwrap_or_default(),
        reviews_count: result.map(|r| r.reviews_count.clone()).unwrap_or_default(),
        phone: result.map(|r| r.phone.clone()).unwrap_or_default(),
        address: result.map(|r| r.full_address.clone()).unwrap_or_default(),
        website: result.map(|r| r.website.clone()).unwrap_or_default(),
        category: result.map(|r| r.category.clone()).unwrap_or_default(),
        monday_hours: result.map(|r| r.opening_hours_for(Weekday::Monday).to_string()).unwrap_or_default(),
        tuesday_hours: result.map(|r| r.opening_hours_for(Weekday::Tuesday).to_string()).unwrap_or_default(),
        wednesday_hours: result.map(|r| r.opening_hours_for(Weekday::Wednesday).to_string()).unwrap_or_default(),
        thursday_hours: result.map(|r| r.opening_hours_for(Weekday::Thursday).to_string()).unwrap_or_default(),
        friday_hours: result.map(|r| r.opening_hours_for(Weekday::Friday).to_string()).unwrap_or_default(),
        saturday_hours: result.map(|r| r.opening_hours_for(Weekday::Saturday).to_string()).unwrap_or_default(),
        sunday_hours: result.map(|r| r.opening_hours_for(Weekday::Sunday).to_string()).unwrap_or_default(),
        status,
        latitude: result.map(|r| r.latitude.clone()).unwrap_or_default(),
        longitude: result.map(|r| r.longitude.clone()).unwrap_or_default(),
        index,
        timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraping_shared::{BatchId, InputRecord, JobId, ScrapeResult};

    fn completed_job() -> Job {
        let mut job = Job::new(JobId::new_v4(), BatchId::new_v4(), InputRecord::default(), Utc::now());
        job.state = JobState::Completed;
        job.finished_at = Some(Utc::now());
        job.result = Some(ScrapeResult::empty(ScrapeStatus::Success, Utc::now()));
        job
    }

    #[test]
    fn result_frame_carries_index_and_status() {
        let job = completed_job();
        let frame = result_frame(&job, 3);
        assert_eq!(frame.index, 3);
        assert_eq!(frame.status, "completed");
    }
}
