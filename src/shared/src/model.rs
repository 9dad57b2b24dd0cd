//! Core data model shared by the queue, the worker fleet, and the API.
//!
//! Mirrors the record shapes described by the ingest pipeline, the scrape
//! engine, and the batch aggregator so all three agree on field names and
//! invariants without duplicating struct definitions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Globally unique identifier for a [`Job`].
pub type JobId = uuid::Uuid;

/// Identifier grouping jobs created from one CSV upload.
pub type BatchId = uuid::Uuid;

/// One CSV row after character-pipeline normalization.
///
/// Keys are case-insensitive and trimmed at parse time; by the time an
/// `InputRecord` exists, field presence has already been checked against
/// "at least one of name/address is non-empty".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
}

impl InputRecord {
    /// A record is enqueueable only when name or address carries content.
    pub fn is_enqueueable(&self) -> bool {
        !self.name.trim().is_empty() || !self.address.trim().is_empty()
    }
}

/// Day of the week, used as the key of [`ScrapeResult::opening_hours`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

/// Social platforms the extractor recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Facebook,
    Instagram,
    Twitter,
    Linkedin,
    Youtube,
}

impl SocialPlatform {
    pub const ALL: [SocialPlatform; 5] = [
        SocialPlatform::Facebook,
        SocialPlatform::Instagram,
        SocialPlatform::Twitter,
        SocialPlatform::Linkedin,
        SocialPlatform::Youtube,
    ];

    /// The domain stem used to recognize a link as belonging to this platform.
    pub fn domain_stem(&self) -> &'static str {
        match self {
            SocialPlatform::Facebook => "facebook.com",
            SocialPlatform::Instagram => "instagram.com",
            SocialPlatform::Twitter => "twitter.com",
            SocialPlatform::Linkedin => "linkedin.com",
            SocialPlatform::Youtube => "youtube.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::Twitter => "twitter",
            SocialPlatform::Linkedin => "linkedin",
            SocialPlatform::Youtube => "youtube",
        }
    }
}

/// Outcome classification for a completed scrape attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeStatus {
    Success,
    Partial,
    Failed,
}

/// What the scrape engine hands back to the worker on completion.
///
/// Every string field is present but may be empty ("never null; empty
/// string when unknown"), per the data model invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub status: ScrapeStatus,
    pub full_name: String,
    pub full_address: String,
    pub phone: String,
    pub rating: String,
    pub reviews_count: String,
    pub website: String,
    pub category: String,
    pub latitude: String,
    pub longitude: String,
    pub opening_hours: HashMap<Weekday, String>,
    pub social_media: HashMap<SocialPlatform, String>,
    pub scraped_at: DateTime<Utc>,
    pub error: Option<String>,
}

impl ScrapeResult {
    /// An empty-but-valid result for a given terminal status, used when the
    /// engine has nothing else to report (e.g. a bare "not found" failure).
    pub fn empty(status: ScrapeStatus, scraped_at: DateTime<Utc>) -> Self {
        Self {
            status,
            full_name: String::new(),
            full_address: String::new(),
            phone: String::new(),
            rating: String::new(),
            reviews_count: String::new(),
            website: String::new(),
            category: String::new(),
            latitude: String::new(),
            longitude: String::new(),
            opening_hours: HashMap::new(),
            social_media: HashMap::new(),
            scraped_at,
            error: None,
        }
    }

    pub fn opening_hours_for(&self, day: Weekday) -> &str {
        self.opening_hours.get(&day).map(String::as_str).unwrap_or("")
    }
}

/// Lifecycle state of a [`Job`]. `Completed`/`Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Waiting,
    Active,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// One scrape task for one input record; the queue's unit of scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,
    pub batch_id: BatchId,
    pub input: InputRecord,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub state: JobState,
    pub attempts: u32,
    pub progress: u8,
    pub result: Option<ScrapeResult>,
    pub failure_reason: Option<String>,
}

impl Job {
    pub fn new(job_id: JobId, batch_id: BatchId, input: InputRecord, created_at: DateTime<Utc>) -> Self {
        Self {
            job_id,
            batch_id,
            input,
            created_at,
            started_at: None,
            finished_at: None,
            state: JobState::Waiting,
            attempts: 0,
            progress: 0,
            result: None,
            failure_reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_needs_name_or_address() {
        let mut r = InputRecord::default();
        assert!(!r.is_enqueueable());
        r.name = "  ".into();
        assert!(!r.is_enqueueable());
        r.address = "Main St 1".into();
        assert!(r.is_enqueueable());
    }

    #[test]
    fn job_state_terminal() {
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(!JobState::Waiting.is_terminal());
        assert!(!JobState::Active.is_terminal());
    }

    #[test]
    fn new_job_starts_waiting_with_zero_progress() {
        let job = Job::new(
            JobId::new_v4(),
            BatchId::new_v4(),
            InputRecord {
                name: "Acme".into(),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(job.state, JobState::Waiting);
        assert_eq!(job.progress, 0);
        assert_eq!(job.attempts, 0);
        assert!(job.result.is_none());
        assert!(job.failure_reason.is_none());
    }
}
