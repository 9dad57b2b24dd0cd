//! Error kinds shared across crates.
//!
//! Each variant names one of the error kinds the ingest pipeline or scrape
//! engine can produce; HTTP status mapping lives in `scraping-api` since
//! that's the only crate that needs to speak `axum::response`.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ScrapeError {
    #[error("CSV bytes could not be decoded: {0}")]
    EncodingError(String),

    #[error("CSV structure error: {0}")]
    CsvParseError(String),

    #[error("queue rejected a row: {0}")]
    EnqueueError(String),

    #[error("browser pool did not yield an instance in time")]
    BrowserAcquireTimeout,

    #[error("navigation timed out")]
    NavigationTimeout,

    #[error("Business not found with any search strategy")]
    NotFound,

    #[error("detail page reached but not extractable: {0}")]
    DetailAccessError(String),

    #[error("one or more fields failed validation: {0}")]
    ExtractionPartial(String),

    #[error("progress stream failed: {0}")]
    StreamError(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ScrapeError {
    /// Stable machine-readable name of this error kind, used as the `error`
    /// field of JSON error bodies and as the `failureReason` prefix.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::EncodingError(_) => "encoding_error",
            ScrapeError::CsvParseError(_) => "csv_parse_error",
            ScrapeError::EnqueueError(_) => "enqueue_error",
            ScrapeError::BrowserAcquireTimeout => "browser_acquire_timeout",
            ScrapeError::NavigationTimeout => "navigation_timeout",
            ScrapeError::NotFound => "not_found",
            ScrapeError::DetailAccessError(_) => "detail_access_error",
            ScrapeError::ExtractionPartial(_) => "extraction_partial",
            ScrapeError::StreamError(_) => "stream_error",
            ScrapeError::Internal(_) => "internal_error",
        }
    }

    /// Whether a job may be retried after this error, per the retry policy
    /// living in the queue rather than the engine.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScrapeError::BrowserAcquireTimeout | ScrapeError::NavigationTimeout
        )
    }
}
