//! HTTP error mapping (component F/G/H), following `api-gateway/src/error.rs`'s
//! `status_code()`/`error_type()`/`should_log()`/`IntoResponse` shape, but
//! closed over a fixed error-kind set instead of an open-ended gateway
//! error surface.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use scraping_shared::ScrapeError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no file part named 'file'")]
    MissingFile,

    #[error("uploaded file must have a .csv suffix")]
    WrongSuffix,

    #[error("multipart read failed: {0}")]
    MultipartRead(String),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error("batch {0} not found")]
    BatchNotFound(uuid::Uuid),
}

/// `{error, message}` body: short and stable enough for clients to branch on.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::WrongSuffix => StatusCode::BAD_REQUEST,
            ApiError::MultipartRead(_) => StatusCode::BAD_REQUEST,
            ApiError::BatchNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Scrape(e) => match e {
                ScrapeError::EncodingError(_) | ScrapeError::CsvParseError(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                ScrapeError::EnqueueError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                ScrapeError::NotFound => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::MissingFile => "missing_file",
            ApiError::WrongSuffix => "wrong_suffix",
            ApiError::MultipartRead(_) => "multipart_read_error",
            ApiError::BatchNotFound(_) => "not_found",
            ApiError::Scrape(e) => e.kind(),
        }
    }

    pub fn should_log(&self) -> bool {
        !matches!(
            self,
            ApiError::MissingFile | ApiError::WrongSuffix | ApiError::BatchNotFound(_)
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();

        if self.should_log() {
            error!(error = %self, status = %status, error_type, "request failed");
        }

        let message = if status.is_server_error() {
            "internal error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: error_type, message })).into_response()
    }
}
