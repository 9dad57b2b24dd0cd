//! Upload handler (component F): buffer → decode → parse →
//! two-phase enqueue. Multipart extraction follows
//! `file-storage/src/handlers.rs::upload_multipart`'s field-iteration shape.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use scraping_shared::{encoding, ScrapeError};

use crate::csv_io::parse_input_csv;
use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    #[serde(rename = "batchId")]
    pub batch_id: Uuid,
    #[serde(rename = "jobsCreated")]
    pub jobs_created: usize,
    pub encoding: &'static str,
    #[serde(rename = "bomRemoved")]
    pub bom_removed: bool,
}

pub async fn upload_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::MultipartRead(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::MultipartRead(e.to_string()))?;
        file_bytes = Some(bytes.to_vec());
    }

    let Some(bytes) = file_bytes else {
        return Err(ApiError::MissingFile);
    };
    let name = file_name.unwrap_or_default();
    if !name.to_lowercase().ends_with(".csv") {
        return Err(ApiError::WrongSuffix);
    }

    let decoded = encoding::decode(&bytes).map_err(ApiError::Scrape)?;
    let records = parse_input_csv(&decoded.text).map_err(ApiError::Scrape)?;

    // Two-phase: collect first (above), enqueue sequentially, reply only
    // after every row has landed in the queue. Any failure aborts the
    // whole batch rather than leaving a partial one.
    let batch_id = Uuid::new_v4();
    let mut jobs_created = 0usize;
    for record in records {
        state
            .queue
            .enqueue(batch_id, record)
            .await
            .map_err(|e| ApiError::Scrape(ScrapeError::EnqueueError(e.to_string())))?;
        jobs_created += 1;
    }

    Ok(Json(UploadResponse {
        batch_id,
        jobs_created,
        encoding: decoded.encoding.as_str(),
        bom_removed: decoded.bom_removed,
    }))
}
