//! CSV parsing for ingest (component F) and row-building for export
//! (component G). Separate from `scraping_shared::encoding`
//! since that crate owns only the character-pipeline primitives, not the
//! `csv` crate's structured reader/writer.

use chrono::Utc;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use scraping_shared::encoding::prepare_for_csv;
use scraping_shared::{InputRecord, Job, JobState, ScrapeError, Weekday};

/// Parse a decoded CSV body into enqueueable input rows.
///
/// Recognized headers (case-insensitive, trimmed): `name`, `address`,
/// `city`, `postcode`/`postal_code`. Unrecognized columns are ignored.
/// Rows with neither `name` nor `address` are dropped per
/// `InputRecord::is_enqueueable`.
pub fn parse_input_csv(text: &str) -> Result<Vec<InputRecord>, ScrapeError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ScrapeError::CsvParseError(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let name_idx = headers.iter().position(|h| h == "name");
    let address_idx = headers.iter().position(|h| h == "address");
    let city_idx = headers.iter().position(|h| h == "city");
    let postal_idx = headers
        .iter()
        .position(|h| h == "postcode" || h == "postal_code");

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| ScrapeError::CsvParseError(e.to_string()))?;
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let field = |idx: Option<usize>| -> String {
            idx.and_then(|i| row.get(i))
                .map(str::trim)
                .unwrap_or("")
                .to_string()
        };

        let record = InputRecord {
            name: field(name_idx),
            address: field(address_idx),
            city: field(city_idx),
            postal_code: field(postal_idx),
        };

        if record.is_enqueueable() {
            records.push(record);
        }
    }

    Ok(records)
}

const EXPORT_HEADERS: [&str; 15] = [
    "Name",
    "Rating",
    "Reviews Count",
    "Phone",
    "Address",
    "Website",
    "Category",
    "Monday Hours",
    "Tuesday Hours",
    "Wednesday Hours",
    "Thursday Hours",
    "Friday Hours",
    "Saturday Hours",
    "Sunday Hours",
    "Status",
];

/// Build the exact 15-column export body, UTF-8-BOM-prefixed.
pub fn build_export_csv(jobs: &[Job]) -> Result<Vec<u8>, ScrapeError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer
        .write_record(EXPORT_HEADERS)
        .map_err(|e| ScrapeError::Internal(format!("csv write failed: {e}")))?;

    for job in jobs {
        let status = match job.state {
            JobState::Completed => job
                .result
                .as_ref()
                .map(|r| format!("{:?}", r.status).to_lowercase())
                .unwrap_or_default(),
            JobState::Failed => "failed".to_string(),
            JobState::Waiting => "waiting".to_string(),
            JobState::Active => "processing".to_string(),
        };

        let result = job.result.as_ref();
        let row = [
            result.map(|r| r.full_name.as_str()).unwrap_or_default(),
            result.map(|r| r.rating.as_str()).unwrap_or_default(),
            result.map(|r| r.reviews_count.as_str()).unwrap_or_default(),
            result.map(|r| r.phone.as_str()).unwrap_or_default(),
            result.map(|r| r.full_address.as_str()).unwrap_or_default(),
            result.map(|r| r.website.as_str()).unwrap_or_default(),
            result.map(|r| r.category.as_str()).unwrap_or_default(),
            result.map(|r| r.opening_hours_for(Weekday::Monday)).unwrap_or_default(),
            result.map(|r| r.opening_hours_for(Weekday::Tuesday)).unwrap_or_default(),
            result.map(|r| r.opening_hours_for(Weekday::Wednesday)).unwrap_or_default(),
            result.map(|r| r.opening_hours_for(Weekday::Thursday)).unwrap_or_default(),
            result.map(|r| r.opening_hours_for(Weekday::Friday)).unwrap_or_default(),
            result.map(|r| r.opening_hours_for(Weekday::Saturday)).unwrap_or_default(),
            result.map(|r| r.opening_hours_for(Weekday::Sunday)).unwrap_or_default(),
            status.as_str(),
        ];
        let row: Vec<String> = row.iter().map(|cell| prepare_for_csv(cell)).collect();

        writer
            .write_record(&row)
            .map_err(|e| ScrapeError::Internal(format!("csv write failed: {e}")))?;
    }

    let body = writer
        .into_inner()
        .map_err(|e| ScrapeError::Internal(format!("csv flush failed: {e}")))?;

    let mut out = Vec::with_capacity(body.len() + 3);
    out.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
    out.extend_from_slice(&body);
    Ok(out)
}

/// `Content-Disposition` filename, timestamped at the moment of export.
pub fn export_filename() -> String {
    format!("scraping-results-{}.csv", Utc::now().format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recognized_headers_case_insensitively() {
        let csv = "Name,Address,City,Postcode\nAcme,Main St 1,Zurich,8001\n";
        let records = parse_input_csv(csv).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Acme");
        assert_eq!(records[0].postal_code, "8001");
    }

    #[test]
    fn accepts_postal_code_alias() {
        let csv = "name,postal_code\nAcme,8001\n";
        let records = parse_input_csv(csv).unwrap();
        assert_eq!(records[0].postal_code, "8001");
    }

    #[test]
    fn drops_rows_with_neither_name_nor_address() {
        let csv = "name,address,city,postcode\n,,Zurich,8001\nAcme,,,\n";
        let records = parse_input_csv(csv).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Acme");
    }

    #[test]
    fn skips_fully_empty_lines() {
        let csv = "name,address\nAcme,Main St 1\n,\n";
        let records = parse_input_csv(csv).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn export_csv_starts_with_utf8_bom() {
        let bytes = build_export_csv(&[]).unwrap();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
    }

    #[test]
    fn export_csv_collapses_embedded_newlines_in_fields() {
        use scraping_shared::{BatchId, InputRecord, JobId, ScrapeResult, ScrapeStatus};

        let mut job = Job::new(JobId::new_v4(), BatchId::new_v4(), InputRecord::default(), Utc::now());
        job.state = JobState::Completed;
        let mut result = ScrapeResult::empty(ScrapeStatus::Success, Utc::now());
        result.full_address = "Main St 1\nSuite  2".to_string();
        job.result = Some(result);

        let bytes = build_export_csv(&[job]).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let data_line = text.lines().nth(1).unwrap();
        assert!(data_line.contains("Main St 1 Suite 2"));
        assert!(!data_line.contains('\n'));
    }

    #[test]
    fn export_csv_header_row_has_all_fifteen_columns() {
        let bytes = build_export_csv(&[]).unwrap();
        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let first_line = text.lines().next().unwrap();
        assert_eq!(
            first_line,
            "Name,Rating,Reviews Count,Phone,Address,Website,Category,Monday Hours,Tuesday Hours,Wednesday Hours,Thursday Hours,Friday Hours,Saturday Hours,Sunday Hours,Status"
        );
    }
}
