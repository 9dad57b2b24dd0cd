//! Result classification: success, partial, or failed.

use scraping_shared::ScrapeStatus;

#[derive(Debug, Clone, Default)]
pub struct ExtractedFields {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub rating: Option<String>,
    pub reviews_count: Option<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub opening_hours_non_empty: bool,
    pub had_recoverable_error: bool,
}

/// `success` if name and address were extracted and at least one of
/// {phone, hours, rating} is present; `partial` if a recoverable error
/// occurred but name is set; `failed` otherwise.
pub fn classify(fields: &ExtractedFields) -> ScrapeStatus {
    let has_name = fields.name.is_some();
    let has_address = fields.address.is_some();
    let has_signal = fields.phone.is_some() || fields.opening_hours_non_empty || fields.rating.is_some();

    if has_name && has_address && has_signal {
        return ScrapeStatus::Success;
    }
    if fields.had_recoverable_error && has_name {
        return ScrapeStatus::Partial;
    }
    ScrapeStatus::Failed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_requires_name_address_and_one_signal() {
        let fields = ExtractedFields {
            name: Some("Acme".into()),
            address: Some("Main St 1".into()),
            phone: Some("+41 44 123 45 67".into()),
            ..Default::default()
        };
        assert_eq!(classify(&fields), ScrapeStatus::Success);
    }

    #[test]
    fn missing_signal_is_not_success() {
        let fields = ExtractedFields {
            name: Some("Acme".into()),
            address: Some("Main St 1".into()),
            ..Default::default()
        };
        assert_eq!(classify(&fields), ScrapeStatus::Failed);
    }

    #[test]
    fn recoverable_error_with_name_is_partial() {
        let fields = ExtractedFields {
            name: Some("Acme".into()),
            had_recoverable_error: true,
            ..Default::default()
        };
        assert_eq!(classify(&fields), ScrapeStatus::Partial);
    }

    #[test]
    fn nothing_extracted_is_failed() {
        assert_eq!(classify(&ExtractedFields::default()), ScrapeStatus::Failed);
    }
}
