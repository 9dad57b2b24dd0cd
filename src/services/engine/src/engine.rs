//! Per-record scrape state machine:
//! `LocalePick → Searching → Navigating → ResultsPage? → DetailPage →
//! Extracting → Normalized → {Success | Partial | Failed}`.

use std::time::Duration;

use chrono::Utc;
use scraping_shared::{InputRecord, ScrapeError, ScrapeResult, ScrapeStatus};
use tracing::{debug, info, warn};

use crate::detail::is_detail_page;
use crate::coordinates::extract_coordinates;
use crate::extract::{
    extract_address, extract_category, extract_name, extract_phone, extract_rating,
    extract_reviews_count, extract_social_links, extract_website,
};
use crate::hours::extract_opening_hours;
use crate::locale::detect_locale;
use crate::page_driver::{PageDriver, WaitUntil};
use crate::result::{classify, ExtractedFields};
use crate::search::build_strategies;
use crate::selectors::{RESULT_LINK_SELECTORS, SOCIAL_DOMAIN_STEMS};

const SEARCH_DOMAIN: &str = "google.com";
const SOCIAL_LINK_SELECTOR: &str = "a[href]";
const CLICK_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub navigation_timeout: Duration,
    pub settle_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            navigation_timeout: Duration::from_secs(30),
            settle_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Clone)]
pub struct ScrapeEngine {
    config: EngineConfig,
}

impl ScrapeEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run the full state machine for one record against a live (or
    /// fixture) `PageDriver`. Never panics on a missing field: each
    /// extractor returns `None` and the classifier decides the outcome.
    pub async fn scrape(
        &self,
        driver: &mut dyn PageDriver,
        record: &InputRecord,
    ) -> Result<ScrapeResult, ScrapeError> {
        let locale = detect_locale(record);
        let strategies = build_strategies(record, &locale);
        if strategies.is_empty() {
            return Err(ScrapeError::NotFound);
        }

        let wait = WaitUntil {
            network_idle: true,
            timeout: self.config.navigation_timeout,
        };

        let mut reached_detail = false;
        let mut had_recoverable_error = false;

        for (idx, strategy) in strategies.iter().enumerate() {
            debug!(strategy = idx, query = %strategy.query, "trying search strategy");
            match driver.navigate(&strategy.url, wait).await {
                Ok(()) => {}
                Err(e) => {
                    warn!(strategy = idx, "navigation failed: {e}");
                    had_recoverable_error = true;
                    continue;
                }
            }
            tokio::time::sleep(self.config.settle_delay).await;

            if is_detail_page(driver).await.unwrap_or(false) {
                reached_detail = true;
                break;
            }

            let Ok(Some(result_link)) = driver.find_first(RESULT_LINK_SELECTORS).await else {
                continue;
            };

            if let Ok(Some(href)) = driver.attr(&result_link, "href").await {
                if href.contains("/maps/place/") {
                    if driver.navigate(&href, wait).await.is_err() {
                        had_recoverable_error = true;
                        continue;
                    }
                } else if driver.click(&result_link, CLICK_TIMEOUT).await.is_err() {
                    had_recoverable_error = true;
                    continue;
                }
            } else if driver.click(&result_link, CLICK_TIMEOUT).await.is_err() {
                had_recoverable_error = true;
                continue;
            }

            tokio::time::sleep(self.config.settle_delay).await;
            if is_detail_page(driver).await.unwrap_or(false) {
                reached_detail = true;
                break;
            }
        }

        if !reached_detail {
            return Err(ScrapeError::NotFound);
        }

        let fields = self.extract_all(driver, locale.phone_prefix).await;
        let opening_hours = extract_opening_hours(driver).await;
        let social_media = extract_social_links(driver, SOCIAL_LINK_SELECTOR)
            .await
            .into_iter()
            .filter(|(_, href)| SOCIAL_DOMAIN_STEMS.iter().any(|stem| href.contains(stem)))
            .collect();
        let coords = extract_coordinates(driver).await;

        let status = classify(&ExtractedFields {
            had_recoverable_error,
            opening_hours_non_empty: !opening_hours.is_empty(),
            ..fields.clone()
        });

        if status == ScrapeStatus::Failed {
            return Err(ScrapeError::ExtractionPartial(
                "required fields missing after extraction".into(),
            ));
        }

        info!(status = ?status, "scrape completed");

        Ok(ScrapeResult {
            status,
            full_name: fields.name.unwrap_or_default(),
            full_address: fields.address.unwrap_or_default(),
            phone: fields.phone.unwrap_or_default(),
            rating: fields.rating.unwrap_or_default(),
            reviews_count: fields.reviews_count.unwrap_or_default(),
            website: fields.website.unwrap_or_default(),
            category: fields.category.unwrap_or_default(),
            latitude: coords.map(|(lat, _)| lat.to_string()).unwrap_or_default(),
            longitude: coords.map(|(_, lng)| lng.to_string()).unwrap_or_default(),
            opening_hours,
            social_media,
            scraped_at: Utc::now(),
            error: None,
        })
    }

    async fn extract_all(&self, driver: &mut dyn PageDriver, phone_prefix: &str) -> ExtractedFields {
        let name = extract_name(driver).await;
        let address = extract_address(driver).await;
        let phone = extract_phone(driver, phone_prefix).await;
        let rating = extract_rating(driver).await;
        let reviews_count = extract_reviews_count(driver).await;
        let website = extract_website(driver, SEARCH_DOMAIN).await;
        let category = extract_category(driver).await;

        ExtractedFields {
            name,
            address,
            phone,
            rating,
            reviews_count,
            website,
            category,
            latitude: None,
            longitude: None,
            opening_hours_non_empty: false,
            had_recoverable_error: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selectors::{ADDRESS_SELECTORS, PHONE_SELECTORS, TITLE_SELECTORS};
    use crate::testing::FixtureDriver;

    fn record() -> InputRecord {
        InputRecord {
            name: "Acme Bakery".into(),
            address: "Bahnhofstrasse 1".into(),
            city: "Zürich".into(),
            postal_code: "8001".into(),
        }
    }

    #[tokio::test]
    async fn full_happy_path_reaches_success() {
        let mut driver = FixtureDriver::new()
            .with_element(TITLE_SELECTORS[0], "Acme Bakery")
            .with_element(ADDRESS_SELECTORS[0], "Bahnhofstrasse 1, 8001 Zürich")
            .with_element(PHONE_SELECTORS[0], "+41 44 123 45 67")
            .with_url("https://www.google.com/maps/place/Acme/@47.3769,8.5417,15z");

        let engine = ScrapeEngine::new(EngineConfig {
            navigation_timeout: Duration::from_secs(1),
            settle_delay: Duration::from_millis(1),
        });
        let result = engine.scrape(&mut driver, &record()).await.unwrap();
        assert_eq!(result.status, ScrapeStatus::Success);
        assert_eq!(result.full_name, "Acme Bakery");
        assert_eq!(result.latitude, "47.3769");
    }

    #[tokio::test]
    async fn no_detail_page_reached_returns_not_found() {
        let mut driver = FixtureDriver::new();
        let engine = ScrapeEngine::new(EngineConfig {
            navigation_timeout: Duration::from_secs(1),
            settle_delay: Duration::from_millis(1),
        });
        let err = engine.scrape(&mut driver, &record()).await.unwrap_err();
        assert!(matches!(err, ScrapeError::NotFound));
    }

    #[tokio::test]
    async fn empty_record_with_no_strategies_is_not_found() {
        let mut driver = FixtureDriver::new();
        let engine = ScrapeEngine::new(EngineConfig::default());
        let empty = InputRecord::default();
        let err = engine.scrape(&mut driver, &empty).await.unwrap_err();
        assert!(matches!(err, ScrapeError::NotFound));
    }
}
