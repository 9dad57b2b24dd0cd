//! Field extraction and validators. Each field tries a short
//! ordered selector list; the first selector yielding non-empty,
//! field-valid text wins.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use scraping_shared::{normalize, SocialPlatform};

use crate::page_driver::PageDriver;
use crate::selectors::{
    ADDRESS_SELECTORS, CATEGORY_SELECTORS, PHONE_SELECTORS, RATING_SELECTORS, RESULTS_PAGE_SENTINELS,
    REVIEWS_SELECTORS, SOCIAL_DOMAIN_STEMS, TITLE_SELECTORS, WEBSITE_SELECTORS,
};

static PURE_NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[\d.,\s]+\s*$").unwrap());
static PHONE_INTL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+\d{1,3}[\d\s\-().]{5,}$").unwrap());
static PHONE_NATIONAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0[\d\s\-().]{5,}$").unwrap());
static PHONE_DIGITS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d\s\-().]{7,15}$").unwrap());
static PHONE_REJECT_VOCAB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)★|·|review|rating|bewertung|\$|€|£").unwrap());
static PHONE_SCAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\d[\d\s\-().]{6,18}\d").unwrap());
static DECIMAL_LOOKING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+[.,]\d+\s*$").unwrap());

fn is_search_result_literal(text: &str) -> bool {
    let lower = text.to_lowercase();
    RESULTS_PAGE_SENTINELS.iter().any(|s| lower.contains(s))
}

fn looks_like_valid_phone(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.len() > 50 || PHONE_REJECT_VOCAB.is_match(trimmed) {
        return false;
    }
    PHONE_INTL.is_match(trimmed) || PHONE_NATIONAL.is_match(trimmed) || PHONE_DIGITS_ONLY.is_match(trimmed)
}

/// Main business title. Rejects search-result literals and pure numerics.
pub async fn extract_name(driver: &mut dyn PageDriver) -> Option<String> {
    let el = driver.find_first(TITLE_SELECTORS).await.ok()??;
    let text = driver.text(&el).await.ok()?;
    let trimmed = text.trim();
    if trimmed.is_empty() || is_search_result_literal(trimmed) || PURE_NUMERIC.is_match(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

pub async fn extract_address(driver: &mut dyn PageDriver) -> Option<String> {
    let el = driver.find_first(ADDRESS_SELECTORS).await.ok()??;
    let text = driver.text(&el).await.ok()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

/// Phone extraction with full-page-text fallback when no selector matches.
pub async fn extract_phone(driver: &mut dyn PageDriver, default_country_prefix: &str) -> Option<String> {
    if let Ok(Some(el)) = driver.find_first(PHONE_SELECTORS).await {
        if let Ok(text) = driver.text(&el).await {
            if looks_like_valid_phone(&text) {
                return Some(normalize::normalize_phone(&text, default_country_prefix));
            }
        }
    }

    let page_text = driver.page_text().await.ok()?;
    let candidate = PHONE_SCAN.find(&page_text)?.as_str();
    if looks_like_valid_phone(candidate) {
        return Some(normalize::normalize_phone(candidate, default_country_prefix));
    }
    None
}

pub async fn extract_rating(driver: &mut dyn PageDriver) -> Option<String> {
    let el = driver.find_first(RATING_SELECTORS).await.ok()??;
    let text = driver.text(&el).await.ok()?;
    normalize::format_rating(&text)
}

pub async fn extract_reviews_count(driver: &mut dyn PageDriver) -> Option<String> {
    let el = driver.find_first(REVIEWS_SELECTORS).await.ok()??;
    let text = driver.text(&el).await.ok()?;
    normalize::parse_reviews_count(&text)
}

/// Website link. Prefers `href`, falls back to `data-href`, rejects links
/// back to the search engine's own domain.
pub async fn extract_website(driver: &mut dyn PageDriver, search_domain: &str) -> Option<String> {
    let el = driver.find_first(WEBSITE_SELECTORS).await.ok()??;

    if let Ok(Some(href)) = driver.attr(&el, "href").await {
        if !href.contains(search_domain) {
            return Some(href);
        }
    }
    if let Ok(Some(data_href)) = driver.attr(&el, "data-href").await {
        if !data_href.contains(search_domain) {
            return Some(data_href);
        }
    }

    let text = driver.text(&el).await.ok()?;
    let trimmed = text.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Some(trimmed.to_string());
    }
    None
}

pub async fn extract_category(driver: &mut dyn PageDriver) -> Option<String> {
    let el = driver.find_first(CATEGORY_SELECTORS).await.ok()??;
    let text = driver.text(&el).await.ok()?;
    let trimmed = text.trim();
    if trimmed.is_empty()
        || PURE_NUMERIC.is_match(trimmed)
        || trimmed.contains('★')
        || DECIMAL_LOOKING.is_match(trimmed)
    {
        return None;
    }
    Some(trimmed.to_string())
}

/// First link per platform wins; enumerate every link once.
pub async fn extract_social_links(driver: &mut dyn PageDriver, selector: &str) -> HashMap<SocialPlatform, String> {
    let mut found = HashMap::new();
    let Ok(elements) = driver.find_all(selector).await else {
        return found;
    };

    for el in elements {
        let Ok(Some(href)) = driver.attr(&el, "href").await else {
            continue;
        };
        for platform in SocialPlatform::ALL {
            if found.contains_key(&platform) {
                continue;
            }
            if href.contains(platform.domain_stem())
                && SOCIAL_DOMAIN_STEMS.contains(&platform.domain_stem())
            {
                found.insert(platform, href.clone());
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixtureDriver;

    #[tokio::test]
    async fn name_rejects_results_heading() {
        let mut driver = FixtureDriver::new().with_element(TITLE_SELECTORS[0], "Ergebnisse");
        assert_eq!(extract_name(&mut driver).await, None);
    }

    #[tokio::test]
    async fn name_rejects_pure_numeric() {
        let mut driver = FixtureDriver::new().with_element(TITLE_SELECTORS[0], "12345");
        assert_eq!(extract_name(&mut driver).await, None);
    }

    #[tokio::test]
    async fn phone_falls_back_to_page_text_scan() {
        let mut driver = FixtureDriver::new().with_page_text("Call us at +41 44 123 45 67 today");
        let phone = extract_phone(&mut driver, "+41").await;
        assert!(phone.is_some());
    }

    #[tokio::test]
    async fn phone_rejects_rating_vocabulary() {
        let mut driver = FixtureDriver::new().with_element(PHONE_SELECTORS[0], "★★★★★ 4.5 rating");
        assert_eq!(extract_phone(&mut driver, "+41").await, None);
    }

    #[tokio::test]
    async fn website_rejects_search_engine_domain() {
        let mut driver = FixtureDriver::new()
            .with_element(WEBSITE_SELECTORS[0], "link")
            .with_attr(WEBSITE_SELECTORS[0], "href", "https://www.google.com/search?q=x");
        assert_eq!(extract_website(&mut driver, "google.com").await, None);
    }

    #[tokio::test]
    async fn social_links_first_occurrence_wins() {
        let mut driver = FixtureDriver::new().with_all("a.social", vec!["fb1", "fb2"]);
        // FixtureDriver attrs are keyed by element ref; emulate two distinct hrefs
        // by attaching attrs to the synthesized per-index refs.
        let mut driver = driver
            .with_attr("a.social#0", "href", "https://facebook.com/acme")
            .with_attr("a.social#1", "href", "https://facebook.com/other");
        let links = extract_social_links(&mut driver, "a.social").await;
        assert_eq!(links.get(&SocialPlatform::Facebook).unwrap(), "https://facebook.com/acme");
    }
}
