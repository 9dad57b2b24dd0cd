//! Detail-page heuristic: is the current page a business
//! detail page, or still a search-results list?

use crate::page_driver::{DriverError, PageDriver};
use crate::selectors::{ADDRESS_SELECTORS, PHONE_SELECTORS, RATING_SELECTORS, RESULTS_PAGE_SENTINELS, TITLE_SELECTORS};

/// Positive: a title node that isn't a results-page heading, plus at least
/// one of {address, phone, rating}. Negative sentinels short-circuit to
/// `false` immediately.
pub async fn is_detail_page(driver: &mut dyn PageDriver) -> Result<bool, DriverError> {
    let Some(title_el) = driver.find_first(TITLE_SELECTORS).await? else {
        return Ok(false);
    };
    let title_text = driver.text(&title_el).await?.to_lowercase();
    if RESULTS_PAGE_SENTINELS.iter().any(|s| title_text.contains(s)) {
        return Ok(false);
    }

    let has_address = driver.find_first(ADDRESS_SELECTORS).await?.is_some();
    let has_phone = driver.find_first(PHONE_SELECTORS).await?.is_some();
    let has_rating = driver.find_first(RATING_SELECTORS).await?.is_some();

    Ok(has_address || has_phone || has_rating)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixtureDriver;

    #[tokio::test]
    async fn detail_page_with_title_and_address_is_positive() {
        let mut driver = FixtureDriver::new()
            .with_element(TITLE_SELECTORS[0], "Acme Bakery")
            .with_element(ADDRESS_SELECTORS[0], "Bahnhofstrasse 1, Zürich");
        assert!(is_detail_page(&mut driver).await.unwrap());
    }

    #[tokio::test]
    async fn results_heading_is_negative_even_with_other_nodes() {
        let mut driver = FixtureDriver::new()
            .with_element(TITLE_SELECTORS[0], "Results")
            .with_element(ADDRESS_SELECTORS[0], "whatever");
        assert!(!is_detail_page(&mut driver).await.unwrap());
    }

    #[tokio::test]
    async fn no_title_node_is_negative() {
        let mut driver = FixtureDriver::new();
        assert!(!is_detail_page(&mut driver).await.unwrap());
    }
}
