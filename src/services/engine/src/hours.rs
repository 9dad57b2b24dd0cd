//! Opening-hours extraction: expand the affordance if collapsed, read each
//! row, and attribute it to a day without assuming row order.

use std::collections::HashMap;
use std::time::Duration;

use scraping_shared::{normalize::localize_and_normalize, Weekday};

use crate::page_driver::PageDriver;
use crate::selectors::{HOURS_ROW_SELECTOR, HOURS_TOGGLE_SELECTORS};

fn weekday_from_str(name: &str) -> Option<Weekday> {
    match name {
        "Monday" => Some(Weekday::Monday),
        "Tuesday" => Some(Weekday::Tuesday),
        "Wednesday" => Some(Weekday::Wednesday),
        "Thursday" => Some(Weekday::Thursday),
        "Friday" => Some(Weekday::Friday),
        "Saturday" => Some(Weekday::Saturday),
        "Sunday" => Some(Weekday::Sunday),
        _ => None,
    }
}

/// Expand the hours panel if it's behind a toggle, then read and normalize
/// every row. Rows whose day cannot be identified are skipped (their bucket
/// stays empty rather than being guessed from position).
pub async fn extract_opening_hours(driver: &mut dyn PageDriver) -> HashMap<Weekday, String> {
    if let Ok(Some(toggle)) = driver.find_first(HOURS_TOGGLE_SELECTORS).await {
        let _ = driver.click(&toggle, Duration::from_secs(3)).await;
    }

    let mut hours = HashMap::new();
    let Ok(rows) = driver.find_all(HOURS_ROW_SELECTOR).await else {
        return hours;
    };

    for row in rows {
        let Ok(text) = driver.text(&row).await else {
            continue;
        };
        let (day, normalized) = localize_and_normalize(&text);
        if let Some(day) = day.and_then(weekday_from_str) {
            hours.insert(day, normalized);
        }
    }

    hours
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FixtureDriver;

    #[tokio::test]
    async fn rows_are_attributed_by_scanned_day_not_position() {
        let mut driver = FixtureDriver::new().with_all(
            HOURS_ROW_SELECTOR,
            vec!["Donnerstag 08:00-18:00", "Montag Closed"],
        );
        let hours = extract_opening_hours(&mut driver).await;
        assert_eq!(hours.get(&Weekday::Thursday).unwrap(), "08:00 - 18:00");
        assert_eq!(hours.get(&Weekday::Monday).unwrap(), "Closed");
        assert!(!hours.contains_key(&Weekday::Tuesday));
    }

    #[tokio::test]
    async fn unrecognized_row_is_skipped() {
        let mut driver = FixtureDriver::new().with_all(HOURS_ROW_SELECTOR, vec!["no day token"]);
        let hours = extract_opening_hours(&mut driver).await;
        assert!(hours.is_empty());
    }
}
