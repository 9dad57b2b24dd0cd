//! Search strategies: the ordered query list for one record,
//! and the static city-coordinate table used to narrow the search viewport.

use once_cell::sync::Lazy;
use scraping_shared::InputRecord;
use std::collections::HashMap;
use url::Url;

use crate::locale::LocaleConfig;

/// One candidate search URL. Strategies are tried in order; the caller
/// stops at the first one that reaches a detail page.
#[derive(Debug, Clone)]
pub struct SearchStrategy {
    pub query: String,
    pub url: String,
}

static CITY_COORDS: Lazy<HashMap<&'static str, (f64, f64)>> = Lazy::new(|| {
    HashMap::from([
        ("zurich", (47.3769, 8.5417)),
        ("zürich", (47.3769, 8.5417)),
        ("geneva", (46.2044, 6.1432)),
        ("basel", (47.5596, 7.5886)),
        ("bern", (46.9480, 7.4474)),
        ("berlin", (52.5200, 13.4050)),
        ("paris", (48.8566, 2.3522)),
        ("milano", (45.4642, 9.1900)),
        ("madrid", (40.4168, -3.7038)),
        ("bogotá", (4.7110, -74.0721)),
        ("bogota", (4.7110, -74.0721)),
    ])
});

const SEARCH_BASE: &str = "https://www.google.com/maps/search/";

fn non_empty(s: &str) -> Option<&str> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t)
    }
}

fn build_url(query: &str, locale: &LocaleConfig, city: &str) -> String {
    let mut url = Url::parse(SEARCH_BASE).expect("static base url is valid");
    {
        let mut qp = url.query_pairs_mut();
        qp.append_pair("q", query);
        qp.append_pair("hl", "en");
        qp.append_pair("gl", locale.region);
    }
    if let Some((lat, lng)) = CITY_COORDS.get(city.trim().to_lowercase().as_str()) {
        let mut qp = url.query_pairs_mut();
        qp.append_pair("center", &format!("{lat},{lng}"));
        qp.append_pair("zoom", "13");
    }
    url.to_string()
}

/// Build up to five search strategies for `record`, skipping any whose
/// required fields are missing. Order matters: most specific first.
pub fn build_strategies(record: &InputRecord, locale: &LocaleConfig) -> Vec<SearchStrategy> {
    let name = non_empty(&record.name);
    let address = non_empty(&record.address);
    let city = non_empty(&record.city);

    let mut strategies = Vec::with_capacity(5);
    let mut push = |query: String| {
        let url = build_url(&query, locale, record.city.as_str());
        strategies.push(SearchStrategy { query, url });
    };

    if let (Some(n), Some(a), Some(c)) = (name, address, city) {
        push(format!("{n}, {a}, {c}"));
    }
    if let (Some(n), Some(c)) = (name, city) {
        push(format!("{n} {c}"));
    }
    if let (Some(n), Some(a)) = (name, address) {
        push(format!("{n} {a}"));
    }
    if let (Some(a), Some(c)) = (address, city) {
        push(format!("{a}, {c}"));
    }
    if let (Some(n), Some(c)) = (name, city) {
        push(format!("\"{n}\" {c}"));
    }

    strategies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::detect_locale;

    fn record() -> InputRecord {
        InputRecord {
            name: "Acme Bakery".into(),
            address: "Bahnhofstrasse 1".into(),
            city: "Zürich".into(),
            postal_code: "8001".into(),
        }
    }

    #[test]
    fn builds_all_five_strategies_when_fully_populated() {
        let r = record();
        let locale = detect_locale(&r);
        let strategies = build_strategies(&r, &locale);
        assert_eq!(strategies.len(), 5);
        assert_eq!(strategies[0].query, "Acme Bakery, Bahnhofstrasse 1, Zürich");
        assert_eq!(strategies[4].query, "\"Acme Bakery\" Zürich");
    }

    #[test]
    fn skips_strategies_needing_missing_fields() {
        let r = InputRecord {
            name: "Acme Bakery".into(),
            address: String::new(),
            city: "Zürich".into(),
            postal_code: "8001".into(),
        };
        let locale = detect_locale(&r);
        let strategies = build_strategies(&r, &locale);
        // strategy 2 ("name city") and 5 (quoted name+city) survive; 1, 3, 4 need address
        assert_eq!(strategies.len(), 2);
    }

    #[test]
    fn known_city_adds_center_and_zoom() {
        let r = record();
        let locale = detect_locale(&r);
        let strategies = build_strategies(&r, &locale);
        assert!(strategies[0].url.contains("center="));
        assert!(strategies[0].url.contains("zoom=13"));
    }
}
