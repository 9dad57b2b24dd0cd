//! Locale pick: country detection from postal-code shape and
//! city/address token sets, and the config that detection selects.

use once_cell::sync::Lazy;
use scraping_shared::InputRecord;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Country {
    Ch,
    De,
    Fr,
    It,
    Es,
    Co,
}

impl Country {
    pub fn region_code(&self) -> &'static str {
        match self {
            Country::Ch => "CH",
            Country::De => "DE",
            Country::Fr => "FR",
            Country::It => "IT",
            Country::Es => "ES",
            Country::Co => "CO",
        }
    }

    pub fn phone_prefix(&self) -> &'static str {
        match self {
            Country::Ch => "+41",
            Country::De => "+49",
            Country::Fr => "+33",
            Country::It => "+39",
            Country::Es => "+34",
            Country::Co => "+57",
        }
    }

    pub fn timezone(&self) -> &'static str {
        match self {
            Country::Ch => "Europe/Zurich",
            Country::De => "Europe/Berlin",
            Country::Fr => "Europe/Paris",
            Country::It => "Europe/Rome",
            Country::Es => "Europe/Madrid",
            Country::Co => "America/Bogota",
        }
    }
}

/// Locale config the browser context and search queries are built from.
/// The interface language/UA/Accept-Language are pinned to `en-US`
/// regardless of detected country to stabilize extraction; only `region`
/// (the `gl` query parameter) reflects the detected country.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    pub country: Country,
    pub interface_language: &'static str,
    pub region: &'static str,
    pub timezone: &'static str,
    pub user_agent: &'static str,
    pub accept_language: &'static str,
    pub phone_prefix: &'static str,
}

const STABLE_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

impl LocaleConfig {
    fn for_country(country: Country) -> Self {
        Self {
            country,
            interface_language: "en-US",
            region: country.region_code(),
            timezone: country.timezone(),
            user_agent: STABLE_USER_AGENT,
            accept_language: "en-US,en;q=0.9",
            phone_prefix: country.phone_prefix(),
        }
    }
}

static CH_CITIES: &[&str] = &[
    "zurich", "zürich", "geneva", "genève", "basel", "bern", "lausanne", "lucerne", "luzern",
    "lugano", "st. gallen", "st gallen", "winterthur", "biel", "bienne",
];

static CO_CITIES: &[&str] = &["cartagena", "bogota", "bogotá", "medellin", "medellín", "cali"];

static CITY_COUNTRY: Lazy<HashMap<&'static str, Country>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for c in CH_CITIES {
        m.insert(*c, Country::Ch);
    }
    for c in CO_CITIES {
        m.insert(*c, Country::Co);
    }
    m
});

fn contains_token(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Detect the country for a record using postal-code shape, known city
/// names, and address-token overrides (e.g. `strasse`, `rue`, `via`).
pub fn detect_locale(record: &InputRecord) -> LocaleConfig {
    let city_key = record.city.trim().to_lowercase();
    if let Some(country) = CITY_COUNTRY.get(city_key.as_str()) {
        return LocaleConfig::for_country(*country);
    }

    if record.address.to_uppercase().contains("CH-") {
        return LocaleConfig::for_country(Country::Ch);
    }
    if contains_token(&record.address, "strasse") || contains_token(&record.address, "straße") {
        return LocaleConfig::for_country(Country::De);
    }
    if contains_token(&record.address, "rue ") || contains_token(&record.address, "rue, ") {
        return LocaleConfig::for_country(Country::Fr);
    }
    if contains_token(&record.address, "via ") {
        return LocaleConfig::for_country(Country::It);
    }

    let postal = record.postal_code.trim();
    let digits: String = postal.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        4 => LocaleConfig::for_country(Country::Ch),
        5 => LocaleConfig::for_country(Country::De),
        _ => LocaleConfig::for_country(Country::De),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, address: &str, city: &str, postal: &str) -> InputRecord {
        InputRecord {
            name: name.into(),
            address: address.into(),
            city: city.into(),
            postal_code: postal.into(),
        }
    }

    #[test]
    fn four_digit_postal_picks_switzerland() {
        let r = record("Acme", "Bahnhofstrasse 1", "", "8001");
        assert_eq!(detect_locale(&r).country, Country::Ch);
    }

    #[test]
    fn known_city_overrides_postal_shape() {
        let r = record("Acme", "Main St 1", "Bogotá", "12345");
        assert_eq!(detect_locale(&r).country, Country::Co);
    }

    #[test]
    fn rue_token_picks_france() {
        let r = record("Acme", "12 Rue de Rivoli", "Paris", "75001");
        assert_eq!(detect_locale(&r).country, Country::Fr);
    }

    #[test]
    fn locale_pins_interface_language_to_en_us_regardless_of_country() {
        let r = record("Acme", "Via Roma 1", "Milano", "20100");
        let locale = detect_locale(&r);
        assert_eq!(locale.country, Country::It);
        assert_eq!(locale.interface_language, "en-US");
        assert_eq!(locale.region, "IT");
    }
}
