//! Coordinate extraction: four ordered strategies, first
//! success wins.

use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

use crate::page_driver::PageDriver;
use crate::selectors::SHARE_BUTTON_SELECTORS;

static URL_AT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(-?\d+\.\d+),(-?\d+\.\d+),\d+(?:\.\d+)?z").unwrap());

static BANG_3D_4D_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!3d(-?\d+\.\d+)!4d(-?\d+\.\d+)").unwrap());

static META_GEO_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<meta[^>]*property="geo:(?:lat|position)"[^>]*content="(-?\d+\.\d+)[,;]\s*(-?\d+\.\d+)?"#)
        .unwrap()
});

static APP_STATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"APP_INITIALIZATION_STATE.*?\[\[(-?\d+\.\d+),(-?\d+\.\d+)\]").unwrap());

pub fn parse_url_at(url: &str) -> Option<(f64, f64)> {
    let caps = URL_AT_PATTERN.captures(url)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

pub fn parse_bang_3d_4d(url: &str) -> Option<(f64, f64)> {
    let caps = BANG_3D_4D_PATTERN.captures(url)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

pub fn scan_page_source(source: &str) -> Option<(f64, f64)> {
    if let Some(caps) = META_GEO_PATTERN.captures(source) {
        if let (Ok(lat), Some(lng_m)) = (caps[1].parse::<f64>(), caps.get(2)) {
            if let Ok(lng) = lng_m.as_str().parse::<f64>() {
                return Some((lat, lng));
            }
        }
    }
    if let Some(caps) = APP_STATE_PATTERN.captures(source) {
        return Some((caps[1].parse().ok()?, caps[2].parse().ok()?));
    }
    None
}

/// Run all four strategies against the live page, in spec order, returning
/// the first hit.
pub async fn extract_coordinates(driver: &mut dyn PageDriver) -> Option<(f64, f64)> {
    let url = driver.current_url().await.ok()?;
    if let Some(coords) = parse_url_at(&url) {
        return Some(coords);
    }
    if let Some(coords) = parse_bang_3d_4d(&url) {
        return Some(coords);
    }
    if let Ok(source) = driver.page_source().await {
        if let Some(coords) = scan_page_source(&source) {
            return Some(coords);
        }
    }

    if let Ok(Some(share_btn)) = driver.find_first(SHARE_BUTTON_SELECTORS).await {
        if driver.click(&share_btn, Duration::from_secs(8)).await.is_ok() {
            if let Ok(share_url) = driver.current_url().await {
                if let Some(coords) = parse_url_at(&share_url) {
                    return Some(coords);
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_at_lat_lng_zoom() {
        let url = "https://www.google.com/maps/place/Acme/@47.3769,8.5417,15z";
        assert_eq!(parse_url_at(url), Some((47.3769, 8.5417)));
    }

    #[test]
    fn parses_bang_3d_4d() {
        let url = "https://www.google.com/maps/place/Acme/data=!4m5!3m4!1s0x0:0x0!3d47.3769!4d8.5417";
        assert_eq!(parse_bang_3d_4d(url), Some((47.3769, 8.5417)));
    }

    #[test]
    fn scans_meta_geo_tag() {
        let source = r#"<html><meta property="geo:position" content="47.3769,8.5417"></html>"#;
        assert_eq!(scan_page_source(source), Some((47.3769, 8.5417)));
    }

    #[test]
    fn no_match_returns_none() {
        assert_eq!(parse_url_at("https://example.com/"), None);
        assert_eq!(scan_page_source("<html></html>"), None);
    }
}
