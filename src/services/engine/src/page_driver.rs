//! Browser abstraction seam.
//!
//! The engine never calls `chromiumoxide` directly; it is generic over this
//! trait instead, treating the headless browser as an external black-box
//! capability. This lets the state machine be unit tested against a
//! fixture implementation without a real browser.

use async_trait::async_trait;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitUntil {
    pub network_idle: bool,
    pub timeout: Duration,
}

impl Default for WaitUntil {
    fn default() -> Self {
        Self {
            network_idle: true,
            timeout: Duration::from_secs(30),
        }
    }
}

/// One logical element found on the page: enough to read text/attrs or
/// click, without leaking a concrete `chromiumoxide` handle type.
#[derive(Debug, Clone)]
pub struct ElementRef(pub String);

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("navigation timed out")]
    NavigationTimeout,
    #[error("element not found: {0}")]
    NotFound(String),
    #[error("click failed: {0}")]
    ClickFailed(String),
    #[error("driver error: {0}")]
    Other(String),
}

/// Operations the scrape engine needs from a live (or faked) browser page.
/// Production implementations live in `scraping-browser-pool` on top of a
/// pooled `chromiumoxide::Browser`; tests use an in-memory fixture.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn navigate(&mut self, url: &str, wait: WaitUntil) -> Result<(), DriverError>;

    /// Find the first element matching any selector in `selectors`, in
    /// order. Returns `None` rather than erroring when nothing matches.
    async fn find_first(&mut self, selectors: &[&str]) -> Result<Option<ElementRef>, DriverError>;

    async fn find_all(&mut self, selector: &str) -> Result<Vec<ElementRef>, DriverError>;

    async fn text(&mut self, element: &ElementRef) -> Result<String, DriverError>;

    async fn attr(&mut self, element: &ElementRef, name: &str) -> Result<Option<String>, DriverError>;

    async fn click(&mut self, element: &ElementRef, timeout: Duration) -> Result<(), DriverError>;

    async fn current_url(&mut self) -> Result<String, DriverError>;

    /// Full visible page text, used as a last-resort scan surface (e.g.
    /// phone-number regex fallback).
    async fn page_text(&mut self) -> Result<String, DriverError>;

    /// Raw HTML/script content, used to scan for embedded JS state objects
    /// and `<meta>` tags (coordinate-extraction strategy iii).
    async fn page_source(&mut self) -> Result<String, DriverError>;
}

impl From<DriverError> for scraping_shared::ScrapeError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::NavigationTimeout => scraping_shared::ScrapeError::NavigationTimeout,
            other => scraping_shared::ScrapeError::DetailAccessError(other.to_string()),
        }
    }
}
