//! In-memory `PageDriver` fixture used by unit tests across this crate.
//! Never reaches a real browser, per the requirement that the state
//! machine be testable from fixtures alone.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::page_driver::{DriverError, ElementRef, PageDriver, WaitUntil};

#[derive(Debug, Clone, Default)]
pub struct FixtureDriver {
    elements: HashMap<String, String>,
    attrs: HashMap<(String, String), String>,
    all: HashMap<String, Vec<String>>,
    url: String,
    page_text: String,
    page_source: String,
    pub clicked: Vec<String>,
    pub navigated: Vec<String>,
}

impl FixtureDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_element(mut self, selector: &str, text: &str) -> Self {
        self.elements.insert(selector.to_string(), text.to_string());
        self
    }

    pub fn with_attr(mut self, selector: &str, attr: &str, value: &str) -> Self {
        self.attrs
            .insert((selector.to_string(), attr.to_string()), value.to_string());
        self
    }

    pub fn with_all(mut self, selector: &str, texts: Vec<&str>) -> Self {
        self.all
            .insert(selector.to_string(), texts.into_iter().map(String::from).collect());
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn with_page_text(mut self, text: &str) -> Self {
        self.page_text = text.to_string();
        self
    }

    pub fn with_page_source(mut self, source: &str) -> Self {
        self.page_source = source.to_string();
        self
    }
}

#[async_trait]
impl PageDriver for FixtureDriver {
    async fn navigate(&mut self, url: &str, _wait: WaitUntil) -> Result<(), DriverError> {
        self.navigated.push(url.to_string());
        self.url = url.to_string();
        Ok(())
    }

    async fn find_first(&mut self, selectors: &[&str]) -> Result<Option<ElementRef>, DriverError> {
        for sel in selectors {
            if self.elements.contains_key(*sel) {
                return Ok(Some(ElementRef(sel.to_string())));
            }
        }
        Ok(None)
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<ElementRef>, DriverError> {
        Ok(self
            .all
            .get(selector)
            .map(|texts| {
                (0..texts.len())
                    .map(|i| ElementRef(format!("{selector}#{i}")))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn text(&mut self, element: &ElementRef) -> Result<String, DriverError> {
        if let Some(text) = self.elements.get(&element.0) {
            return Ok(text.clone());
        }
        if let Some((selector, idx)) = element.0.split_once('#') {
            if let Some(texts) = self.all.get(selector) {
                if let Ok(i) = idx.parse::<usize>() {
                    if let Some(t) = texts.get(i) {
                        return Ok(t.clone());
                    }
                }
            }
        }
        Err(DriverError::NotFound(element.0.clone()))
    }

    async fn attr(&mut self, element: &ElementRef, name: &str) -> Result<Option<String>, DriverError> {
        Ok(self.attrs.get(&(element.0.clone(), name.to_string())).cloned())
    }

    async fn click(&mut self, element: &ElementRef, _timeout: Duration) -> Result<(), DriverError> {
        self.clicked.push(element.0.clone());
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        Ok(self.url.clone())
    }

    async fn page_text(&mut self) -> Result<String, DriverError> {
        Ok(self.page_text.clone())
    }

    async fn page_source(&mut self) -> Result<String, DriverError> {
        Ok(self.page_source.clone())
    }
}
