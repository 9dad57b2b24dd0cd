//! `PageDriver` implementation backed by a real `chromiumoxide::Page`.
//!
//! This is the production counterpart to `scraping-engine`'s fixture
//! driver: the engine's state machine calls exactly these operations and
//! never touches `chromiumoxide` itself.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetExtraHttpHeadersParams;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page;
use scraping_engine::{DriverError, ElementRef, PageDriver, WaitUntil};

use crate::manager::ManagedBrowser;

pub struct ChromiumPageDriver {
    page: Page,
}

impl ChromiumPageDriver {
    /// Open a fresh page against `browser`, scoped to one job. Each job
    /// gets its own `Page`, never reused across jobs, approximating the
    /// per-job isolated-context contract without assuming cookie state
    /// from a previous job leaks through.
    pub async fn open(
        browser: &ManagedBrowser,
        user_agent: &str,
        accept_language: &str,
    ) -> Result<Self, DriverError> {
        let page = browser
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Other(format!("failed to open page: {e}")))?;

        page.execute(
            SetExtraHttpHeadersParams::new(vec![("Accept-Language".into(), accept_language.into())]
                .into_iter()
                .collect::<std::collections::HashMap<_, _>>()),
        )
        .await
        .map_err(|e| DriverError::Other(format!("failed to set headers: {e}")))?;

        page.set_user_agent(user_agent)
            .await
            .map_err(|e| DriverError::Other(format!("failed to set user agent: {e}")))?;

        block_heavy_resources(&page)
            .await
            .map_err(|e| DriverError::Other(format!("failed to install resource blocking: {e}")))?;

        Ok(Self { page })
    }
}

/// Block images/fonts/stylesheets/media at the route layer, to cut page
/// to keep navigation fast and extraction deterministic.
async fn block_heavy_resources(page: &Page) -> chromiumoxide::error::Result<()> {
    use chromiumoxide::cdp::browser_protocol::network::SetBlockedUrLsParams;
    page.execute(SetBlockedUrLsParams::new(vec![
        "*.png".to_string(),
        "*.jpg".to_string(),
        "*.jpeg".to_string(),
        "*.gif".to_string(),
        "*.woff".to_string(),
        "*.woff2".to_string(),
        "*.css".to_string(),
        "*.mp4".to_string(),
        "*.webm".to_string(),
    ]))
    .await?;
    Ok(())
}

#[async_trait]
impl PageDriver for ChromiumPageDriver {
    async fn navigate(&mut self, url: &str, wait: WaitUntil) -> Result<(), DriverError> {
        tokio::time::timeout(wait.timeout, self.page.goto(url))
            .await
            .map_err(|_| DriverError::NavigationTimeout)?
            .map_err(|e| DriverError::Other(format!("navigation failed: {e}")))?;
        if wait.network_idle {
            let _ = tokio::time::timeout(wait.timeout, self.page.wait_for_navigation()).await;
        }
        Ok(())
    }

    async fn find_first(&mut self, selectors: &[&str]) -> Result<Option<ElementRef>, DriverError> {
        for selector in selectors {
            if self.page.find_element(*selector).await.is_ok() {
                return Ok(Some(ElementRef(selector.to_string())));
            }
        }
        Ok(None)
    }

    async fn find_all(&mut self, selector: &str) -> Result<Vec<ElementRef>, DriverError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| DriverError::Other(e.to_string()))?;
        Ok((0..elements.len())
            .map(|i| ElementRef(format!("{selector}#{i}")))
            .collect())
    }

    async fn text(&mut self, element: &ElementRef) -> Result<String, DriverError> {
        let selector = element.0.split('#').next().unwrap_or(&element.0);
        let el = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| DriverError::NotFound(e.to_string()))?;
        Ok(el.inner_text().await.ok().flatten().unwrap_or_default())
    }

    async fn attr(&mut self, element: &ElementRef, name: &str) -> Result<Option<String>, DriverError> {
        let selector = element.0.split('#').next().unwrap_or(&element.0);
        let el = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| DriverError::NotFound(e.to_string()))?;
        el.attribute(name)
            .await
            .map_err(|e| DriverError::Other(e.to_string()))
    }

    async fn click(&mut self, element: &ElementRef, timeout: Duration) -> Result<(), DriverError> {
        let selector = element.0.split('#').next().unwrap_or(&element.0);
        let el = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| DriverError::NotFound(e.to_string()))?;
        tokio::time::timeout(timeout, el.scroll_into_view())
            .await
            .map_err(|_| DriverError::ClickFailed("scroll into view timed out".into()))?
            .map_err(|e| DriverError::ClickFailed(e.to_string()))?;
        tokio::time::timeout(timeout, el.click())
            .await
            .map_err(|_| DriverError::ClickFailed("click timed out".into()))?
            .map_err(|e| DriverError::ClickFailed(e.to_string()))?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, DriverError> {
        self.page
            .url()
            .await
            .map_err(|e| DriverError::Other(e.to_string()))?
            .ok_or_else(|| DriverError::Other("page has no URL".into()))
    }

    async fn page_text(&mut self) -> Result<String, DriverError> {
        let result = self
            .page
            .evaluate(EvaluateParams::new("document.body.innerText"))
            .await
            .map_err(|e| DriverError::Other(e.to_string()))?;
        Ok(result.value().and_then(|v| v.as_str()).unwrap_or_default().to_string())
    }

    async fn page_source(&mut self) -> Result<String, DriverError> {
        self.page
            .content()
            .await
            .map_err(|e| DriverError::Other(e.to_string()))
    }
}
