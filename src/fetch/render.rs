//! Browser rendering capability used when a direct fetch is blocked.
//!
//! [`ChromiumRenderer`] launches a private headless Chromium (via
//! chromiumoxide) with a throwaway profile directory for every call and
//! tears both down afterwards, so no cookies, cache or storage leak
//! between URLs. [`NoopRenderer`] stands in
//! where no browser is installed.

use crate::config::RenderConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    EnableParams, EventRequestPaused, FailRequestParams, RequestPattern, RequestStage,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::{debug, info, instrument, warn};

/// Subresources aborted while rendering; the HTML is all we keep.
const BLOCKED_RESOURCES: [ResourceType; 3] =
    [ResourceType::Image, ResourceType::Font, ResourceType::Media];

const SELECTOR_POLL: Duration = Duration::from_millis(250);

/// Produces fully rendered HTML for a URL.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, FetchError>;
}

/// A renderer for environments without a browser. Always fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn render(&self, _url: &str) -> Result<String, FetchError> {
        Err(FetchError::RendererUnavailable)
    }
}

/// Headless Chromium renderer, one browser process per render.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    config: RenderConfig,
}

impl ChromiumRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// A fresh, empty profile directory, removed when dropped.
    fn new_profile() -> Result<TempDir, FetchError> {
        tempfile::Builder::new()
            .prefix("article-metrics-chrome-")
            .tempdir()
            .map_err(|e| FetchError::Render(format!("failed to create browser profile: {e}")))
    }

    fn browser_config(&self, profile: &Path) -> Result<BrowserConfig, FetchError> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg(format!("--user-agent={}", self.config.user_agent))
            .arg(format!("--lang={}", self.config.locale))
            .request_timeout(self.config.navigation_timeout());
        if let Some(path) = &self.config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        builder
            .build()
            .map_err(|e| FetchError::Render(format!("failed to build browser config: {e}")))
    }

    /// Everything that happens inside one launched browser.
    async fn render_in(&self, browser: &Browser, url: &str) -> Result<String, FetchError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Render(format!("failed to open page: {e}")))?;

        let interceptor = block_heavy_resources(&page).await?;

        let nav_timeout = self.config.navigation_timeout();
        let navigated = tokio::time::timeout(nav_timeout, page.goto(url)).await;
        let outcome = match navigated {
            Err(_) => Err(FetchError::RenderTimeout(nav_timeout)),
            Ok(Err(e)) => Err(FetchError::Render(format!("navigation failed: {e}"))),
            Ok(Ok(_)) => {
                if let Some(selector) = &self.config.wait_selector {
                    let found = wait_for_selector(&page, selector, self.config.wait_timeout()).await;
                    debug!(%selector, found, "Waited for selector");
                }
                page.content()
                    .await
                    .map_err(|e| FetchError::Render(format!("failed to read content: {e}")))
            }
        };

        interceptor.abort();
        outcome
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    /// Launch a browser, render `url`, and always shut the browser down.
    #[instrument(level = "info", skip(self))]
    async fn render(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let profile = Self::new_profile()?;
        let (mut browser, mut handler) = Browser::launch(self.browser_config(profile.path())?)
            .await
            .map_err(|e| FetchError::Render(format!("failed to launch Chromium: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let outcome = self.render_in(&browser, url).await;

        if let Err(e) = browser.close().await {
            warn!(error = %e, "Failed to close browser cleanly");
        }
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "Failed to reap browser process");
        }
        handler_task.abort();
        if let Err(e) = profile.close() {
            warn!(error = %e, "Failed to remove browser profile");
        }

        info!(
            ok = outcome.is_ok(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Browser session closed"
        );
        outcome
    }
}

/// Abort image, font and media requests for the lifetime of `page`.
///
/// Returns the task answering paused requests; the caller aborts it once
/// the page is done.
async fn block_heavy_resources(page: &Page) -> Result<tokio::task::JoinHandle<()>, FetchError> {
    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(|e| FetchError::Render(format!("failed to listen for requests: {e}")))?;

    let patterns: Vec<RequestPattern> = BLOCKED_RESOURCES
        .iter()
        .map(|kind| {
            RequestPattern::builder()
                .url_pattern("*")
                .resource_type(kind.clone())
                .request_stage(RequestStage::Request)
                .build()
        })
        .collect();
    page.execute(EnableParams::builder().patterns(patterns).build())
        .await
        .map_err(|e| FetchError::Render(format!("failed to enable interception: {e}")))?;

    let page = page.clone();
    Ok(tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let fail = FailRequestParams::new(event.request_id.clone(), ErrorReason::BlockedByClient);
            let _ = page.execute(fail).await;
        }
    }))
}

/// Poll for `selector` until it appears or `timeout` passes.
///
/// A missing element is not an error; many pages have no `h1` at all.
async fn wait_for_selector(page: &Page, selector: &str, timeout: Duration) -> bool {
    tokio::time::timeout(timeout, async {
        loop {
            if page.find_element(selector).await.is_ok() {
                return;
            }
            tokio::time::sleep(SELECTOR_POLL).await;
        }
    })
    .await
    .is_ok()
}
