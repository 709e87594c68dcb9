//! Page fetching with a browser fallback for blocked requests.
//!
//! [`PageFetcher`] tries a plain HTTP GET first. When the response carries a
//! blocking status (403/429 by default) and the fallback is enabled, the
//! page is fetched again through a [`Renderer`], which drives a real
//! headless browser. Rendering is slow, so it is only used when the cheap
//! path was refused.

pub mod render;

pub use render::{ChromiumRenderer, NoopRenderer, Renderer};

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::models::FetchResult;
use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, REFERER};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Anything that can turn a URL into a [`FetchResult`].
///
/// The pipeline depends on this trait rather than on [`PageFetcher`] so
/// tests can substitute canned responses.
#[async_trait]
pub trait FetchPage: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError>;
}

/// Two-tier fetcher: direct HTTP, then browser rendering when blocked.
pub struct PageFetcher {
    client: reqwest::Client,
    blocked_statuses: Vec<u16>,
    fallback_enabled: bool,
    renderer: Arc<dyn Renderer>,
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("blocked_statuses", &self.blocked_statuses)
            .field("fallback_enabled", &self.fallback_enabled)
            .finish()
    }
}

impl PageFetcher {
    /// Build a fetcher with browser-like headers.
    ///
    /// # Arguments
    ///
    /// * `config` - Timeout, headers and blocking statuses for the direct fetch
    /// * `fallback_enabled` - Whether blocked responses are retried through `renderer`
    /// * `renderer` - The browser capability used for the fallback
    pub fn new(
        config: &FetchConfig,
        fallback_enabled: bool,
        renderer: Arc<dyn Renderer>,
    ) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(&config.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, v);
        }
        if let Ok(v) = HeaderValue::from_str(&config.referer) {
            headers.insert(REFERER, v);
        }
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            blocked_statuses: config.blocked_statuses.clone(),
            fallback_enabled,
            renderer,
        })
    }

    fn is_blocked(&self, status: u16) -> bool {
        self.blocked_statuses.contains(&status)
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_direct(&self, url: &str) -> Result<FetchResult, FetchError> {
        let t0 = Instant::now();
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!(
            status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Direct fetch finished"
        );
        Ok(FetchResult::new(status, body))
    }
}

#[async_trait]
impl FetchPage for PageFetcher {
    /// Fetch a page, escalating to the renderer on a blocking status.
    ///
    /// Non-blocking, non-200 statuses and empty bodies are returned as-is.
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let direct = self.fetch_direct(url).await?;
        info!(status = direct.status, "Direct fetch status");

        if !(self.is_blocked(direct.status) && self.fallback_enabled) {
            return Ok(direct);
        }

        warn!(status = direct.status, "Blocked; trying browser render");
        let t0 = Instant::now();
        let html = self.renderer.render(url).await?;
        info!(
            bytes = html.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Browser render succeeded"
        );
        Ok(FetchResult::new(200, html))
    }
}
