//! Candidate URL discovery through the GDELT DOC 2.0 API.
//!
//! Discovery runs a list of short queries (GDELT rejects long ones) from
//! richest to simplest, collecting unique article URLs until `max_urls` is
//! reached. Each query is wrapped in [`RetryQuery`], which retries with
//! exponential backoff and jitter.
//!
//! # Architecture
//!
//! - [`ArticleIndex`]: Core trait, one query in, article URLs out
//! - [`GdeltClient`]: The HTTP implementation
//! - [`RetryQuery`]: Decorator that adds bounded retries to any [`ArticleIndex`]
//!
//! Discovery is the only fatal stage: if every query fails or returns
//! nothing, [`discover_urls`] returns [`DiscoveryError::NoResults`] and the
//! run stops before any page is fetched.

use crate::config::DiscoveryConfig;
use crate::error::DiscoveryError;
use crate::utils::truncate_for_log;
use rand::{Rng, rng};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// A searchable index of articles.
pub trait ArticleIndex {
    /// Run one query and return the article URLs it yields.
    async fn query(&self, query: &str) -> Result<Vec<String>, DiscoveryError>;
}

#[derive(Debug, Deserialize)]
struct ArtList {
    #[serde(default)]
    articles: Option<Vec<ArtListEntry>>,
}

#[derive(Debug, Deserialize)]
struct ArtListEntry {
    url: Option<String>,
}

/// GDELT DOC 2.0 `artlist` client.
#[derive(Debug, Clone)]
pub struct GdeltClient {
    http: reqwest::Client,
    endpoint: String,
    timespan: String,
    max_records: u32,
}

impl GdeltClient {
    pub fn new(config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            timespan: config.timespan.clone(),
            max_records: config.max_records,
        })
    }
}

impl ArticleIndex for GdeltClient {
    #[instrument(level = "info", skip(self))]
    async fn query(&self, query: &str) -> Result<Vec<String>, DiscoveryError> {
        let max_records = self.max_records.to_string();
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("query", query),
                ("mode", "artlist"),
                ("format", "json"),
                ("sort", "datedesc"),
                ("maxrecords", max_records.as_str()),
                ("timespan", self.timespan.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = resp.text().await?;
        info!(status, %content_type, "GDELT responded");

        if status != 200 || !content_type.to_lowercase().contains("json") {
            return Err(DiscoveryError::UnexpectedResponse {
                status,
                content_type,
                preview: truncate_for_log(&body, 200),
            });
        }

        let list: ArtList = serde_json::from_str(&body)?;
        Ok(list
            .articles
            .unwrap_or_default()
            .into_iter()
            .filter_map(|a| a.url)
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect())
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`ArticleIndex`].
///
/// The delay between attempts follows:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryQuery<T> {
    inner: T,
    /// Total attempts per query, including the first.
    attempts: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl<T> RetryQuery<T>
where
    T: ArticleIndex,
{
    pub fn new(inner: T, attempts: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryQuery")
            .field("attempts", &self.attempts)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> ArticleIndex for RetryQuery<T>
where
    T: ArticleIndex,
{
    #[instrument(level = "info", skip(self))]
    async fn query(&self, query: &str) -> Result<Vec<String>, DiscoveryError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.query(query).await {
                Ok(urls) => return Ok(urls),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt >= self.attempts {
                        error!(
                            attempt,
                            max = self.attempts,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "query exhausted retries"
                        );
                        return Err(e);
                    }

                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + Duration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.attempts,
                        ?delay,
                        error = %e,
                        "query attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Collect up to `max_urls` unique URLs across `queries`, in first-seen order.
///
/// A query that fails is logged and skipped. Stops issuing queries once the
/// cap is reached.
///
/// # Errors
///
/// [`DiscoveryError::NoResults`] when no query produced any URL.
#[instrument(level = "info", skip_all, fields(queries = queries.len(), max_urls = max_urls))]
pub async fn discover_urls<I: ArticleIndex>(
    index: &I,
    queries: &[String],
    max_urls: usize,
) -> Result<Vec<String>, DiscoveryError> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut all_urls: Vec<String> = Vec::new();

    for query in queries {
        if all_urls.len() >= max_urls {
            break;
        }
        match index.query(query).await {
            Ok(urls) => {
                let before = all_urls.len();
                let fresh = urls
                    .into_iter()
                    .filter(|u| seen.insert(u.clone()))
                    .take(max_urls - before)
                    .collect::<Vec<_>>();
                all_urls.extend(fresh);
                info!(
                    query = %truncate_for_log(query, 60),
                    added = all_urls.len() - before,
                    total = all_urls.len(),
                    "Discovery query finished"
                );
            }
            Err(e) => {
                warn!(query = %truncate_for_log(query, 60), error = %e, "Discovery query failed");
            }
        }
    }

    if all_urls.is_empty() {
        return Err(DiscoveryError::NoResults);
    }
    Ok(all_urls)
}

/// Build the GDELT client from config and run discovery.
pub async fn discover(config: &DiscoveryConfig, max_urls: usize) -> Result<Vec<String>, DiscoveryError> {
    let client = GdeltClient::new(config)?;
    let index = RetryQuery::new(
        client,
        config.retries,
        Duration::from_secs(config.retry_delay_secs),
    );
    discover_urls(&index, &config.queries, max_urls).await
}
