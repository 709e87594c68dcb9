//! Fetch → extract for a batch of URLs.
//!
//! [`Pipeline::run`] produces exactly one [`ArticleRecord`] per input URL,
//! in input order. A failure for one URL, including a panic inside its
//! task, becomes that URL's error record and never stops the batch.
//!
//! Requests are paced by a shared [`Pacer`], so raising `concurrency`
//! overlaps slow fetches without raising the request rate.

pub mod pacer;

pub use pacer::Pacer;

use crate::config::PipelineConfig;
use crate::extract::extract_article;
use crate::fetch::FetchPage;
use crate::models::ArticleRecord;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

pub struct Pipeline {
    fetcher: Arc<dyn FetchPage>,
    pacer: Arc<Pacer>,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(fetcher: Arc<dyn FetchPage>, config: &PipelineConfig) -> Self {
        Self {
            fetcher,
            pacer: Arc::new(Pacer::new(config.request_delay())),
            concurrency: config.concurrency.max(1),
        }
    }

    /// Scrape every URL and return one record per URL, in input order.
    #[instrument(level = "info", skip_all, fields(urls = urls.len(), concurrency = self.concurrency, delay_ms = self.pacer.interval().as_millis() as u64))]
    pub async fn run(&self, urls: Vec<String>) -> Vec<ArticleRecord> {
        let total = urls.len();
        let t0 = Instant::now();

        let records: Vec<ArticleRecord> = stream::iter(urls.into_iter().enumerate())
            .map(|(i, url)| {
                let fetcher = Arc::clone(&self.fetcher);
                let pacer = Arc::clone(&self.pacer);
                async move {
                    let task_url = url.clone();
                    let task = tokio::spawn(async move {
                        pacer.wait().await;
                        info!(index = i + 1, total, url = %task_url, "Scraping");
                        scrape_one(fetcher.as_ref(), &task_url).await
                    });
                    match task.await {
                        Ok(record) => record,
                        Err(e) => {
                            warn!(%url, error = %e, "Scrape task failed");
                            ArticleRecord::failed(&url, format!("task failed: {e}"))
                        }
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = records.iter().filter(|r| r.is_error()).count();
        info!(
            total,
            succeeded = total - failed,
            failed,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Completed scraping"
        );
        records
    }
}

/// Fetch and extract a single URL; never fails.
pub async fn scrape_one(fetcher: &dyn FetchPage, url: &str) -> ArticleRecord {
    match fetcher.fetch(url).await {
        Ok(result) => match result.usable_html() {
            Some(html) => extract_article(html, url),
            None => {
                warn!(%url, status = result.status, "Unusable response");
                ArticleRecord::failed(url, format!("HTTP {}", result.status))
            }
        },
        Err(e) => {
            warn!(%url, error = %e, "Fetch failed");
            ArticleRecord::failed(url, e.to_string())
        }
    }
}
