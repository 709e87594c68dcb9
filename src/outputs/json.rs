//! JSON dump of every article record from a run.
//!
//! The CSV table only contains rows for successful extractions. The dump
//! keeps the intermediate [`ArticleRecord`]s, including the `error` field,
//! so blocked or broken URLs can be inspected after the run.

use crate::models::{ArticleRecord, ScrapeRun};
use chrono::Local;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Stamp the records with the current local date and time.
pub fn scrape_run(articles: Vec<ArticleRecord>) -> ScrapeRun {
    let now = Local::now();
    ScrapeRun {
        local_date: now.date_naive().to_string(),
        local_time: now.time().format("%H:%M:%S").to_string(),
        articles,
    }
}

/// Write a [`ScrapeRun`] to `path` as pretty-printed JSON.
///
/// Creates the parent directory if it does not exist.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_run(run: &ScrapeRun, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(run)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(articles = run.articles.len(), "Wrote article dump");
    Ok(())
}
