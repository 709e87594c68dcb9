//! # Article Metrics
//!
//! Finds news articles about AI and workplace productivity, scrapes them
//! politely, and mines percentage and time-saving figures into a CSV table.
//!
//! ## Usage
//!
//! ```sh
//! article_metrics -o numbers.csv
//! article_metrics --no-browser-fallback https://example.com/story
//! ```
//!
//! ## Architecture
//!
//! 1. **Discovery**: Query GDELT for candidate article URLs (skipped when URLs are given)
//! 2. **Fetching**: Plain HTTP, escalating to a headless browser when blocked
//! 3. **Extraction**: Title, author, date, description and body from each page
//! 4. **Mining**: Percent and time metrics with change-keyword context
//! 5. **Output**: `numbers.csv`, plus an optional JSON dump of every record

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod discovery;
mod error;
mod extract;
mod fetch;
mod metrics;
mod models;
mod outputs;
mod pipeline;
mod utils;

use cli::{Cli, parse_url_list};
use config::Config;
use fetch::{ChromiumRenderer, NoopRenderer, PageFetcher, Renderer};
use metrics::{MetricMiner, build_numbers_table};
use pipeline::Pipeline;
use utils::ensure_writable_parent;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("article_metrics starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = args.apply_overrides(Config::load(args.config.as_deref())?);
    debug!(?config, "Effective configuration");

    // Early check: fail before any network work if the CSV can't be written
    if let Err(e) = ensure_writable_parent(&args.output).await {
        error!(
            path = %args.output.display(),
            error = %e,
            "Output location is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Collect URLs ----
    let mut urls = if !args.urls.is_empty() || args.urls_file.is_some() {
        let mut lines = String::new();
        if let Some(path) = &args.urls_file {
            lines = tokio::fs::read_to_string(path).await?;
        }
        parse_url_list(args.urls.iter().map(String::as_str).chain(lines.lines()))
    } else {
        match discovery::discover(&config.discovery, config.pipeline.max_urls).await {
            Ok(found) => found,
            Err(e) => {
                error!(error = %e, "Discovery failed; nothing to scrape");
                return Err(e.into());
            }
        }
    };
    urls.truncate(config.pipeline.max_urls);
    info!(count = urls.len(), "URLs to scrape");
    for url in urls.iter().take(25) {
        debug!(%url, "Queued");
    }

    // ---- Scrape ----
    let renderer: Arc<dyn Renderer> = if config.render.enabled {
        Arc::new(ChromiumRenderer::new(config.render.clone()))
    } else {
        Arc::new(NoopRenderer)
    };
    let fetcher = PageFetcher::new(&config.fetch, config.render.enabled, renderer)?;
    let pipeline = Pipeline::new(Arc::new(fetcher), &config.pipeline);
    let records = pipeline.run(urls).await;

    let failed = records.iter().filter(|r| r.is_error()).count();

    // ---- Mine ----
    let miner = MetricMiner::from_config(&config.mining);
    let rows = build_numbers_table(&records, &miner, config.mining.max_snippets_per_url);

    // ---- Output ----
    if let Some(path) = &args.articles_json {
        let run = outputs::json::scrape_run(records);
        if let Err(e) = outputs::json::write_run(&run, path).await {
            error!(path = %path.display(), error = %e, "Failed to write article records");
        }
    }
    outputs::csv::write_numbers(&rows, &args.output).await?;

    info!(
        path = %args.output.display(),
        rows = rows.len(),
        failed,
        elapsed_secs = start_time.elapsed().as_secs(),
        "Done"
    );
    Ok(())
}
