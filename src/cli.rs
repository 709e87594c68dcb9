//! Command-line interface definitions.
//!
//! Flags override values from the optional YAML config file. URLs given on
//! the command line (or in `--urls-file`) replace discovery entirely.

use crate::config::Config;
use clap::Parser;
use itertools::Itertools;
use std::path::PathBuf;
use tracing::warn;
use url::Url;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Discover articles through GDELT and write numbers.csv
/// article_metrics
///
/// # Scrape specific pages without the browser fallback
/// article_metrics --no-browser-fallback https://example.com/a https://example.com/b
///
/// # Tune pacing and keep the intermediate records
/// article_metrics -c config.yaml --delay 3 --concurrency 4 --articles-json out/articles.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Article URLs to scrape; discovery is skipped when any are given
    pub urls: Vec<String>,

    /// File with one URL per line; blank lines and `#` comments are ignored
    #[arg(long)]
    pub urls_file: Option<PathBuf>,

    /// Optional path to config.yaml file
    #[arg(short, long, env = "ARTICLE_METRICS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long, default_value = "numbers.csv")]
    pub output: PathBuf,

    /// Also write every article record (including errors) as JSON
    #[arg(long)]
    pub articles_json: Option<PathBuf>,

    /// Maximum number of URLs to process
    #[arg(long)]
    pub max_urls: Option<usize>,

    /// Seconds between request starts
    #[arg(long)]
    pub delay: Option<f64>,

    /// Number of URLs processed at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Never fall back to a headless browser for blocked pages
    #[arg(long)]
    pub no_browser_fallback: bool,

    /// Chrome/Chromium binary for the browser fallback
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Characters of context around each metric
    #[arg(long)]
    pub window: Option<usize>,

    /// Maximum rows per article
    #[arg(long)]
    pub max_snippets: Option<usize>,

    /// GDELT timespan for discovery (e.g. 1y, 6m, 2w)
    #[arg(long)]
    pub timespan: Option<String>,
}

impl Cli {
    /// Layer command-line values over `config`.
    pub fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(n) = self.max_urls {
            config.pipeline.max_urls = n;
        }
        if let Some(d) = self.delay {
            config.pipeline.request_delay_secs = d;
        }
        if let Some(c) = self.concurrency {
            config.pipeline.concurrency = c;
        }
        if self.no_browser_fallback {
            config.render.enabled = false;
        }
        if let Some(path) = &self.chrome_path {
            config.render.chrome_path = Some(path.clone());
        }
        if let Some(w) = self.window {
            config.mining.context_window = w;
        }
        if let Some(m) = self.max_snippets {
            config.mining.max_snippets_per_url = m;
        }
        if let Some(t) = &self.timespan {
            config.discovery.timespan = t.clone();
        }
        config
    }
}

/// Parse a URL list: trimmed, comments and blanks dropped, duplicates and
/// non-HTTP(S) entries removed, order kept.
pub fn parse_url_list<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    lines
        .into_iter()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter(|l| match Url::parse(l) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => true,
            _ => {
                warn!(url = %l, "Skipping invalid URL");
                false
            }
        })
        .unique()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["article_metrics"]);
        assert!(cli.urls.is_empty());
        assert_eq!(cli.output, PathBuf::from("numbers.csv"));
        assert!(!cli.no_browser_fallback);
        assert_eq!(cli.apply_overrides(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_positional_urls_and_flags() {
        let cli = Cli::parse_from([
            "article_metrics",
            "-o",
            "/tmp/out.csv",
            "--no-browser-fallback",
            "--delay",
            "0.5",
            "--concurrency",
            "4",
            "--window",
            "60",
            "--max-snippets",
            "3",
            "--max-urls",
            "10",
            "--timespan",
            "6m",
            "https://example.com/a",
            "https://example.com/b",
        ]);
        assert_eq!(cli.urls.len(), 2);
        assert_eq!(cli.output, PathBuf::from("/tmp/out.csv"));

        let config = cli.apply_overrides(Config::default());
        assert!(!config.render.enabled);
        assert_eq!(config.pipeline.request_delay_secs, 0.5);
        assert_eq!(config.pipeline.concurrency, 4);
        assert_eq!(config.pipeline.max_urls, 10);
        assert_eq!(config.mining.context_window, 60);
        assert_eq!(config.mining.max_snippets_per_url, 3);
        assert_eq!(config.discovery.timespan, "6m");
    }

    #[test]
    fn test_parse_url_list() {
        let text = "
            # seed list
            https://a.example/1
            https://b.example/2

            ftp://c.example/3
            not a url
            https://a.example/1
        ";
        assert_eq!(
            parse_url_list(text.lines()),
            vec!["https://a.example/1".to_string(), "https://b.example/2".to_string()]
        );
    }
}
