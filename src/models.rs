//! Data models for fetched pages, extracted articles, and mined metrics.
//!
//! This module defines the core data structures used throughout the application:
//! - [`FetchResult`]: Status and raw HTML for one URL
//! - [`ArticleRecord`]: Normalized article fields, or the error that prevented them
//! - [`MetricSnippet`]: A numeric claim and its surrounding context
//! - [`MetricRow`]: The persisted row joining an article with one snippet
//! - [`ScrapeRun`]: All article records from a single run, for the JSON dump

use crate::utils::site_of;
use serde::{Deserialize, Serialize};

/// Outcome of fetching a single URL.
///
/// `html` is `None` when the response body was empty. Non-200 statuses are
/// carried as data; the pipeline decides what they mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub status: u16,
    pub html: Option<String>,
}

impl FetchResult {
    pub fn new(status: u16, body: String) -> Self {
        let html = if body.is_empty() { None } else { Some(body) };
        Self { status, html }
    }

    /// The page body, when it can be handed to the extractor.
    pub fn usable_html(&self) -> Option<&str> {
        self.html.as_deref().filter(|_| self.status == 200)
    }
}

/// One article as extracted from a page.
///
/// Exactly one record exists per input URL. When `error` is set, every
/// other optional field is `None`; use [`ArticleRecord::failed`] to build
/// such records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// The URL the record was produced for.
    pub url: String,
    /// Lowercased authority of `url`.
    pub site: String,
    pub title: Option<String>,
    pub author: Option<String>,
    /// Publish date exactly as found on the page.
    pub published_date: Option<String>,
    pub description: Option<String>,
    /// Paragraphs joined by a blank line.
    pub body: Option<String>,
    /// Why fetching or parsing failed.
    pub error: Option<String>,
}

impl ArticleRecord {
    /// A record for a URL whose fetch or parse failed.
    pub fn failed(url: &str, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            site: site_of(url),
            title: None,
            author: None,
            published_date: None,
            description: None,
            body: None,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Kind of numeric claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    Percent,
    Time,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Percent => "percent",
            MetricType::Time => "time",
        }
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric match that survived the relevance filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSnippet {
    pub metric_type: MetricType,
    /// The literal matched text, e.g. `"12%"` or `"30 minutes"`.
    pub value: String,
    /// Normalized text surrounding the match.
    pub snippet: String,
}

/// A row of the output table.
///
/// Field order here is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    pub url: String,
    pub site: String,
    pub title: Option<String>,
    pub published_date: Option<String>,
    pub metric_type: MetricType,
    pub value: String,
    pub context_snippet: String,
}

impl MetricRow {
    pub fn from_parts(record: &ArticleRecord, snippet: MetricSnippet) -> Self {
        Self {
            url: record.url.clone(),
            site: record.site.clone(),
            title: record.title.clone(),
            published_date: record.published_date.clone(),
            metric_type: snippet.metric_type,
            value: snippet.value,
            context_snippet: snippet.snippet,
        }
    }
}

/// All article records from one run.
///
/// Serialized by [`crate::outputs::json`] so per-URL errors stay observable
/// after the run; the CSV table only shows successful extractions.
#[derive(Debug, Deserialize, Serialize)]
pub struct ScrapeRun {
    /// The date of the run in `YYYY-MM-DD` format.
    pub local_date: String,
    /// The local time the run finished.
    pub local_time: String,
    pub articles: Vec<ArticleRecord>,
}
