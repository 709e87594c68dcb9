//! Output generation for the metrics table and the article dump.
//!
//! # Submodules
//!
//! - [`csv`]: Writes [`MetricRow`](crate::models::MetricRow)s as a header-first CSV table
//! - [`json`]: Writes the [`ScrapeRun`](crate::models::ScrapeRun) with every article record
//!
//! # Output Structure
//!
//! ```text
//! numbers.csv        # url,site,title,published_date,metric_type,value,context_snippet
//! articles.json      # optional, includes per-URL errors
//! ```

pub mod csv;
pub mod json;
