//! CSV output for the metrics table.
//!
//! Columns follow the field order of [`MetricRow`]; absent values are
//! written as empty cells.

use crate::models::MetricRow;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Serialize rows to CSV bytes, header first.
///
/// The header is written even when there are no rows.
pub fn to_csv_bytes(rows: &[MetricRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

const HEADER: [&str; 7] = [
    "url",
    "site",
    "title",
    "published_date",
    "metric_type",
    "value",
    "context_snippet",
];

/// Write the metrics table to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = rows.len()))]
pub async fn write_numbers(rows: &[MetricRow], path: &Path) -> Result<(), Box<dyn Error>> {
    let bytes = to_csv_bytes(rows)?;
    fs::write(path, bytes).await?;
    info!("Wrote metrics CSV");
    Ok(())
}
