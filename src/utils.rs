//! Text normalization, URL helpers, and file system checks.
//!
//! This module provides helper functions used throughout the application:
//! - Whitespace normalization shared by the extractor and the miner
//! - Site (authority) derivation for article records
//! - String truncation for log previews
//! - File system validation for output locations

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs to single spaces and trim.
///
/// Every component funnels text through here, so an empty or
/// whitespace-only input becomes `None` instead of `Some("")`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean("  Hello \n\t world "), Some("Hello world".to_string()));
/// assert_eq!(clean(" \n "), None);
/// ```
pub fn clean(s: &str) -> Option<String> {
    let collapsed = WHITESPACE.replace_all(s, " ");
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Lowercased authority (host plus explicit port) of a URL.
///
/// Returns an empty string when the URL cannot be parsed, so a record can
/// still be produced for it.
pub fn site_of(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut at the last character boundary at or below `max`
/// bytes, with an ellipsis and the number of dropped bytes appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Ensure the directory that will hold `file_path` exists and is writable.
///
/// Creates the parent directory if needed, then writes and removes a probe
/// file next to the target.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %file_path.display()))]
pub async fn ensure_writable_parent(file_path: &Path) -> Result<(), Box<dyn Error>> {
    let dir = match file_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    fs::create_dir_all(&dir).await?;

    let probe_path = dir.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!(dir = %dir.display(), "Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
