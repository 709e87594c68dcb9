//! Error types for fetching, discovery, and configuration.
//!
//! Fetch errors are always local to one URL and end up in that URL's
//! [`ArticleRecord`](crate::models::ArticleRecord). Discovery only becomes
//! fatal when it produces no URLs at all.

use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("blocked and no browser renderer is available")]
    RendererUnavailable,
    #[error("browser render failed: {0}")]
    Render(String),
    #[error("browser navigation timed out after {0:?}")]
    RenderTimeout(Duration),
}

#[derive(thiserror::Error, Debug)]
pub enum DiscoveryError {
    #[error("discovery request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("discovery endpoint did not return JSON (status={status}, type={content_type}, preview={preview:?})")]
    UnexpectedResponse {
        status: u16,
        content_type: String,
        preview: String,
    },
    #[error("discovery response was not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to discover any URLs; try a shorter timespan or different queries")]
    NoResults,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
