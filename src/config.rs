//! Runtime configuration.
//!
//! Every tunable value lives in [`Config`], which is loaded from an optional
//! YAML file and then overridden by command-line flags (see
//! [`crate::cli::Cli::apply_overrides`]). Each component receives the
//! section it needs at construction; nothing reads configuration globally.
//!
//! # Example
//!
//! ```yaml
//! pipeline:
//!   max_urls: 50
//!   request_delay_secs: 2.0
//! render:
//!   enabled: false
//! mining:
//!   context_window: 120
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub render: RenderConfig,
    pub pipeline: PipelineConfig,
    pub mining: MiningConfig,
    pub discovery: DiscoveryConfig,
}

impl Config {
    /// Load configuration from a YAML file, or defaults when `path` is `None`.
    ///
    /// Missing keys fall back to their defaults, so a file only needs the
    /// values it changes.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let path_display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path_display.clone(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Yaml {
            path: path_display.clone(),
            source,
        })?;
        info!(config_path = %path_display, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

/// Direct HTTP fetch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
    pub referer: String,
    /// Statuses treated as an anti-bot block.
    pub blocked_statuses: Vec<u16>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 25,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            referer: "https://google.com/".to_string(),
            blocked_statuses: vec![403, 429],
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Headless browser fallback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub enabled: bool,
    pub navigation_timeout_secs: u64,
    /// Element to wait for after navigation; `None` skips the wait.
    pub wait_selector: Option<String>,
    pub wait_timeout_secs: u64,
    /// Chrome/Chromium binary; auto-detected when unset.
    pub chrome_path: Option<PathBuf>,
    pub user_agent: String,
    pub locale: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            navigation_timeout_secs: 60,
            wait_selector: Some("h1".to_string()),
            wait_timeout_secs: 20,
            chrome_path: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            locale: "en-US".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_urls: usize,
    /// Minimum spacing between request starts, across all workers.
    pub request_delay_secs: f64,
    /// Number of URLs processed at once.
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_urls: 300,
            request_delay_secs: 1.5,
            concurrency: 1,
        }
    }
}

impl PipelineConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.request_delay_secs).unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Characters of context on each side of a match.
    pub context_window: usize,
    /// Hard cap on snippets per mining call.
    pub max_hits: usize,
    pub max_snippets_per_url: usize,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            context_window: 90,
            max_hits: 80,
            max_snippets_per_url: 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub endpoint: String,
    /// Tried in order, richer to simpler; GDELT limits query length.
    pub queries: Vec<String>,
    pub timespan: String,
    pub max_records: u32,
    /// Attempts per query.
    pub retries: usize,
    pub retry_delay_secs: u64,
    pub timeout_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.gdeltproject.org/api/v2/doc/doc".to_string(),
            queries: vec![
                r#"("generative AI" OR "AI adoption") (productivity OR "time saved" OR efficiency) sourcecountry:unitedstates"#.to_string(),
                r#""AI adoption" productivity sourcecountry:unitedstates"#.to_string(),
                r#""generative AI" "time saved" sourcecountry:unitedstates"#.to_string(),
                r#""AI adoption" "documentation burden" time saved sourcecountry:unitedstates"#.to_string(),
            ],
            timespan: "1y".to_string(),
            max_records: 250,
            retries: 3,
            retry_delay_secs: 2,
            timeout_secs: 30,
        }
    }
}
