//! Configuration management for Trellis
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (TRELLIS_*)
//! 3. Config file (~/.config/trellis/config.toml)
//! 4. Default values

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const DAY: u64 = 24 * 60 * 60;

/// Dependency analysis settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Name of the single-select field holding item status
    pub status_field: String,

    /// Stop cycle enumeration after this many cycles
    pub max_cycles: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            status_field: "Status".to_string(),
            max_cycles: 1000,
        }
    }
}

/// Date fields recording when an item entered each status
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusDateFields {
    pub todo: String,
    pub in_progress: String,
    pub review: String,
    pub done: String,
}

impl Default for StatusDateFields {
    fn default() -> Self {
        Self {
            todo: "Todo Date".to_string(),
            in_progress: "In Progress Date".to_string(),
            review: "Review Date".to_string(),
            done: "Done Date".to_string(),
        }
    }
}

/// Metric thresholds and field names
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Name of the field holding item priority
    pub priority_field: String,

    /// Fields every groomed item should have
    ///
    /// Empty means the status and priority fields, whatever they are named.
    pub required_fields: Vec<String>,

    /// Unstarted items older than this count as stale
    #[serde(with = "humantime_serde")]
    pub stale_after: Duration,

    /// Length of each window compared for the completion trend
    #[serde(with = "humantime_serde")]
    pub trend_window: Duration,

    /// Rate difference below which the trend is stable
    pub trend_tolerance: f64,

    /// Per-status entry date fields used for time-in-status
    pub status_dates: StatusDateFields,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            priority_field: "Priority".to_string(),
            required_fields: Vec::new(),
            stale_after: Duration::from_secs(30 * DAY),
            trend_window: Duration::from_secs(14 * DAY),
            trend_tolerance: 0.05,
            status_dates: StatusDateFields::default(),
        }
    }
}

impl MetricsConfig {
    /// Fields an item must carry to count as groomed
    pub fn required_fields_for<'a>(&'a self, status_field: &'a str) -> Vec<&'a str> {
        if self.required_fields.is_empty() {
            vec![status_field, self.priority_field.as_str()]
        } else {
            self.required_fields.iter().map(String::as_str).collect()
        }
    }
}

/// GitHub API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GraphQL endpoint
    pub graphql_url: String,

    /// Items requested per page when fetching a snapshot
    pub page_size: u32,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            graphql_url: "https://api.github.com/graphql".to_string(),
            page_size: 100,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Dependency analysis configuration
    pub analysis: AnalysisConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,

    /// GitHub configuration
    pub github: GitHubConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/trellis/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("trellis").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - TRELLIS_STATUS_FIELD: Name of the status field
    /// - TRELLIS_PRIORITY_FIELD: Name of the priority field
    /// - TRELLIS_GRAPHQL_URL: GraphQL endpoint
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(field) = std::env::var("TRELLIS_STATUS_FIELD") {
            self.analysis.status_field = field;
        }

        if let Ok(field) = std::env::var("TRELLIS_PRIORITY_FIELD") {
            self.metrics.priority_field = field;
        }

        if let Ok(url) = std::env::var("TRELLIS_GRAPHQL_URL") {
            self.github.graphql_url = url;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(
        mut self,
        status_field: Option<String>,
        priority_field: Option<String>,
    ) -> Self {
        if let Some(field) = status_field {
            self.analysis.status_field = field;
        }

        if let Some(field) = priority_field {
            self.metrics.priority_field = field;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(
        status_field: Option<String>,
        priority_field: Option<String>,
    ) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(status_field, priority_field))
    }
}
