//! Report configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) gives the
//! behaviour of a plain PropReports executions export:
//!
//! ```toml
//! [feed]
//! datetime_format = "%m/%d/%y %H:%M:%S"
//! row_order = "newest_first"
//! skip_zero_quantity = true
//!
//! [metrics]
//! breakeven_threshold = "1"
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tradelog_core::metrics::MetricsConfig;

/// Errors from loading or validating a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("breakeven_threshold must be >= 0, got {0}")]
    NegativeThreshold(Decimal),

    #[error("datetime_format must not be empty")]
    EmptyDatetimeFormat,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub feed: FeedConfig,
    pub metrics: MetricsConfig,
}

/// Order of rows in the source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrder {
    /// Latest execution first, as PropReports exports it.
    #[default]
    NewestFirst,
    OldestFirst,
}

/// How to read the executions CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// `chrono` format string for the `Date/Time` column.
    pub datetime_format: String,
    pub row_order: RowOrder,
    /// Drop rows with `Qty == 0` (with a warning) instead of failing.
    pub skip_zero_quantity: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            datetime_format: "%m/%d/%y %H:%M:%S".to_string(),
            row_order: RowOrder::NewestFirst,
            skip_zero_quantity: true,
        }
    }
}

impl ReportConfig {
    /// Parse and validate a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.metrics.breakeven_threshold;
        if threshold < Decimal::ZERO {
            return Err(ConfigError::NegativeThreshold(threshold));
        }
        if self.feed.datetime_format.trim().is_empty() {
            return Err(ConfigError::EmptyDatetimeFormat);
        }
        Ok(())
    }
}
