// Configuration for the aggregation pass
//
// Every series shown side by side must be produced with the same config, in
// particular the same outlier ceiling.

use crate::outlier::DEFAULT_CEILING_SECS;
use crate::stats::PercentileMethod;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors from loading or validating an [`AggregationConfig`]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("outlier_ceiling_secs must be a positive finite number, got {0}")]
    InvalidCeiling(f64),

    #[error("{0} must not be empty")]
    EmptyTag(&'static str),

    #[error("Invalid metric_pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration for readiness-time aggregation
///
/// # Example
/// ```
/// use readytime::aggregate::AggregationConfig;
///
/// let config = AggregationConfig::default();
/// assert_eq!(config.outlier_ceiling_secs, 120.0);
/// assert_eq!(config.category_checkpoint, "enter");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Drop bundles whose readiness time exceeds this many seconds
    pub outlier_ceiling_secs: f64,

    /// Checkpoint whose `source` names the bundle's category (entry source)
    pub category_checkpoint: String,

    /// Checkpoint that marks a block becoming visible
    pub metric_checkpoint: String,

    /// Pattern the visibility event's `source` must match
    ///
    /// Interpreted as a regular expression; a plain word such as `form` is a
    /// case-sensitive substring match.
    pub metric_pattern: String,

    /// Percentile formula used for summaries
    pub percentile_method: PercentileMethod,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            outlier_ceiling_secs: DEFAULT_CEILING_SECS,
            category_checkpoint: "enter".to_string(),
            metric_checkpoint: "viewblock".to_string(),
            metric_pattern: "form".to_string(),
            percentile_method: PercentileMethod::WeightedRank,
        }
    }
}

impl AggregationConfig {
    /// Tighter ceiling for dashboards that only care about interactive loads
    pub fn strict() -> Self {
        Self {
            outlier_ceiling_secs: 60.0,
            ..Self::default()
        }
    }

    /// Parse a TOML config, filling unspecified keys with defaults
    ///
    /// # Example TOML
    /// ```toml
    /// outlier_ceiling_secs = 90.0
    /// category_checkpoint = "enter"
    /// metric_checkpoint = "viewblock"
    /// metric_pattern = "form"
    /// percentile_method = "weighted-rank"
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.outlier_ceiling_secs.is_finite() || self.outlier_ceiling_secs <= 0.0 {
            return Err(ConfigError::InvalidCeiling(self.outlier_ceiling_secs));
        }

        if self.category_checkpoint.trim().is_empty() {
            return Err(ConfigError::EmptyTag("category_checkpoint"));
        }

        if self.metric_checkpoint.trim().is_empty() {
            return Err(ConfigError::EmptyTag("metric_checkpoint"));
        }

        self.compile_pattern()?;
        Ok(())
    }

    /// Compile `metric_pattern`
    pub(crate) fn compile_pattern(&self) -> Result<regex::Regex, ConfigError> {
        regex::Regex::new(&self.metric_pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: self.metric_pattern.clone(),
            source,
        })
    }
}
