//! CLI argument parsing for readytime

use crate::aggregate::{CategoryRule, SeriesSelector};
use crate::view::{DEVICE_TYPE_ATTRIBUTE, HOUR_ATTRIBUTE};
use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Output format for readiness reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

/// Category dimension for the breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GroupBy {
    /// Normalized entry source
    #[default]
    Source,
    /// `deviceType` bundle attribute
    Device,
    /// `hour` bundle attribute (hour of day the session was sampled)
    Hour,
    /// Any bundle attribute
    Attribute(String),
}

impl GroupBy {
    /// Category rule for this dimension; `entry_checkpoint` names the entry tag
    pub fn rule(&self, entry_checkpoint: &str) -> CategoryRule {
        match self {
            GroupBy::Source => CategoryRule::Checkpoint(entry_checkpoint.to_string()),
            GroupBy::Device => CategoryRule::Attribute(DEVICE_TYPE_ATTRIBUTE.to_string()),
            GroupBy::Hour => CategoryRule::Attribute(HOUR_ATTRIBUTE.to_string()),
            GroupBy::Attribute(name) => CategoryRule::Attribute(name.clone()),
        }
    }

    /// Dimension name used in report titles
    pub fn dimension(&self) -> &str {
        match self {
            GroupBy::Source => "Source",
            GroupBy::Device => "Device",
            GroupBy::Hour => "Hour",
            GroupBy::Attribute(name) => name,
        }
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "source" => Ok(GroupBy::Source),
            "device" => Ok(GroupBy::Device),
            "hour" => Ok(GroupBy::Hour),
            other => match other.strip_prefix("attribute:") {
                Some(name) if !name.trim().is_empty() => {
                    Ok(GroupBy::Attribute(name.trim().to_string()))
                }
                Some(_) => Err("attribute name cannot be empty".to_string()),
                None => Err(format!(
                    "Unknown dimension '{}' (expected source, device, hour or attribute:<name>)",
                    other
                )),
            },
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::Source => write!(f, "source"),
            GroupBy::Device => write!(f, "device"),
            GroupBy::Hour => write!(f, "hour"),
            GroupBy::Attribute(name) => write!(f, "attribute:{}", name),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "readytime")]
#[command(version)]
#[command(about = "Engagement readiness time from RUM event bundles", long_about = None)]
pub struct Cli {
    /// Bundle file (JSON array or {"rumBundles": [...]}), or - for stdin
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Breakdown dimension: source, device, hour or attribute:<name>
    #[arg(
        long = "by",
        value_name = "DIMENSION",
        default_value = "source",
        value_parser = GroupBy::from_str
    )]
    pub group_by: GroupBy,

    /// Only keep sessions entering from these sources (comma-separated)
    #[arg(short = 's', long = "source", value_name = "SOURCES")]
    pub source: Option<String>,

    /// Restrict the report to one device type (e.g. Android, iOS)
    #[arg(short = 'd', long = "device", value_name = "DEVICE")]
    pub device: Option<String>,

    /// Show totals for a second device type alongside
    #[arg(long = "compare", value_name = "DEVICE")]
    pub compare: Option<String>,

    /// Percentile shown in the breakdown series
    #[arg(
        short = 'p',
        long = "percentile",
        default_value = "p50",
        value_parser = SeriesSelector::from_str
    )]
    pub percentile: SeriesSelector,

    /// Outlier ceiling in seconds (overrides the config file)
    #[arg(long = "ceiling", value_name = "SECS")]
    pub ceiling: Option<f64>,

    /// Aggregation config file (TOML)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// List device types present in the input and exit
    #[arg(long = "list-devices")]
    pub list_devices: bool,

    /// List normalized entry sources present in the input and exit
    #[arg(long = "list-sources")]
    pub list_sources: bool,

    /// Output format (text, json or csv)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}
