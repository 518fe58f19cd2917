// Per-category statistics and the presentation contract
//
// `Aggregation::NoData` is distinct from a ranked list: an empty input, or an
// input where no bundle survives extraction and filtering, never produces a
// list of zero-valued categories.

use crate::aggregate::ranker::{rank_categories, RankKey};
use crate::aggregate::CategorySamples;
use crate::stats::{PercentileMethod, Summary};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Statistics for one category (times in seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub p50: f64,
    pub p75: f64,
    pub min: f64,
    /// Number of bundles in the category
    pub samples: usize,
    /// Sum of bundle weights in the category
    pub weight: f64,
}

impl CategoryStats {
    pub fn from_summary(category: impl Into<String>, summary: Summary) -> Self {
        Self {
            category: category.into(),
            p50: summary.p50,
            p75: summary.p75,
            min: summary.min,
            samples: summary.samples,
            weight: summary.weight,
        }
    }
}

/// Result of an aggregation pass
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// No usable category in the input
    NoData,
    /// Categories ordered slowest first
    Ranked(Vec<CategoryStats>),
}

impl Aggregation {
    /// Wrap ranked stats, collapsing an empty list to `NoData`
    pub fn from_ranked(stats: Vec<CategoryStats>) -> Self {
        if stats.is_empty() {
            Aggregation::NoData
        } else {
            Aggregation::Ranked(stats)
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Aggregation::NoData)
    }

    /// Ranked categories (empty for `NoData`)
    pub fn categories(&self) -> &[CategoryStats] {
        match self {
            Aggregation::NoData => &[],
            Aggregation::Ranked(stats) => stats,
        }
    }

    /// Re-derive a display series without re-aggregating
    ///
    /// Returns `None` for `NoData`. Category order is the ranked order.
    pub fn series(&self, selector: SeriesSelector) -> Option<Series> {
        let Aggregation::Ranked(stats) = self else {
            return None;
        };
        Some(Series {
            label: selector.label().to_string(),
            labels: stats.iter().map(|s| s.category.clone()).collect(),
            values: stats.iter().map(|s| selector.pick(s)).collect(),
        })
    }
}

/// Percentile shown in a display series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSelector {
    #[default]
    P50,
    P75,
}

impl SeriesSelector {
    /// Legend label
    pub fn label(self) -> &'static str {
        match self {
            SeriesSelector::P50 => "p50 (Median)",
            SeriesSelector::P75 => "p75",
        }
    }

    fn pick(self, stats: &CategoryStats) -> f64 {
        match self {
            SeriesSelector::P50 => stats.p50,
            SeriesSelector::P75 => stats.p75,
        }
    }
}

impl FromStr for SeriesSelector {
    type Err = String;

    /// Parses `p50`/`p75`; an empty selector means `p50`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "p75" => Ok(SeriesSelector::P75),
            "p50" | "" => Ok(SeriesSelector::P50),
            other => Err(format!("Unknown percentile '{}' (expected p50 or p75)", other)),
        }
    }
}

impl fmt::Display for SeriesSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesSelector::P50 => write!(f, "p50"),
            SeriesSelector::P75 => write!(f, "p75"),
        }
    }
}

/// One display series: category labels and their values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Summarize every category and rank by median, slowest first
pub fn summarize(samples: &CategorySamples, method: PercentileMethod) -> Aggregation {
    let stats: Vec<CategoryStats> = samples
        .iter()
        .filter(|(_, group)| !group.is_empty())
        .map(|(category, group)| {
            let summary = Summary::from_samples(group, method);
            tracing::trace!(
                "{}: p50={:.3}s p75={:.3}s n={}",
                category,
                summary.p50,
                summary.p75,
                summary.samples
            );
            CategoryStats::from_summary(category, summary)
        })
        .collect();

    Aggregation::from_ranked(rank_categories(stats, RankKey::P50))
}
