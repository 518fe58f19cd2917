//! Pre-aggregated facet input
//!
//! A facet is one category with precomputed summary accessors, as exposed by
//! a richer aggregation store. Facet percentiles use the unweighted
//! interpolated formula on a 0–100 scale.
//!
//! [`SampleFacet`] builds facets from the same [`CategorySamples`] that the
//! raw-bundle path produces. Both paths share one sample-producing pass, so
//! they always apply the same outlier ceiling.

use crate::aggregate::{rank_categories, Aggregation, CategorySamples, CategoryStats, RankKey};
use crate::stats::interpolated_percentile;

/// Summary accessors for one pre-aggregated category
pub trait Facet {
    /// Category label
    fn value(&self) -> &str;

    /// Fastest observation, if any
    fn min(&self) -> Option<f64>;

    /// Percentile on a 0–100 scale, if the facet has data
    fn percentile(&self, p: f64) -> Option<f64>;

    /// Number of observations
    fn count(&self) -> usize;

    /// Observation mass (defaults to the count)
    fn weight(&self) -> f64 {
        self.count() as f64
    }
}

/// Facet over a sorted set of readiness times
///
/// Percentiles ignore weights; the weight sum is only carried through to
/// [`Facet::weight`].
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFacet {
    value: String,
    sorted: Vec<f64>,
    weight: f64,
}

impl SampleFacet {
    /// Build a facet from raw values (any order), each with unit weight
    pub fn new(value: impl Into<String>, mut values: Vec<f64>) -> Self {
        values.retain(|v| !v.is_nan());
        values.sort_by(f64::total_cmp);
        let weight = values.len() as f64;
        Self {
            value: value.into(),
            sorted: values,
            weight,
        }
    }

    /// Override the observation mass
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// One facet per category, carrying each group's weight sum
    pub fn from_samples(samples: &CategorySamples) -> Vec<Self> {
        samples
            .iter()
            .map(|(category, group)| {
                let weight = group.iter().map(|s| s.weight).sum();
                Self::new(category, group.iter().map(|s| s.value).collect()).with_weight(weight)
            })
            .collect()
    }
}

impl Facet for SampleFacet {
    fn value(&self) -> &str {
        &self.value
    }

    fn min(&self) -> Option<f64> {
        self.sorted.first().copied()
    }

    fn percentile(&self, p: f64) -> Option<f64> {
        if self.sorted.is_empty() {
            return None;
        }
        Some(interpolated_percentile(&self.sorted, p / 100.0))
    }

    fn count(&self) -> usize {
        self.sorted.len()
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Summarize facets into the same ranked contract as the bundle path
///
/// Facets with an empty label are dropped; missing statistics read as 0.
pub fn summarize_facets<F: Facet>(facets: &[F]) -> Aggregation {
    let stats: Vec<CategoryStats> = facets
        .iter()
        .filter(|f| !f.value().is_empty())
        .map(|f| CategoryStats {
            category: f.value().to_string(),
            p50: f.percentile(50.0).unwrap_or(0.0),
            p75: f.percentile(75.0).unwrap_or(0.0),
            min: f.min().unwrap_or(0.0),
            samples: f.count(),
            weight: f.weight(),
        })
        .collect();

    Aggregation::from_ranked(rank_categories(stats, RankKey::P50))
}
