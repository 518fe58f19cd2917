// Bundle aggregation: one weighted sample per (bundle, category)
//
// A bundle is dropped as a whole when it has no readiness metric, the metric
// is above the outlier ceiling, or its weight carries no mass. Kept bundles
// contribute once to every distinct category they belong to.

use crate::aggregate::summary::{summarize, Aggregation};
use crate::aggregate::{AggregationConfig, ConfigError};
use crate::bundle::EventBundle;
use crate::metric::MetricExtractor;
use crate::normalize::normalize_source;
use crate::outlier::OutlierFilter;
use crate::stats::{PercentileMethod, WeightedSample};
use fnv::FnvHashMap;
use std::fmt;

/// How a bundle's categories are derived
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRule {
    /// Normalized `source` of every event with this checkpoint (e.g., "enter")
    Checkpoint(String),
    /// Value of a bundle-level attribute (e.g., "deviceType")
    Attribute(String),
}

impl fmt::Display for CategoryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryRule::Checkpoint(tag) => write!(f, "checkpoint:{}", tag),
            CategoryRule::Attribute(name) => write!(f, "attribute:{}", name),
        }
    }
}

impl CategoryRule {
    /// Distinct categories of one bundle, in first-seen order
    pub fn categories(&self, bundle: &EventBundle) -> Vec<String> {
        match self {
            CategoryRule::Checkpoint(tag) => {
                let mut seen = Vec::new();
                for event in bundle.events() {
                    if event.checkpoint != *tag {
                        continue;
                    }
                    let Some(source) = event.source() else {
                        continue;
                    };
                    let category = normalize_source(source);
                    if !seen.contains(&category) {
                        seen.push(category);
                    }
                }
                seen
            }
            CategoryRule::Attribute(name) => bundle
                .attribute(name)
                .map(|v| vec![v.to_string()])
                .unwrap_or_default(),
        }
    }
}

/// Weighted samples grouped by category, in first-seen category order
#[derive(Debug, Clone, Default)]
pub struct CategorySamples {
    groups: Vec<(String, Vec<WeightedSample>)>,
    index: FnvHashMap<String, usize>,
}

impl CategorySamples {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample to a category, creating it on first use
    pub fn push(&mut self, category: &str, sample: WeightedSample) {
        let slot = match self.index.get(category) {
            Some(&slot) => slot,
            None => {
                self.groups.push((category.to_string(), Vec::new()));
                self.index.insert(category.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[slot].1.push(sample);
    }

    /// Samples for one category
    pub fn get(&self, category: &str) -> Option<&[WeightedSample]> {
        self.index
            .get(category)
            .map(|&slot| self.groups[slot].1.as_slice())
    }

    /// Category names in first-seen order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(name, _)| name.as_str())
    }

    /// `(category, samples)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[WeightedSample])> {
        self.groups
            .iter()
            .map(|(name, samples)| (name.as_str(), samples.as_slice()))
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total samples across all categories
    pub fn total_samples(&self) -> usize {
        self.groups.iter().map(|(_, s)| s.len()).sum()
    }
}

/// Turns bundles into per-category weighted samples
#[derive(Debug, Clone)]
pub struct BundleAggregator {
    extractor: MetricExtractor,
    outliers: OutlierFilter,
    rule: CategoryRule,
    method: PercentileMethod,
}

impl BundleAggregator {
    /// Build an aggregator grouping by the config's category checkpoint
    pub fn new(config: &AggregationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            extractor: MetricExtractor::new(config)?,
            outliers: OutlierFilter::new(config.outlier_ceiling_secs),
            rule: CategoryRule::Checkpoint(config.category_checkpoint.clone()),
            method: config.percentile_method,
        })
    }

    /// Group by a different rule
    pub fn with_rule(mut self, rule: CategoryRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn rule(&self) -> &CategoryRule {
        &self.rule
    }

    pub fn method(&self) -> PercentileMethod {
        self.method
    }

    pub fn outlier_filter(&self) -> &OutlierFilter {
        &self.outliers
    }

    /// The weighted readiness sample of one bundle, if it is kept
    ///
    /// This is the single sample-producing path: grouping, totals and
    /// facets all go through it so they cannot disagree on clamping.
    pub fn sample(&self, bundle: &EventBundle) -> Option<WeightedSample> {
        let Some(value) = self.extractor.extract(bundle) else {
            tracing::debug!(
                "Skipping bundle without readiness metric (malformed: {})",
                bundle.is_malformed()
            );
            return None;
        };

        if !self.outliers.keep(value) {
            tracing::debug!(
                "Skipping outlier {:.3}s (ceiling {}s)",
                value,
                self.outliers.ceiling_secs()
            );
            return None;
        }

        let weight = bundle.effective_weight();
        if weight <= 0.0 {
            tracing::debug!("Skipping bundle with weight {}", bundle.weight);
            return None;
        }

        Some(WeightedSample::new(value, weight))
    }

    /// Group kept bundles by category
    pub fn aggregate<'a, I>(&self, bundles: I) -> CategorySamples
    where
        I: IntoIterator<Item = &'a EventBundle>,
    {
        let mut samples = CategorySamples::new();
        let mut seen = 0usize;
        let mut kept = 0usize;

        for bundle in bundles {
            seen += 1;
            let Some(sample) = self.sample(bundle) else {
                continue;
            };
            kept += 1;
            for category in self.rule.categories(bundle) {
                samples.push(&category, sample);
            }
        }

        tracing::debug!(
            "Aggregated {} of {} bundles into {} categories by {}",
            kept,
            seen,
            samples.len(),
            self.rule
        );
        samples
    }

    /// Kept samples of all bundles, ignoring categories
    pub fn samples<'a, I>(&self, bundles: I) -> Vec<WeightedSample>
    where
        I: IntoIterator<Item = &'a EventBundle>,
    {
        bundles.into_iter().filter_map(|b| self.sample(b)).collect()
    }

    /// Aggregate, summarize and rank in one pass
    pub fn summarize<'a, I>(&self, bundles: I) -> Aggregation
    where
        I: IntoIterator<Item = &'a EventBundle>,
    {
        summarize(&self.aggregate(bundles), self.method)
    }
}
