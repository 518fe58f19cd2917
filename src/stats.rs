//! Percentile estimation for readiness samples
//!
//! Two estimators live here and they are deliberately NOT interchangeable:
//!
//! - [`weighted_percentile`]: rank-based (nearest-above) over weighted samples.
//!   Used for statistics derived from raw bundles. [`weighted_percentile_sorted`]
//!   skips the sort when the caller already holds sorted samples.
//! - [`interpolated_percentile`]: linear interpolation between the two
//!   bracketing ranks of an unweighted sorted array. Used for pre-aggregated
//!   facets.
//!
//! They disagree by a fraction of a bucket in edge cases, so a single
//! comparison must pick one via [`PercentileMethod`].
//!
//! [`Histogram`] buckets the same samples by load time for the distribution view.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One (bundle, category) observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedSample {
    /// Readiness time in seconds
    pub value: f64,
    /// Sample multiplicity
    pub weight: f64,
}

impl WeightedSample {
    pub fn new(value: f64, weight: f64) -> Self {
        Self { value, weight }
    }
}

/// Which percentile formula a summary uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PercentileMethod {
    /// Nearest-above rank over cumulative weight
    #[default]
    WeightedRank,
    /// Unweighted linear interpolation between ranks
    Interpolated,
}

impl fmt::Display for PercentileMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentileMethod::WeightedRank => write!(f, "weighted-rank"),
            PercentileMethod::Interpolated => write!(f, "interpolated"),
        }
    }
}

/// Sort samples by value (stable, so equal values keep insertion order)
pub fn sort_samples(samples: &mut [WeightedSample]) {
    samples.sort_by(|a, b| a.value.total_cmp(&b.value));
}

/// Weighted percentile over samples in any order
///
/// Sorts a copy, then defers to [`weighted_percentile_sorted`].
///
/// # Example
/// ```
/// use readytime::stats::{weighted_percentile, WeightedSample};
///
/// let samples: Vec<_> = [4.0, 1.0, 3.0, 2.0]
///     .iter()
///     .map(|&v| WeightedSample::new(v, 1.0))
///     .collect();
/// assert_eq!(weighted_percentile(&samples, 0.5), 2.0);
/// ```
pub fn weighted_percentile(samples: &[WeightedSample], p: f64) -> f64 {
    let mut sorted = samples.to_vec();
    sort_samples(&mut sorted);
    weighted_percentile_sorted(&sorted, p)
}

/// Weighted percentile over samples already sorted by value
///
/// `p` is a fraction in `[0, 1]`. Returns the value of the first sample whose
/// cumulative weight reaches `total * p`. With unit weights this selects the
/// sample at index `ceil(p * n) - 1`.
///
/// Returns 0 for an empty slice or a non-positive weight total.
///
/// # Example
/// ```
/// use readytime::stats::{weighted_percentile_sorted, WeightedSample};
///
/// let samples: Vec<_> = [1.0, 2.0, 3.0, 4.0]
///     .iter()
///     .map(|&v| WeightedSample::new(v, 1.0))
///     .collect();
/// assert_eq!(weighted_percentile_sorted(&samples, 0.5), 2.0);
/// ```
pub fn weighted_percentile_sorted(sorted: &[WeightedSample], p: f64) -> f64 {
    debug_assert!(sorted.windows(2).all(|w| w[0].value.total_cmp(&w[1].value).is_le()));
    let Some(last) = sorted.last() else {
        return 0.0;
    };

    let total: f64 = sorted.iter().map(|s| s.weight).sum();
    if total <= 0.0 || total.is_nan() {
        return 0.0;
    }

    let target = total * p;
    let mut cumulative = 0.0;
    for sample in sorted {
        cumulative += sample.weight;
        if cumulative >= target {
            return sample.value;
        }
    }

    // Only reachable through floating-point drift
    last.value
}

/// Interpolated percentile over an unweighted sorted array
///
/// `p` is a fraction in `[0, 1]`. Computes `index = (n - 1) * p` and linearly
/// interpolates between the floor and ceiling elements.
///
/// # Example
/// ```
/// use readytime::stats::interpolated_percentile;
///
/// assert_eq!(interpolated_percentile(&[1.0, 2.0, 3.0, 4.0], 0.5), 2.5);
/// ```
pub fn interpolated_percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let index = (sorted.len() - 1) as f64 * p.clamp(0.0, 1.0);
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let fraction = index - lower as f64;
        sorted[lower] + fraction * (sorted[upper] - sorted[lower])
    }
}

/// Summary statistics for one sample set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Fastest readiness time (seconds)
    pub min: f64,
    /// Median (seconds)
    pub p50: f64,
    /// 75th percentile (seconds)
    pub p75: f64,
    /// Number of samples
    pub samples: usize,
    /// Sum of sample weights
    pub weight: f64,
}

impl Summary {
    /// Summarize samples with the given method
    ///
    /// The input order does not matter; a sorted copy is taken.
    pub fn from_samples(samples: &[WeightedSample], method: PercentileMethod) -> Self {
        let mut sorted: Vec<WeightedSample> = samples.to_vec();
        sort_samples(&mut sorted);

        let weight = sorted.iter().map(|s| s.weight).sum();
        let min = sorted.first().map(|s| s.value).unwrap_or(0.0);

        let (p50, p75) = match method {
            PercentileMethod::WeightedRank => (
                weighted_percentile_sorted(&sorted, 0.5),
                weighted_percentile_sorted(&sorted, 0.75),
            ),
            PercentileMethod::Interpolated => {
                let values: Vec<f64> = sorted.iter().map(|s| s.value).collect();
                (
                    interpolated_percentile(&values, 0.5),
                    interpolated_percentile(&values, 0.75),
                )
            }
        };

        Self {
            min,
            p50,
            p75,
            samples: sorted.len(),
            weight,
        }
    }
}

/// Load-time histogram edges in seconds: under 10s, 10-20s, 20-60s, 60s and up
pub const LOAD_TIME_BUCKETS: [f64; 5] = [0.0, 10.0, 20.0, 60.0, f64::INFINITY];

/// One histogram bucket covering `[lower, upper)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Inclusive lower edge (seconds)
    pub lower: f64,
    /// Exclusive upper edge; `None` when the bucket is open-ended
    pub upper: Option<f64>,
    /// Number of samples in the bucket
    pub samples: usize,
    /// Sum of sample weights in the bucket
    pub weight: f64,
}

impl HistogramBucket {
    /// Whether `value` falls in this bucket
    pub fn contains(&self, value: f64) -> bool {
        match self.upper {
            Some(upper) => value >= self.lower && value < upper,
            None => value >= self.lower,
        }
    }

    /// Range label, e.g. "10s-20s" or "60s+"
    pub fn label(&self) -> String {
        match self.upper {
            Some(upper) => format!("{}s-{}s", self.lower, upper),
            None => format!("{}s+", self.lower),
        }
    }
}

/// Weighted sample counts per load-time bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub buckets: Vec<HistogramBucket>,
}

impl Histogram {
    /// Bucket `samples` by the ascending `edges`
    ///
    /// Consecutive edges bound one bucket each; an infinite last edge makes the
    /// last bucket open-ended. Values outside every bucket (including NaN) are
    /// not counted.
    pub fn from_samples(samples: &[WeightedSample], edges: &[f64]) -> Self {
        let mut buckets: Vec<HistogramBucket> = edges
            .windows(2)
            .map(|pair| HistogramBucket {
                lower: pair[0],
                upper: pair[1].is_finite().then_some(pair[1]),
                samples: 0,
                weight: 0.0,
            })
            .collect();

        for sample in samples {
            if let Some(bucket) = buckets.iter_mut().find(|b| b.contains(sample.value)) {
                bucket.samples += 1;
                bucket.weight += sample.weight;
            }
        }

        Self { buckets }
    }

    /// Sum of weights over all buckets
    pub fn total_weight(&self) -> f64 {
        self.buckets.iter().map(|b| b.weight).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.samples == 0)
    }
}
