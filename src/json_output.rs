//! JSON output format for readiness reports
//!
//! `categories` is `null` (and `no_data` is `true`) when nothing survived
//! extraction and filtering, so consumers never see a zero-filled breakdown.

use crate::aggregate::{CategoryStats, Series, SeriesSelector};
use crate::stats::Histogram;
use crate::view::{Comparison, DeviceSnapshot};
use serde::{Deserialize, Serialize};

/// Overall readiness for one device selection (seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonTotals {
    /// Device label ("All devices" when unfiltered)
    pub device: String,
    pub min: f64,
    pub p50: f64,
    pub p75: f64,
    /// Bundles with a usable readiness time
    pub samples: usize,
    pub weight: f64,
    /// Load-time distribution; the open-ended last bucket has `upper: null`
    pub histogram: Histogram,
}

impl JsonTotals {
    fn from_snapshot(snapshot: &DeviceSnapshot) -> Self {
        let totals = &snapshot.totals;
        Self {
            device: snapshot.device.label().to_string(),
            min: totals.min,
            p50: totals.p50,
            p75: totals.p75,
            samples: totals.samples,
            weight: totals.weight,
            histogram: snapshot.histogram.clone(),
        }
    }
}

/// Root JSON output structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonReport {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    /// Category dimension, e.g. `checkpoint:enter`
    pub group_by: String,
    pub totals: JsonTotals,
    /// Comparison device totals (if --compare given)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare: Option<JsonTotals>,
    pub no_data: bool,
    /// Ranked categories, slowest first
    pub categories: Option<Vec<CategoryStats>>,
    /// Display series for the selected percentile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<Series>,
}

impl JsonReport {
    /// Build a report from a device comparison
    pub fn new(comparison: &Comparison, group_by: &str, selector: SeriesSelector) -> Self {
        let breakdown = &comparison.primary.breakdown;
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "readytime-json-v1".to_string(),
            group_by: group_by.to_string(),
            totals: JsonTotals::from_snapshot(&comparison.primary),
            compare: comparison.compare.as_ref().map(JsonTotals::from_snapshot),
            no_data: breakdown.is_no_data(),
            categories: (!breakdown.is_no_data()).then(|| breakdown.categories().to_vec()),
            series: breakdown.series(selector),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Aggregation;
    use crate::stats::{Summary, WeightedSample, LOAD_TIME_BUCKETS};
    use crate::view::DeviceFilter;

    fn snapshot(device: &str, breakdown: Aggregation) -> DeviceSnapshot {
        DeviceSnapshot {
            device: DeviceFilter::from_label(device),
            totals: Summary {
                min: 0.5,
                p50: 1.5,
                p75: 2.5,
                samples: 4,
                weight: 4.0,
            },
            breakdown,
            histogram: Histogram::from_samples(
                &[WeightedSample::new(1.5, 3.0), WeightedSample::new(70.0, 1.0)],
                &LOAD_TIME_BUCKETS,
            ),
        }
    }

    fn ranked() -> Aggregation {
        Aggregation::Ranked(vec![CategoryStats {
            category: "https://a.com".to_string(),
            p50: 1.5,
            p75: 2.5,
            min: 0.5,
            samples: 4,
            weight: 4.0,
        }])
    }

    #[test]
    fn test_report_fields() {
        let comparison = Comparison {
            primary: snapshot("All", ranked()),
            compare: None,
        };
        let report = JsonReport::new(&comparison, "checkpoint:enter", SeriesSelector::P75);

        assert_eq!(report.format, "readytime-json-v1");
        assert_eq!(report.totals.device, "All devices");
        assert!(!report.no_data);
        assert_eq!(report.categories.as_ref().unwrap().len(), 1);
        let series = report.series.as_ref().unwrap();
        assert_eq!(series.label, "p75");
        assert_eq!(series.values, vec![2.5]);
    }

    #[test]
    fn test_no_data_serializes_null_categories() {
        let comparison = Comparison {
            primary: snapshot("iOS", Aggregation::NoData),
            compare: None,
        };
        let json = JsonReport::new(&comparison, "checkpoint:enter", SeriesSelector::P50)
            .to_json()
            .unwrap();

        assert!(json.contains("\"no_data\": true"));
        assert!(json.contains("\"categories\": null"));
        assert!(!json.contains("\"series\""));
        assert!(!json.contains("\"compare\""));
    }

    #[test]
    fn test_compare_totals_included() {
        let comparison = Comparison {
            primary: snapshot("Android", ranked()),
            compare: Some(snapshot("iOS", Aggregation::NoData)),
        };
        let report = JsonReport::new(&comparison, "attribute:deviceType", SeriesSelector::P50);
        let json = report.to_json().unwrap();

        let parsed: JsonReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
        assert_eq!(parsed.compare.unwrap().device, "iOS");
        assert_eq!(parsed.group_by, "attribute:deviceType");
    }

    #[test]
    fn test_histogram_in_primary_and_compare_totals() {
        let comparison = Comparison {
            primary: snapshot("Android", ranked()),
            compare: Some(snapshot("iOS", Aggregation::NoData)),
        };
        let json = JsonReport::new(&comparison, "checkpoint:enter", SeriesSelector::P50)
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        for key in ["totals", "compare"] {
            let buckets = value[key]["histogram"]["buckets"].as_array().unwrap();
            assert_eq!(buckets.len(), 4);
            assert_eq!(buckets[0]["weight"], 3.0);
            assert_eq!(buckets[3]["lower"], 60.0);
            assert!(buckets[3]["upper"].is_null());
            assert_eq!(buckets[3]["samples"], 1);
        }
    }
}
