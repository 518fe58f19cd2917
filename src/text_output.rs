//! Human-readable readiness report
//!
//! Times below one second print as whole milliseconds (`840ms`), longer ones
//! as seconds with two decimals (`2.35s`).

use crate::aggregate::{Aggregation, SeriesSelector};
use crate::stats::{Histogram, Summary};
use crate::view::Comparison;
use std::fmt::Write;

/// Format a duration given in seconds
pub fn format_time(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{:.0}ms", seconds * 1000.0)
    } else {
        format!("{:.2}s", seconds)
    }
}

/// Readiness rating of a single time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceClass {
    /// ≤ 1s
    Fast,
    /// ≤ 2s
    Moderate,
    Slow,
}

impl PerformanceClass {
    pub fn from_secs(seconds: f64) -> Self {
        if seconds <= 1.0 {
            PerformanceClass::Fast
        } else if seconds <= 2.0 {
            PerformanceClass::Moderate
        } else {
            PerformanceClass::Slow
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PerformanceClass::Fast => "fast",
            PerformanceClass::Moderate => "moderate",
            PerformanceClass::Slow => "slow",
        }
    }
}

/// Verbal rating of a readiness time: Excellent, Good, Needs Improvement or Poor
pub fn performance_label(seconds: f64) -> &'static str {
    if seconds <= 1.0 {
        "Excellent"
    } else if seconds <= 2.0 {
        "Good"
    } else if seconds <= 3.0 {
        "Needs Improvement"
    } else {
        "Poor"
    }
}

/// Chart-style title for a breakdown, e.g. "Form Visibility Time by Source - p75"
pub fn title(dimension: &str, selector: SeriesSelector) -> String {
    format!("Form Visibility Time by {} - {}", dimension, selector.label())
}

fn stat_line(out: &mut String, label: &str, value: f64, compare: Option<(&str, f64)>) {
    let _ = write!(
        out,
        "{:<15} {:>9}  [{}]",
        label,
        format_time(value),
        PerformanceClass::from_secs(value).as_str()
    );
    if let Some((compare_label, compare_value)) = compare {
        let _ = write!(out, "   {}: {}", compare_label, format_time(compare_value));
    }
    out.push('\n');
}

fn summary_block(out: &mut String, primary: &Summary, compare: Option<(&str, &Summary)>) {
    stat_line(out, "Fastest (Min):", primary.min, compare.map(|(l, s)| (l, s.min)));
    stat_line(out, "p50 (Median):", primary.p50, compare.map(|(l, s)| (l, s.p50)));
    stat_line(out, "p75:", primary.p75, compare.map(|(l, s)| (l, s.p75)));
}

fn histogram_block(out: &mut String, primary: &Histogram, compare: Option<(&str, &Histogram)>) {
    if primary.is_empty() {
        return;
    }
    let _ = writeln!(out, "Load time distribution (weight, bundles):");
    for (i, bucket) in primary.buckets.iter().enumerate() {
        let _ = write!(
            out,
            "  {:<13} {:>9} {:>9}",
            bucket.label(),
            bucket.weight,
            bucket.samples
        );
        if let Some(other) = compare.and_then(|(l, h)| h.buckets.get(i).map(|b| (l, b))) {
            let _ = write!(out, "   {}: {}", other.0, other.1.weight);
        }
        out.push('\n');
    }
    out.push('\n');
}

/// Render a breakdown table, or "No data available"
pub fn render_breakdown(
    breakdown: &Aggregation,
    dimension: &str,
    selector: SeriesSelector,
) -> String {
    let Some(series) = breakdown.series(selector) else {
        return "No data available\n".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", title(dimension, selector));
    let _ = writeln!(out, "{:>9} {:>9} {:>9} {:>9}  category", "p50", "p75", "min", "bundles");
    let _ = writeln!(out, "--------- --------- --------- ---------  --------");
    for stats in breakdown.categories() {
        let _ = writeln!(
            out,
            "{:>9} {:>9} {:>9} {:>9}  {}",
            format_time(stats.p50),
            format_time(stats.p75),
            format_time(stats.min),
            stats.samples,
            stats.category
        );
    }
    let _ = writeln!(out, "--------- --------- --------- ---------  --------");
    let _ = writeln!(out, "{} categories ({})", series.labels.len(), series.label);
    out
}

/// Render the full report for a device comparison
pub fn render_report(
    comparison: &Comparison,
    dimension: &str,
    selector: SeriesSelector,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Engagement Readiness Time (Form Visibility) ===");

    let primary = &comparison.primary;
    match &comparison.compare {
        Some(compare) => {
            let _ = writeln!(
                out,
                "Device: {} (compared to {})\n",
                primary.device.label(),
                compare.device.label()
            );
            summary_block(
                &mut out,
                &primary.totals,
                Some((compare.device.label(), &compare.totals)),
            );
        }
        None => {
            let _ = writeln!(out, "Device: {}\n", primary.device.label());
            summary_block(&mut out, &primary.totals, None);
        }
    }
    let _ = writeln!(out, "{:<15} {:>9}", "Bundles:", primary.totals.samples);
    if primary.totals.samples > 0 {
        let _ = writeln!(out, "{:<15} {:>9}", "Rating:", performance_label(primary.totals.p50));
    }
    out.push('\n');

    let compare = comparison
        .compare
        .as_ref()
        .map(|c| (c.device.label(), &c.histogram));
    histogram_block(&mut out, &primary.histogram, compare);

    out.push_str(&render_breakdown(&primary.breakdown, dimension, selector));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::CategoryStats;
    use crate::stats::{WeightedSample, LOAD_TIME_BUCKETS};
    use crate::view::{DeviceFilter, DeviceSnapshot};

    fn category(name: &str, p50: f64, p75: f64) -> CategoryStats {
        CategoryStats {
            category: name.to_string(),
            p50,
            p75,
            min: 0.2,
            samples: 3,
            weight: 3.0,
        }
    }

    fn snapshot(device: &str, p50: f64, breakdown: Aggregation) -> DeviceSnapshot {
        DeviceSnapshot {
            device: DeviceFilter::from_label(device),
            totals: Summary {
                min: 0.4,
                p50,
                p75: p50 * 2.0,
                samples: 7,
                weight: 7.0,
            },
            breakdown,
            histogram: Histogram::from_samples(
                &[WeightedSample::new(p50, 5.0), WeightedSample::new(25.0, 2.0)],
                &LOAD_TIME_BUCKETS,
            ),
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.84), "840ms");
        assert_eq!(format_time(0.0), "0ms");
        assert_eq!(format_time(1.0), "1.00s");
        assert_eq!(format_time(2.346), "2.35s");
    }

    #[test]
    fn test_performance_class() {
        assert_eq!(PerformanceClass::from_secs(1.0), PerformanceClass::Fast);
        assert_eq!(PerformanceClass::from_secs(1.5), PerformanceClass::Moderate);
        assert_eq!(PerformanceClass::from_secs(2.01), PerformanceClass::Slow);
        assert_eq!(PerformanceClass::Slow.as_str(), "slow");
    }

    #[test]
    fn test_performance_label() {
        assert_eq!(performance_label(0.4), "Excellent");
        assert_eq!(performance_label(1.0), "Excellent");
        assert_eq!(performance_label(1.7), "Good");
        assert_eq!(performance_label(2.0), "Good");
        assert_eq!(performance_label(3.0), "Needs Improvement");
        assert_eq!(performance_label(3.01), "Poor");
    }

    #[test]
    fn test_title() {
        assert_eq!(
            title("Source", SeriesSelector::P75),
            "Form Visibility Time by Source - p75"
        );
    }

    #[test]
    fn test_render_breakdown_no_data() {
        assert_eq!(
            render_breakdown(&Aggregation::NoData, "Source", SeriesSelector::P50),
            "No data available\n"
        );
    }

    #[test]
    fn test_render_breakdown_rows() {
        let breakdown = Aggregation::Ranked(vec![
            category("https://slow.com", 3.5, 6.0),
            category("https://fast.com", 0.5, 0.75),
        ]);
        let text = render_breakdown(&breakdown, "Source", SeriesSelector::P50);
        assert!(text.contains("Form Visibility Time by Source - p50 (Median)"));
        assert!(text.contains("3.50s"));
        assert!(text.contains("750ms"));
        assert!(text.find("slow.com").unwrap() < text.find("fast.com").unwrap());
        assert!(text.contains("2 categories"));
    }

    #[test]
    fn test_render_report_with_compare() {
        let comparison = Comparison {
            primary: snapshot("Android", 2.5, Aggregation::NoData),
            compare: Some(snapshot("iOS", 0.9, Aggregation::NoData)),
        };
        let text = render_report(&comparison, "Source", SeriesSelector::P50);
        assert!(text.contains("Device: Android (compared to iOS)"));
        assert!(text.contains("p50 (Median):"));
        assert!(text.contains("iOS: 900ms"));
        assert!(text.contains("[slow]"));
        assert!(text.contains("Rating:"));
        assert!(text.contains("Needs Improvement"));
        assert!(text.contains("No data available"));
    }

    #[test]
    fn test_render_report_histogram() {
        let comparison = Comparison {
            primary: snapshot("Android", 2.5, Aggregation::NoData),
            compare: Some(snapshot("iOS", 12.0, Aggregation::NoData)),
        };
        let text = render_report(&comparison, "Source", SeriesSelector::P50);
        assert!(text.contains("Load time distribution"));

        let first = text.lines().find(|l| l.trim_start().starts_with("0s-10s")).unwrap();
        assert!(first.contains(" 5 "));
        assert!(first.ends_with("iOS: 0"));
        let second = text.lines().find(|l| l.trim_start().starts_with("10s-20s")).unwrap();
        assert!(second.ends_with("iOS: 5"));
        assert!(text.contains("60s+"));
    }

    #[test]
    fn test_render_report_without_samples_skips_histogram() {
        let mut primary = snapshot("Linux", 0.0, Aggregation::NoData);
        primary.totals = Summary::default();
        primary.histogram = Histogram::from_samples(&[], &LOAD_TIME_BUCKETS);
        let comparison = Comparison {
            primary,
            compare: None,
        };
        let text = render_report(&comparison, "Source", SeriesSelector::P50);
        assert!(!text.contains("Load time distribution"));
        assert!(!text.contains("Rating:"));
    }

    #[test]
    fn test_render_report_all_devices() {
        let comparison = Comparison {
            primary: snapshot("All", 0.5, Aggregation::Ranked(vec![category("a", 0.5, 1.0)])),
            compare: None,
        };
        let text = render_report(&comparison, "Device", SeriesSelector::P75);
        assert!(text.contains("Device: All devices"));
        assert!(text.contains("Form Visibility Time by Device - p75"));
        assert!(!text.contains("compared to"));
    }
}
