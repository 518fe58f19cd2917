//! Readiness metric extraction
//!
//! The metric for a bundle is the time, in seconds, at which the target block
//! (by default any block whose source mentions `form`) became visible.

use crate::aggregate::{AggregationConfig, ConfigError};
use crate::bundle::{Event, EventBundle};
use regex::Regex;

/// Derives the readiness time of one bundle
#[derive(Debug, Clone)]
pub struct MetricExtractor {
    checkpoint: String,
    pattern: Regex,
}

impl MetricExtractor {
    /// Build an extractor from the metric checkpoint and pattern of `config`
    pub fn new(config: &AggregationConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            checkpoint: config.metric_checkpoint.clone(),
            pattern: config.compile_pattern()?,
        })
    }

    fn is_target(&self, event: &Event) -> bool {
        event.checkpoint == self.checkpoint
            && event.source().is_some_and(|s| self.pattern.is_match(s))
    }

    /// Seconds until the target block became visible
    ///
    /// Events are put in time order first (input order is not trusted). Only
    /// the earliest matching event counts: if its `timeDelta` is missing or
    /// not strictly positive the bundle has no value, it is not zero.
    pub fn extract(&self, bundle: &EventBundle) -> Option<f64> {
        let mut events: Vec<&Event> = bundle.events.as_ref()?.iter().collect();
        events.sort_by(|a, b| {
            let a = a.time_delta.unwrap_or(f64::NEG_INFINITY);
            let b = b.time_delta.unwrap_or(f64::NEG_INFINITY);
            a.total_cmp(&b)
        });

        let target = events.into_iter().find(|e| self.is_target(e))?;
        match target.time_delta {
            Some(ms) if ms > 0.0 => Some(ms / 1000.0),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> MetricExtractor {
        MetricExtractor::new(&AggregationConfig::default()).unwrap()
    }

    #[test]
    fn test_extract_form_view() {
        let bundle = EventBundle::new(vec![
            Event::new("enter", "https://a.com", 10.0),
            Event::new("viewblock", ".form-container", 1840.0),
        ]);
        assert_eq!(extractor().extract(&bundle), Some(1.84));
    }

    #[test]
    fn test_earliest_match_wins_regardless_of_input_order() {
        let bundle = EventBundle::new(vec![
            Event::new("viewblock", ".form", 5000.0),
            Event::new("viewblock", ".form", 2000.0),
        ]);
        assert_eq!(extractor().extract(&bundle), Some(2.0));
    }

    #[test]
    fn test_non_form_blocks_ignored() {
        let bundle = EventBundle::new(vec![
            Event::new("viewblock", ".hero", 300.0),
            Event::new("viewmedia", ".form img", 400.0),
            Event::new("viewblock", ".form", 900.0),
        ]);
        assert_eq!(extractor().extract(&bundle), Some(0.9));
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let bundle = EventBundle::new(vec![Event::new("viewblock", ".FORM", 900.0)]);
        assert_eq!(extractor().extract(&bundle), None);
    }

    #[test]
    fn test_no_visibility_event() {
        let bundle = EventBundle::new(vec![Event::new("enter", "https://a.com", 10.0)]);
        assert_eq!(extractor().extract(&bundle), None);
    }

    #[test]
    fn test_non_positive_time_delta() {
        let zero = EventBundle::new(vec![Event::new("viewblock", ".form", 0.0)]);
        let negative = EventBundle::new(vec![Event::new("viewblock", ".form", -20.0)]);
        assert_eq!(extractor().extract(&zero), None);
        assert_eq!(extractor().extract(&negative), None);
    }

    #[test]
    fn test_earliest_match_non_positive_is_not_skipped() {
        // The first match decides; a later valid match does not rescue the bundle
        let bundle = EventBundle::new(vec![
            Event::new("viewblock", ".form", -5.0),
            Event::new("viewblock", ".form", 700.0),
        ]);
        assert_eq!(extractor().extract(&bundle), None);
    }

    #[test]
    fn test_missing_time_delta() {
        let bundle = EventBundle::new(vec![Event {
            checkpoint: "viewblock".to_string(),
            source: Some(".form".to_string()),
            time_delta: None,
        }]);
        assert_eq!(extractor().extract(&bundle), None);
    }

    #[test]
    fn test_malformed_bundle() {
        let bundle = EventBundle {
            events: None,
            ..EventBundle::default()
        };
        assert_eq!(extractor().extract(&bundle), None);
    }

    #[test]
    fn test_custom_checkpoint_and_pattern() {
        let config = AggregationConfig {
            metric_checkpoint: "viewmedia".to_string(),
            metric_pattern: r"^\.hero".to_string(),
            ..AggregationConfig::default()
        };
        let extractor = MetricExtractor::new(&config).unwrap();
        let bundle = EventBundle::new(vec![
            Event::new("viewmedia", ".form", 100.0),
            Event::new("viewmedia", ".hero picture", 2500.0),
        ]);
        assert_eq!(extractor.extract(&bundle), Some(2.5));
    }
}
