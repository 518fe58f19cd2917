//! Readiness-time ceiling
//!
//! Loads slower than the ceiling are abandoned tabs, background loads, or
//! instrumentation glitches. Every series that is compared side by side must
//! use the same ceiling, otherwise a clamped series is compared with an
//! unclamped one.

/// Default ceiling in seconds
pub const DEFAULT_CEILING_SECS: f64 = 120.0;

/// Drops metrics strictly above a ceiling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierFilter {
    ceiling_secs: f64,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CEILING_SECS)
    }
}

impl OutlierFilter {
    /// Create a filter with the given ceiling (seconds)
    pub fn new(ceiling_secs: f64) -> Self {
        Self { ceiling_secs }
    }

    /// Configured ceiling in seconds
    pub fn ceiling_secs(&self) -> f64 {
        self.ceiling_secs
    }

    /// Whether a metric should be kept (`value <= ceiling`)
    ///
    /// NaN is never kept.
    pub fn keep(&self, value_secs: f64) -> bool {
        value_secs <= self.ceiling_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ceiling() {
        assert_eq!(OutlierFilter::default().ceiling_secs(), 120.0);
    }

    #[test]
    fn test_value_at_ceiling_is_kept() {
        let filter = OutlierFilter::default();
        assert!(filter.keep(120.0));
        assert!(filter.keep(0.25));
    }

    #[test]
    fn test_value_above_ceiling_is_dropped() {
        let filter = OutlierFilter::default();
        assert!(!filter.keep(120.001));
        assert!(!filter.keep(3600.0));
    }

    #[test]
    fn test_custom_ceiling() {
        let filter = OutlierFilter::new(10.0);
        assert!(filter.keep(10.0));
        assert!(!filter.keep(10.5));
    }

    #[test]
    fn test_nan_is_dropped() {
        assert!(!OutlierFilter::default().keep(f64::NAN));
    }
}
