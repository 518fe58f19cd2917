//! Filtered views over a shared bundle source
//!
//! A dashboard reads several narrowed views (one per device type) from a
//! single shared source by setting its filter, reading, and restoring the
//! filter. The source is not copy-on-read, so a leaked filter would be seen
//! by every later reader. [`ScopedFilter`] restores the previous filter when
//! dropped, which covers early returns and panics too.

use crate::aggregate::{Aggregation, BundleAggregator, CategoryRule};
use crate::bundle::EventBundle;
use crate::stats::{Histogram, Summary, LOAD_TIME_BUCKETS};
use std::collections::BTreeMap;
use std::ops::Deref;

/// Bundle attribute holding the device type label
pub const DEVICE_TYPE_ATTRIBUTE: &str = "deviceType";

/// Bundle attribute holding the hour of day a session was sampled
pub const HOUR_ATTRIBUTE: &str = "hour";

/// Display order for known device types; unknown labels follow
pub const DEVICE_ORDER: &[&str] = &[
    "Android",
    "iOS",
    "Windows",
    "macOS",
    "Linux",
    "ChromeOS",
    "Other Mobile",
    "Other Desktop",
    "Other",
];

/// Attribute name -> allowed values (an empty map matches everything)
pub type AttributeFilter = BTreeMap<String, Vec<String>>;

/// A shared data source whose reads depend on a mutable filter
pub trait FilterableSource {
    /// Current filter
    fn filter(&self) -> &AttributeFilter;

    /// Replace the filter
    fn set_filter(&mut self, filter: AttributeFilter);

    /// Overall readiness statistics under the current filter
    fn totals(&self) -> Summary;

    /// Per-category statistics under the current filter
    fn breakdown(&self, rule: &CategoryRule) -> Aggregation;

    /// Load-time distribution over `edges` under the current filter
    fn histogram(&self, edges: &[f64]) -> Histogram;

    /// Distinct values of a bundle attribute under the current filter
    fn attribute_values(&self, name: &str) -> Vec<String>;
}

/// Narrowed view of a [`FilterableSource`]; restores the previous filter on drop
pub struct ScopedFilter<'a, S: FilterableSource + ?Sized> {
    source: &'a mut S,
    previous: Option<AttributeFilter>,
}

impl<'a, S: FilterableSource + ?Sized> ScopedFilter<'a, S> {
    /// Apply `filter` until the guard is dropped
    pub fn new(source: &'a mut S, filter: AttributeFilter) -> Self {
        let previous = source.filter().clone();
        source.set_filter(filter);
        Self {
            source,
            previous: Some(previous),
        }
    }
}

impl<S: FilterableSource + ?Sized> Deref for ScopedFilter<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &*self.source
    }
}

impl<S: FilterableSource + ?Sized> Drop for ScopedFilter<'_, S> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.source.set_filter(previous);
        }
    }
}

/// Run `read` against `source` narrowed by `filter`
pub fn with_filter<S, R, F>(source: &mut S, filter: AttributeFilter, read: F) -> R
where
    S: FilterableSource + ?Sized,
    F: FnOnce(&S) -> R,
{
    let view = ScopedFilter::new(source, filter);
    let value = read(&*view);
    drop(view);
    value
}

/// Device selection for a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeviceFilter {
    #[default]
    All,
    Device(String),
}

impl DeviceFilter {
    /// `"All"` or a blank label selects every device
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label == "All" {
            DeviceFilter::All
        } else {
            DeviceFilter::Device(label.to_string())
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &str {
        match self {
            DeviceFilter::All => "All devices",
            DeviceFilter::Device(name) => name,
        }
    }

    /// Attribute filter selecting this device
    pub fn to_filter(&self) -> AttributeFilter {
        let mut filter = AttributeFilter::new();
        if let DeviceFilter::Device(name) = self {
            filter.insert(DEVICE_TYPE_ATTRIBUTE.to_string(), vec![name.clone()]);
        }
        filter
    }
}

/// Statistics for one device selection
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot {
    pub device: DeviceFilter,
    pub totals: Summary,
    pub breakdown: Aggregation,
    pub histogram: Histogram,
}

/// Primary snapshot plus an optional comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub primary: DeviceSnapshot,
    pub compare: Option<DeviceSnapshot>,
}

/// Read totals, a breakdown and the load-time histogram for one device,
/// then restore the filter
pub fn snapshot_for_device<S>(
    source: &mut S,
    device: &DeviceFilter,
    rule: &CategoryRule,
) -> DeviceSnapshot
where
    S: FilterableSource + ?Sized,
{
    with_filter(source, device.to_filter(), |view| DeviceSnapshot {
        device: device.clone(),
        totals: view.totals(),
        breakdown: view.breakdown(rule),
        histogram: view.histogram(&LOAD_TIME_BUCKETS),
    })
}

/// Snapshot `primary` and, unless it is the same device, `compare`
pub fn compare_devices<S>(
    source: &mut S,
    primary: &DeviceFilter,
    compare: Option<&DeviceFilter>,
    rule: &CategoryRule,
) -> Comparison
where
    S: FilterableSource + ?Sized,
{
    let compare = compare.filter(|c| *c != primary);
    Comparison {
        primary: snapshot_for_device(source, primary, rule),
        compare: compare.map(|c| snapshot_for_device(source, c, rule)),
    }
}

/// Device types present in the unfiltered source, in display order
pub fn available_device_types<S>(source: &mut S) -> Vec<String>
where
    S: FilterableSource + ?Sized,
{
    let values = with_filter(source, AttributeFilter::new(), |view| {
        view.attribute_values(DEVICE_TYPE_ATTRIBUTE)
    });
    order_device_types(values)
}

/// Deduplicate device labels and order known types first
///
/// Blank labels are dropped; unknown labels keep their first-seen order.
pub fn order_device_types<I, T>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut unique: Vec<String> = Vec::new();
    for label in labels {
        let label = label.as_ref();
        if !label.is_empty() && !unique.iter().any(|u| u == label) {
            unique.push(label.to_string());
        }
    }

    let rank = |label: &str| {
        DEVICE_ORDER
            .iter()
            .position(|known| *known == label)
            .unwrap_or(DEVICE_ORDER.len())
    };
    unique.sort_by_key(|label| rank(label.as_str()));
    unique
}

/// In-memory [`FilterableSource`] over a set of bundles
#[derive(Debug, Clone)]
pub struct BundleSet {
    bundles: Vec<EventBundle>,
    aggregator: BundleAggregator,
    filter: AttributeFilter,
}

impl BundleSet {
    pub fn new(bundles: Vec<EventBundle>, aggregator: BundleAggregator) -> Self {
        Self {
            bundles,
            aggregator,
            filter: AttributeFilter::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    fn matches(&self, bundle: &EventBundle) -> bool {
        self.filter.iter().all(|(name, allowed)| {
            allowed.is_empty()
                || bundle
                    .attribute(name)
                    .is_some_and(|v| allowed.iter().any(|a| a == v))
        })
    }

    /// Bundles visible under the current filter
    pub fn visible(&self) -> impl Iterator<Item = &EventBundle> {
        self.bundles.iter().filter(|b| self.matches(b))
    }
}

impl FilterableSource for BundleSet {
    fn filter(&self) -> &AttributeFilter {
        &self.filter
    }

    fn set_filter(&mut self, filter: AttributeFilter) {
        tracing::trace!("Bundle set filter: {:?}", filter);
        self.filter = filter;
    }

    fn totals(&self) -> Summary {
        let samples = self.aggregator.samples(self.visible());
        Summary::from_samples(&samples, self.aggregator.method())
    }

    fn breakdown(&self, rule: &CategoryRule) -> Aggregation {
        self.aggregator.clone().with_rule(rule.clone()).summarize(self.visible())
    }

    fn histogram(&self, edges: &[f64]) -> Histogram {
        Histogram::from_samples(&self.aggregator.samples(self.visible()), edges)
    }

    fn attribute_values(&self, name: &str) -> Vec<String> {
        let mut values: Vec<String> = Vec::new();
        for value in self.visible().filter_map(|b| b.attribute(name)) {
            if !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        }
        values
    }
}
