//! RUM bundle model and lenient JSON loading
//!
//! A bundle is one recorded page-load session: a weight plus a list of
//! timestamped checkpoint events. Upstream telemetry is loosely typed, so
//! parsing never rejects a bundle outright. A bundle whose `events` field is
//! missing or not an array is kept but marked malformed (`events == None`),
//! and the aggregation pass excludes it.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

/// A single checkpoint within a bundle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    /// Checkpoint tag (e.g., "enter", "viewblock")
    pub checkpoint: String,
    /// Payload whose meaning depends on the checkpoint
    pub source: Option<String>,
    /// Milliseconds since session start
    pub time_delta: Option<f64>,
}

impl Event {
    /// Create an event with a source and time delta
    pub fn new(checkpoint: &str, source: &str, time_delta: f64) -> Self {
        Self {
            checkpoint: checkpoint.to_string(),
            source: Some(source.to_string()),
            time_delta: Some(time_delta),
        }
    }

    /// Source payload, if present and non-empty
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref().filter(|s| !s.is_empty())
    }

    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            checkpoint: obj
                .get("checkpoint")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            source: obj
                .get("source")
                .and_then(Value::as_str)
                .map(str::to_string),
            time_delta: obj.get("timeDelta").and_then(Value::as_f64),
        })
    }
}

/// One observed page-load session
#[derive(Debug, Clone, PartialEq)]
pub struct EventBundle {
    /// Checkpoint events in input order (`None` = malformed bundle)
    pub events: Option<Vec<Event>>,
    /// Sample multiplicity (default 1.0)
    pub weight: f64,
    /// Bundle-level scalar attributes as text (e.g., "deviceType", "hour")
    pub attributes: BTreeMap<String, String>,
}

impl Default for EventBundle {
    fn default() -> Self {
        Self {
            events: Some(Vec::new()),
            weight: 1.0,
            attributes: BTreeMap::new(),
        }
    }
}

impl EventBundle {
    /// Create a well-formed bundle with unit weight
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: Some(events),
            ..Self::default()
        }
    }

    /// Set the bundle weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Set a bundle-level attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Events of a well-formed bundle, empty for a malformed one
    pub fn events(&self) -> &[Event] {
        self.events.as_deref().unwrap_or(&[])
    }

    /// Whether the bundle carried a usable `events` array
    pub fn is_malformed(&self) -> bool {
        self.events.is_none()
    }

    /// Weight usable as probability mass: non-finite or negative weights count as zero
    pub fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            0.0
        }
    }

    /// Look up a non-blank bundle attribute, trimmed
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Build a bundle from loosely-typed JSON
    ///
    /// Never fails: unknown shapes degrade to a malformed bundle.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self {
                events: None,
                ..Self::default()
            };
        };

        let events = obj
            .get("events")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Event::from_value).collect());

        let weight = match obj.get("weight") {
            None | Some(Value::Null) => 1.0,
            Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
            Some(_) => f64::NAN,
        };

        let attributes = obj
            .iter()
            .filter(|(key, _)| key.as_str() != "events" && key.as_str() != "weight")
            .filter_map(|(key, v)| scalar_text(v).map(|text| (key.clone(), text)))
            .collect();

        Self {
            events,
            weight,
            attributes,
        }
    }
}

/// JSON text of a scalar attribute value (`13`, `true`, `"iOS"`)
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for EventBundle {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Parse bundles from JSON text
///
/// Accepts either a bare array of bundles or an object carrying a
/// `rumBundles` array (the RUM bundler export shape).
pub fn parse_bundles(json: &str) -> Result<Vec<EventBundle>> {
    let value: Value = serde_json::from_str(json).context("Failed to parse bundle JSON")?;

    let items = match &value {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get("rumBundles").and_then(Value::as_array) {
            Some(items) => items,
            None => anyhow::bail!("Expected a bundle array or an object with `rumBundles`"),
        },
        _ => anyhow::bail!("Expected a bundle array or an object with `rumBundles`"),
    };

    let bundles: Vec<EventBundle> = items.iter().map(EventBundle::from_value).collect();
    let malformed = bundles.iter().filter(|b| b.is_malformed()).count();
    if malformed > 0 {
        tracing::debug!("{} of {} bundles are malformed", malformed, bundles.len());
    }
    Ok(bundles)
}

/// Load bundles from a file path, or stdin when the path is `-`
pub fn load_bundles<P: AsRef<Path>>(path: P) -> Result<Vec<EventBundle>> {
    let path = path.as_ref();
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read bundles from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read bundles file: {}", path.display()))?
    };
    parse_bundles(&content)
}
