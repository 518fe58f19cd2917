//! Entry source selection for `--source` expressions
//!
//! Restricts the bundle set to sessions that entered from selected sources.
//! Supports:
//! - Comma-separated lists: `--source https://google.com,android-app://com.slack`
//! - An empty list, which selects every bundle
//!
//! Selected sources are normalized the same way categories are, so
//! `https://a.com/` selects the `https://a.com` category.

use crate::bundle::EventBundle;
use crate::normalize::normalize_source;

/// Entry sources a bundle must have visited to be kept
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSelection {
    /// Normalized sources (empty = all bundles)
    selected: Vec<String>,
}

impl SourceSelection {
    /// Select every bundle
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse a comma-separated source list
    ///
    /// Entries are trimmed and normalized; blanks and duplicates are dropped.
    pub fn from_expr(expr: &str) -> Self {
        Self::from_sources(expr.split(','))
    }

    /// Build a selection from individual sources
    pub fn from_sources<I, T>(sources: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut selected: Vec<String> = Vec::new();
        for source in sources {
            let source = source.as_ref().trim();
            if source.is_empty() {
                continue;
            }
            let normalized = normalize_source(source);
            if !selected.contains(&normalized) {
                selected.push(normalized);
            }
        }
        Self { selected }
    }

    /// Whether no restriction applies
    pub fn is_all(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected normalized sources
    pub fn sources(&self) -> &[String] {
        &self.selected
    }

    /// Whether `bundle` entered from any selected source via `checkpoint`
    pub fn matches(&self, bundle: &EventBundle, checkpoint: &str) -> bool {
        if self.is_all() {
            return true;
        }
        bundle
            .events()
            .iter()
            .filter(|e| e.checkpoint == checkpoint)
            .filter_map(|e| e.source())
            .any(|s| self.selected.contains(&normalize_source(s)))
    }

    /// Keep only matching bundles
    pub fn apply(&self, bundles: Vec<EventBundle>, checkpoint: &str) -> Vec<EventBundle> {
        if self.is_all() {
            return bundles;
        }
        let before = bundles.len();
        let kept: Vec<EventBundle> = bundles
            .into_iter()
            .filter(|b| self.matches(b, checkpoint))
            .collect();
        tracing::debug!(
            "Source selection kept {} of {} bundles",
            kept.len(),
            before
        );
        kept
    }
}

/// Distinct normalized sources seen at `checkpoint`, sorted
pub fn available_sources(bundles: &[EventBundle], checkpoint: &str) -> Vec<String> {
    let mut sources: Vec<String> = bundles
        .iter()
        .flat_map(|b| b.events())
        .filter(|e| e.checkpoint == checkpoint)
        .filter_map(|e| e.source())
        .map(normalize_source)
        .collect();
    sources.sort();
    sources.dedup();
    sources
}
