// Bundle aggregation and weighted-percentile engine
//
// Pipeline: bundles -> metric extraction -> outlier ceiling -> category
// derivation (normalized entry sources or a bundle attribute) -> weighted
// samples per category -> percentiles -> ranking (slowest median first).
//
// The engine is a pure, total function of its inputs. Malformed bundles,
// unparseable sources and degenerate weights degrade to exclusion or zero,
// never to an error. Only configuration can be rejected.

mod aggregator;
mod config;
mod ranker;
mod summary;

pub use aggregator::{BundleAggregator, CategoryRule, CategorySamples};
pub use config::{AggregationConfig, ConfigError};
pub use ranker::{rank_categories, RankKey};
pub use summary::{summarize, Aggregation, CategoryStats, Series, SeriesSelector};
