//! readytime - engagement readiness time from RUM event bundles
//!
//! Each bundle is one sampled page session. The time until the first form
//! became visible is extracted per bundle, outliers above a ceiling are
//! dropped, and the remaining weighted samples are summarized per category
//! (normalized entry source, device type, or any bundle attribute) as
//! p50/p75 percentiles, ranked slowest first.

pub mod aggregate;
pub mod bundle;
pub mod cli;
pub mod csv_output;
pub mod facet;
pub mod filter;
pub mod json_output;
pub mod metric;
pub mod normalize;
pub mod outlier;
pub mod stats;
pub mod text_output;
pub mod view;
