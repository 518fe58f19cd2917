//! CSV output format for category breakdowns
//!
//! One row per ranked category, slowest first. Times are seconds with
//! millisecond precision. A `NoData` breakdown yields the header only.

use crate::aggregate::{Aggregation, CategoryStats};

/// CSV formatter for a ranked breakdown
#[derive(Debug, Default)]
pub struct CsvOutput {
    rows: Vec<CategoryStats>,
}

impl CsvOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the rows of a breakdown
    pub fn from_aggregation(aggregation: &Aggregation) -> Self {
        Self {
            rows: aggregation.categories().to_vec(),
        }
    }

    pub fn add_row(&mut self, stats: CategoryStats) {
        self.rows.push(stats);
    }

    fn header() -> &'static str {
        "category,p50,p75,min,samples,weight"
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    fn format_row(stats: &CategoryStats) -> String {
        format!(
            "{},{:.3},{:.3},{:.3},{},{}",
            Self::escape_field(&stats.category),
            stats.p50,
            stats.p75,
            stats.min,
            stats.samples,
            stats.weight
        )
    }

    /// Generate CSV output as string
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str(Self::header());
        output.push('\n');

        for stats in &self.rows {
            output.push_str(&Self::format_row(stats));
            output.push('\n');
        }

        output
    }
}
