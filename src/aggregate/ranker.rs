// Category ordering for presentation: slowest first

use crate::aggregate::summary::CategoryStats;
use serde::{Deserialize, Serialize};

/// Statistic used to order categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankKey {
    #[default]
    P50,
    P75,
    Min,
}

impl RankKey {
    fn value(self, stats: &CategoryStats) -> f64 {
        match self {
            RankKey::P50 => stats.p50,
            RankKey::P75 => stats.p75,
            RankKey::Min => stats.min,
        }
    }
}

/// Order categories by `key`, descending
///
/// The sort is stable: categories with equal values keep the order they had
/// in the aggregation pass.
pub fn rank_categories(mut stats: Vec<CategoryStats>, key: RankKey) -> Vec<CategoryStats> {
    stats.sort_by(|a, b| key.value(b).total_cmp(&key.value(a)));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(category: &str, p50: f64, p75: f64) -> CategoryStats {
        CategoryStats {
            category: category.to_string(),
            p50,
            p75,
            min: 0.0,
            samples: 1,
            weight: 1.0,
        }
    }

    #[test]
    fn test_descending_by_p50() {
        let ranked = rank_categories(
            vec![stats("a", 1.0, 2.0), stats("b", 3.0, 3.5), stats("c", 2.0, 9.0)],
            RankKey::P50,
        );
        let order: Vec<_> = ranked.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_descending_by_p75() {
        let ranked = rank_categories(
            vec![stats("a", 1.0, 2.0), stats("b", 3.0, 3.5), stats("c", 2.0, 9.0)],
            RankKey::P75,
        );
        assert_eq!(ranked[0].category, "c");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ranked = rank_categories(
            vec![
                stats("first", 2.0, 1.0),
                stats("slow", 5.0, 1.0),
                stats("second", 2.0, 9.0),
                stats("third", 2.0, 4.0),
            ],
            RankKey::P50,
        );
        let order: Vec<_> = ranked.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(order, vec!["slow", "first", "second", "third"]);
    }

    #[test]
    fn test_empty() {
        assert!(rank_categories(vec![], RankKey::P50).is_empty());
    }
}
