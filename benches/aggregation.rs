//! Aggregation throughput benchmark
//!
//! Measures the full bundle pipeline (extraction, ceiling, normalization,
//! grouping, weighted percentiles, ranking) over synthetic bundle sets.
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench aggregation
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use readytime::aggregate::{AggregationConfig, BundleAggregator, CategoryRule};
use readytime::bundle::{Event, EventBundle};
use readytime::normalize::normalize_source;
use readytime::stats::PercentileMethod;

const SOURCES: &[&str] = &[
    "https://www.google.com/",
    "https://www.google.com",
    "https://bing.com/search/",
    "android-app://com.slack/#",
    "https://duckduckgo.com/?q=forms",
    "direct",
];

const DEVICES: &[&str] = &["Android", "iOS", "Windows", "macOS"];

/// Deterministic synthetic bundles with a few outliers
fn synthetic_bundles(n: usize) -> Vec<EventBundle> {
    (0..n)
        .map(|i| {
            let ms = if i % 97 == 0 {
                250_000.0
            } else {
                ((i * 7919) % 6000) as f64 + 150.0
            };
            EventBundle::new(vec![
                Event::new("enter", SOURCES[i % SOURCES.len()], 0.0),
                Event::new("click", ".nav", 40.0),
                Event::new("viewblock", ".form", ms),
            ])
            .with_weight(((i % 3) + 1) as f64 * 10.0)
            .with_attribute("deviceType", DEVICES[i % DEVICES.len()])
        })
        .collect()
}

fn bench_summarize(c: &mut Criterion) {
    let mut group = c.benchmark_group("summarize");

    for &n in &[1_000usize, 10_000, 100_000] {
        let bundles = synthetic_bundles(n);
        group.throughput(Throughput::Elements(n as u64));

        for method in [PercentileMethod::WeightedRank, PercentileMethod::Interpolated] {
            let config = AggregationConfig {
                percentile_method: method,
                ..AggregationConfig::default()
            };
            let aggregator = BundleAggregator::new(&config).unwrap();

            group.bench_with_input(
                BenchmarkId::new(method.to_string(), n),
                &bundles,
                |b, bundles| b.iter(|| aggregator.summarize(black_box(bundles))),
            );
        }
    }

    group.finish();
}

fn bench_by_device(c: &mut Criterion) {
    let bundles = synthetic_bundles(10_000);
    let aggregator = BundleAggregator::new(&AggregationConfig::default())
        .unwrap()
        .with_rule(CategoryRule::Attribute("deviceType".to_string()));

    c.bench_function("summarize_by_device_10k", |b| {
        b.iter(|| aggregator.summarize(black_box(&bundles)))
    });
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_source", |b| {
        b.iter(|| {
            for source in SOURCES {
                black_box(normalize_source(black_box(source)));
            }
        })
    });
}

criterion_group!(benches, bench_summarize, bench_by_device, bench_normalize);
criterion_main!(benches);
