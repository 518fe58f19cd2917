#![no_main]

use libfuzzer_sys::fuzz_target;
use readytime::aggregate::{AggregationConfig, BundleAggregator};
use readytime::bundle::parse_bundles;
use readytime::normalize::normalize_source;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Normalization is total: any string is a valid source
        let _ = normalize_source(input);

        // Parsing may fail, but aggregating whatever parsed must not panic
        if let Ok(bundles) = parse_bundles(input) {
            if let Ok(aggregator) = BundleAggregator::new(&AggregationConfig::default()) {
                let _ = aggregator.summarize(&bundles);
            }
        }
    }
});
