//! Build metrics for Stockyard.
//!
//! Metrics are recorded through the `metrics` facade. The library never
//! installs a recorder; without one every call below is a no-op. Test suites
//! that want the numbers install any `metrics` recorder before building.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `stockyard_builds_total` | Counter | `factory`, `outcome` | Completed builds |
//! | `stockyard_build_duration_seconds` | Histogram | `factory` | Build latency |
//! | `stockyard_definitions_total` | Counter | - | Factories defined |
//!
//! `outcome` is `ok` or the snake_case error kind of a failed build.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Name of the build counter.
pub const BUILDS_TOTAL: &str = "stockyard_builds_total";

/// Name of the build latency histogram.
pub const BUILD_DURATION_SECONDS: &str = "stockyard_build_duration_seconds";

/// Name of the definition counter.
pub const DEFINITIONS_TOTAL: &str = "stockyard_definitions_total";

/// Registers descriptions for all standard metrics.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(BUILDS_TOTAL, "Total number of factory builds by outcome");
    describe_histogram!(BUILD_DURATION_SECONDS, "Factory build duration in seconds");
    describe_counter!(DEFINITIONS_TOTAL, "Total number of factories defined");
}

/// Records a completed build.
///
/// Updates the following metrics:
/// - `stockyard_builds_total` (incremented)
/// - `stockyard_build_duration_seconds` (histogram observation)
///
/// # Arguments
///
/// * `factory` - The factory name
/// * `outcome` - `ok`, or the error kind of a failed build
/// * `duration` - Build duration, nested builds included
pub fn record_build(factory: &str, outcome: &'static str, duration: Duration) {
    counter!(
        BUILDS_TOTAL,
        "factory" => factory.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(
        BUILD_DURATION_SECONDS,
        "factory" => factory.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a factory definition.
pub fn record_definition() {
    counter!(DEFINITIONS_TOTAL).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(BUILDS_TOTAL.starts_with("stockyard_"));
        assert!(BUILD_DURATION_SECONDS.ends_with("_seconds"));
    }

    #[test]
    fn test_record_functions_dont_panic() {
        // No recorder is installed; the facade drops everything.
        describe_metrics();
        record_build("user", "ok", Duration::from_millis(3));
        record_build("ghost", "undefined_factory", Duration::ZERO);
        record_definition();
    }
}
