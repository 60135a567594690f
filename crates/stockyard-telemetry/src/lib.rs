//! Observability for Stockyard.
//!
//! This crate provides the logging and metrics plumbing shared by the
//! Stockyard crates:
//!
//! - **Logging**: `tracing` subscribers with pretty, compact, or JSON output
//! - **Metrics**: build counters and latencies via the `metrics` facade
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `stockyard_builds_total` | Counter | `factory`, `outcome` | Completed builds |
//! | `stockyard_build_duration_seconds` | Histogram | `factory` | Build latency |
//! | `stockyard_definitions_total` | Counter | - | Factories defined |
//!
//! # Example
//!
//! ```rust,ignore
//! use stockyard_telemetry::{init_logging, LogConfig};
//!
//! fn main() {
//!     init_logging(&LogConfig::ci()).expect("Failed to init logging");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/stockyard-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, init_test_logging, LogConfig, LogFormat};
pub use metrics::{describe_metrics, record_build, record_definition};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
