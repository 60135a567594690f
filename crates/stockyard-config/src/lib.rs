//! Typed configuration for Stockyard.
//!
//! This crate provides a strongly-typed configuration system with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! The configuration system is built around the [`StockyardConfig`] struct:
//!
//! - [`RegistrySettings`] - Registry name, build depth limit, build tracing
//! - [`LoggingSettings`] - Log level, format, and detail
//!
//! # Example
//!
//! ```no_run
//! use stockyard_config::{ConfigLoader, StockyardConfig};
//!
//! # fn main() -> Result<(), stockyard_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("stockyard.toml")?
//!     .with_env_prefix("STOCKYARD")
//!     .load()?;
//!
//! println!("max build depth: {}", config.registry.max_build_depth);
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variables
//!
//! Environment variables override file configuration using the format
//! `PREFIX__SECTION__KEY`:
//!
//! ```bash
//! STOCKYARD__REGISTRY__MAX_BUILD_DEPTH=16
//! STOCKYARD__REGISTRY__TRACE_BUILDS=true
//! STOCKYARD__LOGGING__ENABLED=true
//! STOCKYARD__LOGGING__LEVEL=stockyard=debug
//! STOCKYARD__LOGGING__FORMAT=json
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [registry]
//! name = "default"
//! max_build_depth = 64
//! trace_builds = false
//!
//! [logging]
//! enabled = true
//! level = "warn"
//! format = "compact"
//! ```

#![doc(html_root_url = "https://docs.rs/stockyard-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{StockyardConfig, StockyardConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{LoggingSettings, RegistrySettings};
pub use stockyard_telemetry::LogFormat;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
