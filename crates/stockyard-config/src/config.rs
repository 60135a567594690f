//! Main configuration types.
//!
//! This module provides the top-level [`StockyardConfig`] struct and its builder.

use serde::{Deserialize, Serialize};
use stockyard_telemetry::{LogConfig, LogFormat};

use crate::{ConfigError, LoggingSettings, RegistrySettings};

/// Complete Stockyard configuration.
///
/// This is the root configuration type that contains all configuration sections.
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use stockyard_config::StockyardConfig;
///
/// let config = StockyardConfig::default();
/// assert_eq!(config.registry.max_build_depth, 64);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct StockyardConfig {
    /// Registry configuration.
    #[serde(default)]
    pub registry: RegistrySettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl StockyardConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use stockyard_config::{RegistrySettings, StockyardConfig};
    ///
    /// let config = StockyardConfig::builder()
    ///     .registry(RegistrySettings {
    ///         max_build_depth: 8,
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert_eq!(config.registry.max_build_depth, 8);
    /// ```
    #[must_use]
    pub fn builder() -> StockyardConfigBuilder {
        StockyardConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The registry name is empty
    /// - The maximum build depth is zero
    /// - Logging is enabled and its level is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.registry.validate()?;
        self.logging.validate()
    }

    /// Returns the logging section as a telemetry [`LogConfig`].
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig::from(&self.logging)
    }

    /// Create a development configuration preset.
    ///
    /// This preset is meant for working on a test suite locally:
    /// - Pretty log formatting with source locations
    /// - Debug log level for Stockyard crates
    /// - Every build logged at `INFO`
    ///
    /// # Example
    ///
    /// ```
    /// use stockyard_config::StockyardConfig;
    ///
    /// let config = StockyardConfig::development();
    /// assert!(config.registry.trace_builds);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.enabled = true;
        config.logging.level = "stockyard=debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;

        config.registry.trace_builds = true;

        config
    }

    /// Create a CI configuration preset.
    ///
    /// This preset keeps CI logs machine-readable:
    /// - JSON log formatting
    /// - Info log level
    /// - A tighter build depth limit, so runaway recursion fails fast
    ///
    /// # Example
    ///
    /// ```
    /// use stockyard_config::StockyardConfig;
    ///
    /// let config = StockyardConfig::ci();
    /// assert_eq!(config.logging.format, stockyard_telemetry::LogFormat::Json);
    /// ```
    #[must_use]
    pub fn ci() -> Self {
        let mut config = Self::default();

        config.logging.enabled = true;
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;

        config.registry.max_build_depth = 32;

        config
    }
}

/// Builder for [`StockyardConfig`].
#[derive(Debug, Default)]
pub struct StockyardConfigBuilder {
    registry: Option<RegistrySettings>,
    logging: Option<LoggingSettings>,
}

impl StockyardConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the registry configuration.
    #[must_use]
    pub fn registry(mut self, registry: RegistrySettings) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingSettings) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> StockyardConfig {
        StockyardConfig {
            registry: self.registry.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }
}
