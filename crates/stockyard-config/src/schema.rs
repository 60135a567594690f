//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use stockyard_telemetry::logging::create_env_filter;
use stockyard_telemetry::{LogConfig, LogFormat};

/// Registry configuration section.
///
/// Applies to registries created from configuration, including the
/// process-wide default registry.
///
/// # Example
///
/// ```
/// use stockyard_config::RegistrySettings;
///
/// let settings = RegistrySettings {
///     name: "billing".to_string(),
///     max_build_depth: 16,
///     trace_builds: true,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RegistrySettings {
    /// Namespace name, used in logs.
    #[serde(default = "default_registry_name")]
    pub name: String,

    /// Maximum nesting of builds started from recipes.
    ///
    /// Exceeding it fails the build with a cyclic build error.
    #[serde(default = "default_max_build_depth")]
    pub max_build_depth: usize,

    /// Log every completed build at `INFO`.
    #[serde(default)]
    pub trace_builds: bool,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            name: default_registry_name(),
            max_build_depth: default_max_build_depth(),
            trace_builds: false,
        }
    }
}

impl RegistrySettings {
    /// Validates the registry section on its own.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an empty name or a zero
    /// maximum build depth.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid_value("registry.name", "must not be empty"));
        }

        if self.max_build_depth == 0 {
            return Err(ConfigError::invalid_value(
                "registry.max_build_depth",
                "must be at least 1",
            ));
        }

        Ok(())
    }
}

fn default_registry_name() -> String {
    "default".to_string()
}

const fn default_max_build_depth() -> usize {
    64
}

/// Logging configuration section.
///
/// Off unless enabled: a registry never installs a subscriber on its own
/// initiative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// Install a subscriber from this section.
    #[serde(default)]
    pub enabled: bool,

    /// Filter directives (e.g., "warn", "stockyard=debug").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Log span open/close events.
    #[serde(default)]
    pub span_events: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: default_log_level(),
            format: LogFormat::default(),
            span_events: false,
            include_location: false,
        }
    }
}

impl LoggingSettings {
    /// Validates the logging section on its own.
    ///
    /// The level is only checked when logging is enabled.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the level is not a valid
    /// filter directive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled {
            create_env_filter(&self.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }
}

impl From<&LoggingSettings> for LogConfig {
    fn from(settings: &LoggingSettings) -> Self {
        Self {
            enabled: settings.enabled,
            level: settings.level.clone(),
            format: settings.format,
            span_events: settings.span_events,
            file_line_info: settings.include_location,
            ..Self::default()
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_defaults() {
        let settings = RegistrySettings::default();
        assert_eq!(settings.name, "default");
        assert_eq!(settings.max_build_depth, 64);
        assert!(!settings.trace_builds);
    }

    #[test]
    fn test_registry_partial_toml() {
        let settings: RegistrySettings = toml::from_str("max_build_depth = 8").unwrap();
        assert_eq!(settings.max_build_depth, 8);
        assert_eq!(settings.name, "default");
    }

    #[test]
    fn test_registry_rejects_unknown_fields() {
        let result: Result<RegistrySettings, _> = toml::from_str("max_depth = 8");
        assert!(result.is_err());
    }

    #[test]
    fn test_logging_defaults() {
        let settings = LoggingSettings::default();
        assert!(!settings.enabled);
        assert_eq!(settings.level, "warn");
        assert_eq!(settings.format, LogFormat::Compact);
    }

    #[test]
    fn test_logging_format_from_json() {
        let settings: LoggingSettings = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(settings.format, LogFormat::Json);
    }

    #[test]
    fn test_logging_into_log_config() {
        let settings = LoggingSettings {
            level: "stockyard=trace".to_string(),
            include_location: true,
            ..Default::default()
        };
        let config = LogConfig::from(&settings);
        assert_eq!(config.level, "stockyard=trace");
        assert!(config.file_line_info);
        assert!(config.include_target);
    }

    #[test]
    fn test_registry_validate_alone() {
        assert!(RegistrySettings::default().validate().is_ok());

        let zero = RegistrySettings {
            max_build_depth: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_logging_level_checked_only_when_enabled() {
        let mut settings = LoggingSettings {
            level: "stockyard=loudest".to_string(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());

        settings.enabled = true;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }
}
