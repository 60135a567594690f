//! The process-wide default registry.
//!
//! Constructed lazily on first use from `STOCKYARD__*` environment
//! variables (see [`stockyard_config::ConfigLoader`]). Each section is
//! validated on its own: an invalid logging section only skips logging, and
//! an invalid registry section is logged and replaced by defaults, since
//! there is no caller to return an error to.

use crate::registry::Registry;
use std::sync::OnceLock;
use stockyard_config::{ConfigLoader, LoggingSettings};
use stockyard_telemetry::{init_logging, LogConfig};

/// Environment prefix of the default registry's configuration.
pub const ENV_PREFIX: &str = "STOCKYARD";

static DEFAULT: OnceLock<Registry> = OnceLock::new();

/// Returns the process-wide registry.
///
/// ```
/// use stockyard::global;
///
/// assert!(std::ptr::eq(global::registry(), global::registry()));
/// ```
pub fn registry() -> &'static Registry {
    DEFAULT.get_or_init(|| from_env(ENV_PREFIX))
}

/// Creates a registry from `PREFIX__*` environment variables.
///
/// When the logging section is enabled, a subscriber is installed from it
/// on a best-effort basis.
pub fn from_env(prefix: &str) -> Registry {
    let config = match ConfigLoader::new().with_env_prefix(prefix).resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(prefix, error = %e, "unreadable registry configuration, using defaults");
            return Registry::new();
        }
    };

    apply_logging(&config.logging);

    match config.registry.validate() {
        Ok(()) => Registry::from_settings(&config.registry),
        Err(e) => {
            tracing::warn!(prefix, error = %e, "invalid registry configuration, using defaults");
            Registry::new()
        }
    }
}

fn apply_logging(settings: &LoggingSettings) {
    if !settings.enabled {
        return;
    }

    if let Err(e) = settings.validate() {
        tracing::warn!(error = %e, "invalid logging configuration, subscriber not installed");
        return;
    }

    if let Err(e) = init_logging(&LogConfig::from(settings)) {
        tracing::debug!(error = %e, "subscriber already installed, logging section ignored");
    }
}

/// Resets the process-wide registry.
///
/// Tests sharing the default registry should call this in their setup.
pub fn reset() {
    registry().reset();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_registry_section_survives_bad_logging_section() {
        env::set_var("SYTEST_GLOBAL_LOG__REGISTRY__MAX_BUILD_DEPTH", "3");
        env::set_var("SYTEST_GLOBAL_LOG__LOGGING__ENABLED", "true");
        env::set_var("SYTEST_GLOBAL_LOG__LOGGING__LEVEL", "stockyard=loudest");

        let registry = from_env("SYTEST_GLOBAL_LOG");
        assert_eq!(registry.max_depth(), 3);
    }

    #[test]
    fn test_invalid_registry_section_falls_back() {
        env::set_var("SYTEST_GLOBAL_ZERO__REGISTRY__NAME", "billing");
        env::set_var("SYTEST_GLOBAL_ZERO__REGISTRY__MAX_BUILD_DEPTH", "0");

        let registry = from_env("SYTEST_GLOBAL_ZERO");
        assert_eq!(registry.name(), "default");
        assert_eq!(registry.max_depth(), 64);
    }

    #[test]
    fn test_unparsable_env_falls_back() {
        env::set_var("SYTEST_GLOBAL_BAD__REGISTRY__MAX_BUILD_DEPTH", "deep");

        assert_eq!(from_env("SYTEST_GLOBAL_BAD").max_depth(), 64);
    }

    #[test]
    fn test_settings_applied() {
        env::set_var("SYTEST_GLOBAL_OK__REGISTRY__NAME", "billing");
        env::set_var("SYTEST_GLOBAL_OK__REGISTRY__TRACE_BUILDS", "true");

        let registry = from_env("SYTEST_GLOBAL_OK");
        assert_eq!(registry.name(), "billing");
    }
}
