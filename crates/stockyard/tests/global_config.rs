//! Configuration of the process-wide registry from the environment.
//!
//! A single test: the default registry reads the environment once, on
//! first use, so nothing else in this binary may touch it first.

use std::env;
use stockyard::global;

#[test]
fn test_default_registry_keeps_registry_settings_despite_bad_logging() {
    env::set_var("STOCKYARD__REGISTRY__NAME", "suite");
    env::set_var("STOCKYARD__REGISTRY__MAX_BUILD_DEPTH", "3");
    env::set_var("STOCKYARD__LOGGING__ENABLED", "true");
    env::set_var("STOCKYARD__LOGGING__LEVEL", "stockyard=loudest");

    let registry = global::registry();
    assert_eq!(registry.name(), "suite");
    assert_eq!(registry.max_depth(), 3);
}
