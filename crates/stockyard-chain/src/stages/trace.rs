//! Build tracing stage.
//!
//! Emits one `tracing` event per build it wraps, after the inner stages and
//! the recipe have run:
//!
//! - `factory` - Name of the factory built
//! - `depth` - Nesting depth of the build (0 for top-level builds)
//! - `product_kind` - Shape of the product (`map`, `record`, `value`)
//! - `duration_ms` - Time spent in the inner stages and the recipe
//!
//! Failed builds emit the same event at `WARN` with the error attached.
//! The error itself is returned unchanged.

use crate::stage::{Next, Stage};
use std::time::Instant;
use stockyard_core::{BuildContext, BuildResult, Product};

/// Stage that logs every build.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceStage {
    /// Also log the override keys.
    verbose: bool,
}

impl TraceStage {
    /// Creates a trace stage.
    #[must_use]
    pub const fn new() -> Self {
        Self { verbose: false }
    }

    /// Enables logging of override keys.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Stage for TraceStage {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn process(&self, ctx: &BuildContext<'_>, next: Next<'_>) -> BuildResult<Product> {
        let start = Instant::now();
        let result = next.run(ctx);
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(product) if self.verbose => {
                let keys: Vec<&str> = ctx.overrides().keys().map(String::as_str).collect();
                tracing::debug!(
                    factory = ctx.factory_name(),
                    depth = ctx.depth(),
                    product_kind = product.kind().as_str(),
                    overrides = ?keys,
                    duration_ms,
                    "factory built"
                );
            }
            Ok(product) => {
                tracing::debug!(
                    factory = ctx.factory_name(),
                    depth = ctx.depth(),
                    product_kind = product.kind().as_str(),
                    duration_ms,
                    "factory built"
                );
            }
            Err(error) => {
                tracing::warn!(
                    factory = ctx.factory_name(),
                    depth = ctx.depth(),
                    error = %error,
                    duration_ms,
                    "factory build failed"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use stockyard_core::{fields, BuildError, BuildScope, Factory, FactoryOptions, Fields};

    struct NoScope;

    impl BuildScope for NoScope {
        fn build_nested(
            &self,
            _parent: &BuildContext<'_>,
            name: &str,
            _overrides: Fields,
        ) -> BuildResult<Product> {
            Err(BuildError::undefined(name))
        }
    }

    #[test]
    fn test_trace_passes_product_through() {
        let factory = Arc::new(Factory::new("org", FactoryOptions::new(), |_| {
            Ok(fields! { "name" => "Foo" }.into())
        }));
        let ctx = BuildContext::new(&NoScope, factory, fields! { "name" => "Bar" });
        let stage = TraceStage::new().verbose(true);

        let product = Next::new(&stage, Next::factory()).run(&ctx).unwrap();
        assert_eq!(product.get("name").and_then(Product::as_str), Some("Foo"));
    }

    #[test]
    fn test_trace_passes_error_through() {
        let factory = Arc::new(Factory::new("org", FactoryOptions::new(), |ctx| {
            ctx.build("missing")
        }));
        let ctx = BuildContext::new(&NoScope, factory, Fields::new());

        let err = Next::new(&TraceStage::new(), Next::factory())
            .run(&ctx)
            .unwrap_err();
        assert_eq!(err.factory_name(), Some("missing"));
    }
}
