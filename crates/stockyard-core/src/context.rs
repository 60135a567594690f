//! Build context types.
//!
//! A [`BuildContext`] exists for the duration of one build call. It carries
//! the factory being built, the caller's overrides, and a handle back to the
//! owning registry so recipes can build other factories (associations,
//! traits, inheritance) without relying on ambient state.

use crate::error::BuildResult;
use crate::factory::{Factory, FactoryOptions};
use crate::product::{Fields, Product};
use std::fmt;
use std::sync::Arc;

/// Capability to build named factories, implemented by the registry.
///
/// Contexts hold a `&dyn BuildScope` so recipes stay plain closures with an
/// explicit dependency on the registry that invoked them.
pub trait BuildScope: Send + Sync {
    /// Builds `name` with `overrides` as a nested build of `parent`.
    fn build_nested(
        &self,
        parent: &BuildContext<'_>,
        name: &str,
        overrides: Fields,
    ) -> BuildResult<Product>;
}

/// Context threaded through the build chain.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use stockyard_core::{fields, BuildContext, BuildResult, BuildScope, Factory, FactoryOptions, Fields, Product};
///
/// struct NoScope;
///
/// impl BuildScope for NoScope {
///     fn build_nested(&self, _: &BuildContext<'_>, name: &str, _: Fields) -> BuildResult<Product> {
///         Err(stockyard_core::BuildError::undefined(name))
///     }
/// }
///
/// let factory = Arc::new(Factory::blank("user", FactoryOptions::new()));
/// let ctx = BuildContext::new(&NoScope, factory, fields! { "email" => "c@d.com" });
///
/// assert_eq!(ctx.factory_name(), "user");
/// assert_eq!(ctx.override_value("email").and_then(Product::as_str), Some("c@d.com"));
/// assert!(ctx.build("org").is_err());
/// ```
pub struct BuildContext<'a> {
    /// Registry that owns the factory.
    scope: &'a dyn BuildScope,

    /// The factory being built.
    factory: Arc<Factory>,

    /// Caller-supplied overrides for this build.
    overrides: Fields,

    /// Number of enclosing builds.
    depth: usize,

    /// Names of the enclosing builds, outermost first.
    trail: Vec<String>,
}

impl<'a> BuildContext<'a> {
    /// Creates a context for a top-level build.
    #[must_use]
    pub fn new(scope: &'a dyn BuildScope, factory: Arc<Factory>, overrides: Fields) -> Self {
        Self {
            scope,
            factory,
            overrides,
            depth: 0,
            trail: Vec::new(),
        }
    }

    /// Creates a context for a build started from within `parent`'s recipe.
    #[must_use]
    pub fn nested(parent: &BuildContext<'a>, factory: Arc<Factory>, overrides: Fields) -> Self {
        let mut trail = parent.trail.clone();
        trail.push(parent.factory.name().to_string());
        Self {
            scope: parent.scope,
            factory,
            overrides,
            depth: parent.depth + 1,
            trail,
        }
    }

    /// Returns the factory being built.
    #[must_use]
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Returns the name of the factory being built.
    #[must_use]
    pub fn factory_name(&self) -> &str {
        self.factory.name()
    }

    /// Returns the options of the factory being built.
    #[must_use]
    pub fn options(&self) -> &FactoryOptions {
        self.factory.options()
    }

    /// Returns the caller's overrides.
    #[must_use]
    pub const fn overrides(&self) -> &Fields {
        &self.overrides
    }

    /// Returns `true` if the caller supplied any overrides.
    #[must_use]
    pub fn has_overrides(&self) -> bool {
        !self.overrides.is_empty()
    }

    /// Returns a single override.
    ///
    /// Recipes can use this to derive dependent defaults, e.g. an email from
    /// an overridden name.
    #[must_use]
    pub fn override_value(&self, key: &str) -> Option<&Product> {
        self.overrides.get(key)
    }

    /// Returns the nesting depth (0 for a top-level build).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the names of the enclosing builds, outermost first.
    #[must_use]
    pub fn trail(&self) -> &[String] {
        &self.trail
    }

    /// Builds another factory of the same registry.
    pub fn build(&self, name: &str) -> BuildResult<Product> {
        self.scope.build_nested(self, name, Fields::new())
    }

    /// Builds another factory of the same registry with overrides.
    pub fn build_with(&self, name: &str, overrides: Fields) -> BuildResult<Product> {
        self.scope.build_nested(self, name, overrides)
    }
}

impl fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("factory", &self.factory.name())
            .field("overrides", &self.overrides)
            .field("depth", &self.depth)
            .field("trail", &self.trail)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fields, BuildError};
    use std::collections::HashMap;

    /// Scope that builds from a fixed table of factories.
    struct TableScope {
        factories: HashMap<String, Arc<Factory>>,
    }

    impl BuildScope for TableScope {
        fn build_nested(
            &self,
            parent: &BuildContext<'_>,
            name: &str,
            overrides: Fields,
        ) -> BuildResult<Product> {
            let factory = self
                .factories
                .get(name)
                .cloned()
                .ok_or_else(|| BuildError::undefined(name))?;
            let ctx = BuildContext::nested(parent, factory.clone(), overrides);
            factory.invoke(&ctx)
        }
    }

    fn scope() -> TableScope {
        let mut factories = HashMap::new();
        factories.insert(
            "org".to_string(),
            Arc::new(Factory::new("org", FactoryOptions::new(), |ctx| {
                Ok(fields! {
                    "name" => "Foo",
                    "depth" => ctx.depth() as u64,
                    "trail" => ctx.trail().join("/"),
                }
                .into())
            })),
        );
        TableScope { factories }
    }

    #[test]
    fn test_new_context_is_top_level() {
        let scope = scope();
        let factory = Arc::new(Factory::blank("license", FactoryOptions::new()));
        let ctx = BuildContext::new(&scope, factory, Fields::new());
        assert_eq!(ctx.depth(), 0);
        assert!(ctx.trail().is_empty());
        assert!(!ctx.has_overrides());
    }

    #[test]
    fn test_nested_build_tracks_depth_and_trail() {
        let scope = scope();
        let factory = Arc::new(Factory::blank("license", FactoryOptions::new()));
        let ctx = BuildContext::new(&scope, factory, Fields::new());

        let org = ctx.build("org").unwrap();
        assert_eq!(org.get("name").and_then(Product::as_str), Some("Foo"));
        assert_eq!(org.get("depth").and_then(Product::as_i64), Some(1));
        assert_eq!(org.get("trail").and_then(Product::as_str), Some("license"));
    }

    #[test]
    fn test_nested_build_of_unknown_factory() {
        let scope = scope();
        let factory = Arc::new(Factory::blank("license", FactoryOptions::new()));
        let ctx = BuildContext::new(&scope, factory, Fields::new());
        let err = ctx.build("ghost").unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_debug_omits_scope() {
        let scope = scope();
        let factory = Arc::new(Factory::blank("license", FactoryOptions::new()));
        let ctx = BuildContext::new(&scope, factory, fields! { "seats" => 3 });
        let debug = format!("{ctx:?}");
        assert!(debug.contains("license"));
        assert!(debug.contains("seats"));
    }
}
