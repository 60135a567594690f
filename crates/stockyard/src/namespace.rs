//! Delegation of `define` and `build` to a registry.
//!
//! Any type can act as a namespace by implementing [`Namespace`]. The
//! default [`registry`](Namespace::registry) is the process-wide one, so an
//! empty impl is enough to share fixtures across a test suite:
//!
//! ```
//! use stockyard::{fields, Namespace, Registry};
//!
//! struct BillingFixtures {
//!     registry: Registry,
//! }
//!
//! impl Namespace for BillingFixtures {
//!     fn registry(&self) -> &Registry {
//!         &self.registry
//!     }
//! }
//!
//! let billing = BillingFixtures { registry: Registry::named("billing") };
//! billing.define("invoice", |_| Ok(fields! { "total" => 100 })).unwrap();
//! assert!(billing.build("invoice").is_ok());
//! ```

use crate::global;
use crate::registry::Registry;
use std::sync::Arc;
use stockyard_chain::BuildChain;
use stockyard_core::{BuildContext, BuildResult, Factory, FactoryOptions, Fields, Product};

/// Owner of a registry.
pub trait Namespace {
    /// Returns the registry this namespace delegates to.
    ///
    /// Defaults to the process-wide registry.
    fn registry(&self) -> &Registry {
        global::registry()
    }

    /// Defines a factory in this namespace.
    #[track_caller]
    fn define<F, P>(&self, name: &str, recipe: F) -> BuildResult<Arc<Factory>>
    where
        F: Fn(&BuildContext<'_>) -> BuildResult<P> + Send + Sync + 'static,
        P: Into<Product>,
    {
        self.registry().define(name, recipe)
    }

    /// Defines a factory with options in this namespace.
    #[track_caller]
    fn define_with<F, P>(
        &self,
        name: &str,
        options: FactoryOptions,
        recipe: F,
    ) -> BuildResult<Arc<Factory>>
    where
        F: Fn(&BuildContext<'_>) -> BuildResult<P> + Send + Sync + 'static,
        P: Into<Product>,
    {
        self.registry().define_with(name, options, recipe)
    }

    /// Builds a factory of this namespace.
    fn build(&self, name: &str) -> BuildResult<Product> {
        self.registry().build(name)
    }

    /// Builds a factory of this namespace with overrides.
    fn build_with(&self, name: &str, overrides: Fields) -> BuildResult<Product> {
        self.registry().build_with(name, overrides)
    }

    /// Replaces the build chain of this namespace.
    fn set_build_chain(&self, chain: BuildChain) {
        self.registry().set_build_chain(chain);
    }

    /// Clears every definition of this namespace.
    fn reset_registry(&self) {
        self.registry().reset();
    }
}

impl Namespace for Registry {
    fn registry(&self) -> &Registry {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockyard_core::fields;

    struct Scratch {
        registry: Registry,
    }

    impl Namespace for Scratch {
        fn registry(&self) -> &Registry {
            &self.registry
        }
    }

    #[test]
    fn test_namespace_delegates_to_its_registry() {
        let scratch = Scratch {
            registry: Registry::named("scratch"),
        };
        scratch
            .define("user", |_| Ok(fields! { "email" => "a@b.com" }))
            .unwrap();

        assert!(scratch.registry.contains("user"));
        let user = scratch
            .build_with("user", fields! { "email" => "c@d.com" })
            .unwrap();
        assert_eq!(user.get("email").and_then(Product::as_str), Some("c@d.com"));

        scratch.reset_registry();
        assert!(scratch.registry.is_empty());
    }

    #[test]
    fn test_registry_is_its_own_namespace() {
        let registry = Registry::new();
        Namespace::define(&registry, "org", |_| Ok(fields! { "name" => "Foo" })).unwrap();
        assert!(Namespace::build(&registry, "org").is_ok());
        assert!(std::ptr::eq(Namespace::registry(&registry), &registry));
    }
}
