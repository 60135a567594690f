//! The factory registry.
//!
//! A [`Registry`] owns a set of named factories and the build chain applied
//! to them. `define` and `build` are its two entry points; everything else
//! is introspection or configuration.
//!
//! # Locking
//!
//! State lives behind a single `RwLock`. A build takes the read lock only
//! long enough to clone the factory handle and the normalized chain, so the
//! chain and the recipe run unlocked and may call back into the registry.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use stockyard_chain::{BuildChain, StageRef};
use stockyard_config::{RegistrySettings, StockyardConfig};
use stockyard_core::{
    BuildContext, BuildError, BuildResult, BuildScope, Factory, FactoryOptions, Fields, Product,
};
use stockyard_telemetry::metrics::{record_build, record_definition};

/// Definitions and chain, guarded together so `reset` is atomic.
struct RegistryState {
    factories: HashMap<String, Arc<Factory>>,
    chain: BuildChain,
}

impl RegistryState {
    fn new() -> Self {
        Self {
            factories: HashMap::new(),
            chain: BuildChain::new(),
        }
    }
}

/// A namespace of factory definitions.
///
/// # Example
///
/// ```
/// use stockyard::{fields, Product, Registry};
///
/// let registry = Registry::new();
/// registry.define("user", |_| Ok(fields! { "email" => "a@b.com" })).unwrap();
///
/// let user = registry.build("user").unwrap();
/// assert_eq!(user.get("email").and_then(Product::as_str), Some("a@b.com"));
///
/// let user = registry
///     .build_with("user", fields! { "email" => "c@d.com" })
///     .unwrap();
/// assert_eq!(user.get("email").and_then(Product::as_str), Some("c@d.com"));
/// ```
pub struct Registry {
    name: String,
    max_depth: usize,
    trace_builds: bool,
    state: RwLock<RegistryState>,
}

impl Registry {
    /// Creates an empty registry with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::from_settings(&RegistrySettings::default())
    }

    /// Creates an empty registry with the given namespace name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::from_settings(&RegistrySettings {
            name: name.into(),
            ..RegistrySettings::default()
        })
    }

    /// Creates an empty registry from loaded configuration.
    #[must_use]
    pub fn from_config(config: &StockyardConfig) -> Self {
        Self::from_settings(&config.registry)
    }

    /// Creates an empty registry from registry settings.
    ///
    /// A `max_build_depth` of 0 is raised to 1, so one level of nested
    /// builds is always allowed.
    #[must_use]
    pub fn from_settings(settings: &RegistrySettings) -> Self {
        Self {
            name: settings.name.clone(),
            max_depth: settings.max_build_depth.max(1),
            trace_builds: settings.trace_builds,
            state: RwLock::new(RegistryState::new()),
        }
    }

    /// Returns the namespace name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the maximum nesting depth of builds started from recipes.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Defines a factory.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::DuplicateFactory`] if `name` is already defined;
    /// the existing definition is left untouched.
    #[track_caller]
    pub fn define<F, P>(&self, name: &str, recipe: F) -> BuildResult<Arc<Factory>>
    where
        F: Fn(&BuildContext<'_>) -> BuildResult<P> + Send + Sync + 'static,
        P: Into<Product>,
    {
        self.define_with(name, FactoryOptions::new(), recipe)
    }

    /// Defines a factory with options.
    ///
    /// Options are never read by the built-in stages; custom stages use them,
    /// for example to pick a target type.
    #[track_caller]
    pub fn define_with<F, P>(
        &self,
        name: &str,
        options: FactoryOptions,
        recipe: F,
    ) -> BuildResult<Arc<Factory>>
    where
        F: Fn(&BuildContext<'_>) -> BuildResult<P> + Send + Sync + 'static,
        P: Into<Product>,
    {
        let factory = Factory::new(name, options, move |ctx| recipe(ctx).map(Into::into));
        self.insert(factory)
    }

    /// Defines a factory whose recipe produces an empty mapping.
    #[track_caller]
    pub fn define_blank(&self, name: &str, options: FactoryOptions) -> BuildResult<Arc<Factory>> {
        self.insert(Factory::blank(name, options))
    }

    fn insert(&self, factory: Factory) -> BuildResult<Arc<Factory>> {
        let mut state = self.state.write();

        if state.factories.contains_key(factory.name()) {
            tracing::debug!(
                registry = %self.name,
                factory = factory.name(),
                "rejected duplicate factory"
            );
            return Err(BuildError::duplicate(factory.name()));
        }

        let factory = Arc::new(factory);
        state
            .factories
            .insert(factory.name().to_string(), Arc::clone(&factory));
        drop(state);

        record_definition();
        tracing::debug!(
            registry = %self.name,
            factory = factory.name(),
            defined_at = %factory.defined_at(),
            "factory defined"
        );
        Ok(factory)
    }

    /// Builds a factory without overrides.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UndefinedFactory`] if `name` is not defined.
    /// Errors raised by the recipe or any stage are returned unchanged.
    pub fn build(&self, name: &str) -> BuildResult<Product> {
        self.build_with(name, Fields::new())
    }

    /// Builds a factory with overrides.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UndefinedFactory`] if `name` is not defined.
    /// Errors raised by the recipe or any stage are returned unchanged.
    pub fn build_with(&self, name: &str, overrides: Fields) -> BuildResult<Product> {
        let (factory, stages) = self.resolve(name)?;
        let ctx = BuildContext::new(self, factory, overrides);
        self.run(&ctx, &stages)
    }

    /// Looks up the factory and snapshots the normalized chain.
    fn resolve(&self, name: &str) -> BuildResult<(Arc<Factory>, Vec<StageRef>)> {
        let resolved = {
            let state = self.state.read();
            state
                .factories
                .get(name)
                .cloned()
                .map(|factory| (factory, state.chain.normalized()))
        };

        resolved.ok_or_else(|| {
            let err = BuildError::undefined(name);
            record_build(name, err.kind().as_str(), Duration::ZERO);
            err
        })
    }

    fn run(&self, ctx: &BuildContext<'_>, stages: &[StageRef]) -> BuildResult<Product> {
        let span = tracing::debug_span!(
            "build",
            registry = %self.name,
            factory = ctx.factory_name(),
            depth = ctx.depth()
        );
        let _guard = span.enter();

        let start = Instant::now();
        let result = BuildChain::compose(stages).run(ctx);
        let elapsed = start.elapsed();

        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => err.kind().as_str(),
        };
        record_build(ctx.factory_name(), outcome, elapsed);

        if self.trace_builds {
            tracing::info!(
                factory = ctx.factory_name(),
                outcome,
                duration_ms = elapsed.as_secs_f64() * 1000.0,
                "build finished"
            );
        }

        result
    }

    /// Returns the definition of a factory.
    #[must_use]
    pub fn factory(&self, name: &str) -> Option<Arc<Factory>> {
        self.state.read().factories.get(name).cloned()
    }

    /// Returns the names of all defined factories, sorted.
    #[must_use]
    pub fn factories(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().factories.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Checks if a factory is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.state.read().factories.contains_key(name)
    }

    /// Returns the number of defined factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().factories.len()
    }

    /// Returns `true` if no factories are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().factories.is_empty()
    }

    /// Returns the names of the normalized build chain, outermost first.
    #[must_use]
    pub fn build_chain(&self) -> Vec<&'static str> {
        self.state.read().chain.stage_names()
    }

    /// Replaces the build chain.
    ///
    /// The chain is normalized on every build, so it may list the merge
    /// stage anywhere, or not at all.
    pub fn set_build_chain(&self, chain: BuildChain) {
        let names: Vec<&str> = chain.stages().iter().map(|stage| stage.name()).collect();
        tracing::debug!(registry = %self.name, stages = ?names, "build chain replaced");
        self.state.write().chain = chain;
    }

    /// Mutates the stored build chain in place.
    ///
    /// The write lock is held while `f` runs; `f` must not call back into
    /// this registry.
    ///
    /// ```
    /// use stockyard::{Registry, TraceStage};
    ///
    /// let registry = Registry::new();
    /// registry.with_build_chain(|chain| {
    ///     chain.push_front(TraceStage::new());
    /// });
    /// assert_eq!(registry.build_chain(), vec!["trace", "merge"]);
    /// ```
    pub fn with_build_chain<R>(&self, f: impl FnOnce(&mut BuildChain) -> R) -> R {
        f(&mut self.state.write().chain)
    }

    /// Removes every factory and restores the default build chain.
    pub fn reset(&self) {
        let mut state = self.state.write();
        let dropped = state.factories.len();
        *state = RegistryState::new();
        drop(state);

        tracing::debug!(registry = %self.name, dropped, "registry reset");
    }
}

impl BuildScope for Registry {
    fn build_nested(
        &self,
        parent: &BuildContext<'_>,
        name: &str,
        overrides: Fields,
    ) -> BuildResult<Product> {
        if parent.depth() + 1 > self.max_depth {
            let mut trail = parent.trail().to_vec();
            trail.push(parent.factory_name().to_string());
            tracing::warn!(
                registry = %self.name,
                factory = name,
                max_depth = self.max_depth,
                "nested build exceeded maximum depth"
            );
            return Err(BuildError::cyclic(name, self.max_depth, &trail));
        }

        let (factory, stages) = self.resolve(name)?;
        let ctx = BuildContext::nested(parent, factory, overrides);
        self.run(&ctx, &stages)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        let mut factories: Vec<&String> = state.factories.keys().collect();
        factories.sort_unstable();
        f.debug_struct("Registry")
            .field("name", &self.name)
            .field("max_depth", &self.max_depth)
            .field("factories", &factories)
            .field("chain", &state.chain)
            .finish_non_exhaustive()
    }
}
