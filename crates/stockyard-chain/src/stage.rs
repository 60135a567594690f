//! Core stage trait and types.
//!
//! This module defines the [`Stage`] trait that every entry of a build chain
//! implements. A stage receives the build context and a [`Next`] link to the
//! rest of the chain, invokes it to get the inner product, and may transform
//! that product before returning it.
//!
//! # Example
//!
//! ```
//! use stockyard_chain::{Next, Stage};
//! use stockyard_core::{BuildContext, BuildResult, Product};
//!
//! struct Stamp;
//!
//! impl Stage for Stamp {
//!     fn name(&self) -> &'static str {
//!         "stamp"
//!     }
//!
//!     fn process(&self, ctx: &BuildContext<'_>, next: Next<'_>) -> BuildResult<Product> {
//!         let mut product = next.run(ctx)?;
//!         if let Some(fields) = product.as_map_mut() {
//!             fields.insert("factory".to_string(), ctx.factory_name().into());
//!         }
//!         Ok(product)
//!     }
//! }
//! ```

use stockyard_core::{BuildContext, BuildResult, Product};

/// A unit of the build chain.
///
/// # Invariants
///
/// - A stage SHOULD call `next.run()` exactly once; not calling it
///   short-circuits the chain and skips the recipe
/// - A stage MUST NOT swallow errors returned by `next.run()`
/// - Stages with the same [`name`](Stage::name) are considered the same
///   stage; a chain keeps only the first of them
pub trait Stage: Send + Sync + 'static {
    /// Returns the unique name of this stage.
    ///
    /// Used for de-duplication, logging, and debugging.
    fn name(&self) -> &'static str;

    /// Processes the build through this stage.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The build context (factory and overrides)
    /// * `next` - Link to the inner stages and, finally, the factory
    ///
    /// # Returns
    ///
    /// The product, either from downstream or produced here
    fn process(&self, ctx: &BuildContext<'_>, next: Next<'_>) -> BuildResult<Product>;
}

/// Link to the next stage in the chain.
///
/// Consumed by [`run`](Next::run), so each link is invoked at most once per
/// build. The innermost link evaluates the factory's recipe.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More stages to process
    Chain {
        stage: &'a dyn Stage,
        next: Box<Next<'a>>,
    },
    /// End of chain, evaluate the recipe
    Factory,
}

impl<'a> Next<'a> {
    /// Creates a link that invokes `stage` with `next` as its inner link.
    #[must_use]
    pub fn new(stage: &'a dyn Stage, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                stage,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal link that evaluates the factory's recipe.
    #[must_use]
    pub const fn factory() -> Self {
        Self {
            inner: NextInner::Factory,
        }
    }

    /// Returns `true` if this link evaluates the recipe directly.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.inner, NextInner::Factory)
    }

    /// Invokes the next stage, or the recipe at the end of the chain.
    pub fn run(self, ctx: &BuildContext<'_>) -> BuildResult<Product> {
        match self.inner {
            NextInner::Chain { stage, next } => stage.process(ctx, *next),
            NextInner::Factory => ctx.factory().invoke(ctx),
        }
    }
}

/// A stage created from a closure.
///
/// # Example
///
/// ```
/// use stockyard_chain::FnStage;
///
/// let upcase = FnStage::new("upcase", |ctx, next| {
///     let product = next.run(ctx)?;
///     Ok(product.as_str().map_or(product.clone(), |s| s.to_uppercase().into()))
/// });
/// ```
pub struct FnStage<F> {
    name: &'static str,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(&BuildContext<'_>, Next<'_>) -> BuildResult<Product> + Send + Sync + 'static,
{
    /// Creates a new function-based stage.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(&BuildContext<'_>, Next<'_>) -> BuildResult<Product> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, ctx: &BuildContext<'_>, next: Next<'_>) -> BuildResult<Product> {
        (self.func)(ctx, next)
    }
}

impl<F> std::fmt::Debug for FnStage<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish_non_exhaustive()
    }
}
