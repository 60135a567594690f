//! Override merging stage.
//!
//! The merge stage wraps the factory directly, so it sees the raw recipe
//! output and applies the caller's overrides before any other stage runs its
//! post-processing.
//!
//! | Inner product | Non-empty overrides |
//! |---------------|---------------------|
//! | [`Product::Map`] | merged, overrides win on key conflict |
//! | [`Product::Record`] | each override assigned as a field |
//! | [`Product::Value`] | fails with [`BuildError::TypeMismatch`] |
//!
//! Empty overrides return the inner product untouched, whatever its shape.

use crate::stage::{Next, Stage};
use stockyard_core::{BuildContext, BuildError, BuildResult, Fields, Product};

/// Name of the merge stage.
pub const MERGE_STAGE: &str = "merge";

/// The default stage that applies overrides.
///
/// # Example
///
/// ```
/// use stockyard_chain::stages::merge_overrides;
/// use stockyard_core::{fields, Product};
///
/// let raw = Product::from(fields! { "email" => "a@b.com", "admin" => false });
/// let merged = merge_overrides("user", raw, fields! { "email" => "c@d.com" }).unwrap();
///
/// assert_eq!(merged.get("email").and_then(Product::as_str), Some("c@d.com"));
/// assert_eq!(merged.get("admin").and_then(Product::as_bool), Some(false));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeStage;

impl Stage for MergeStage {
    fn name(&self) -> &'static str {
        MERGE_STAGE
    }

    fn process(&self, ctx: &BuildContext<'_>, next: Next<'_>) -> BuildResult<Product> {
        let product = next.run(ctx)?;
        if !ctx.has_overrides() {
            return Ok(product);
        }
        merge_overrides(ctx.factory_name(), product, ctx.overrides().clone())
    }
}

/// Applies `overrides` to `product`.
///
/// Keys already present keep their position; new keys are appended in the
/// order given.
pub fn merge_overrides(factory: &str, product: Product, overrides: Fields) -> BuildResult<Product> {
    if overrides.is_empty() {
        return Ok(product);
    }

    match product {
        Product::Map(mut fields) => {
            fields.extend(overrides);
            Ok(Product::Map(fields))
        }
        Product::Record(mut record) => {
            record.merge_fields(overrides)?;
            Ok(Product::Record(record))
        }
        other @ Product::Value(_) => Err(BuildError::type_mismatch(factory, other.describe())),
    }
}
