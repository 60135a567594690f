//! # Stockyard
//!
//! **Named, composable test fixtures**
//!
//! Stockyard lets a test suite register named factories once and build
//! fixtures from them anywhere, with sensible defaults and per-call
//! overrides:
//!
//! - **Factories** – a name, an options bag, and a recipe closure
//! - **Overrides** – applied by the merge stage, caller values win
//! - **Composition** – recipes build other factories for associations,
//!   traits, and inheritance
//! - **Build chain** – custom stages post-process every product, e.g. to
//!   turn a mapping into a typed model
//!
//! ## Quick Start
//!
//! ```
//! use stockyard::prelude::*;
//!
//! let registry = Registry::new();
//!
//! registry.define("org", |_| Ok(fields! { "name" => "Foo" }))?;
//! registry.define("license", |ctx| {
//!     Ok(fields! {
//!         "org" => ctx.build("org")?,
//!         "seats" => 5,
//!     })
//! })?;
//!
//! let license = registry.build_with("license", fields! { "seats" => 10 })?;
//! assert_eq!(license.get("seats").and_then(Product::as_i64), Some(10));
//! assert_eq!(
//!     license.get("org").and_then(|org| org.get("name")).and_then(Product::as_str),
//!     Some("Foo")
//! );
//! # Ok::<(), BuildError>(())
//! ```
//!
//! ## Architecture
//!
//! Every build folds the registry's chain around the factory. Stages run
//! outside-in, their effects inside-out:
//!
//! ```text
//! build → Stage 1 → … → Merge → recipe
//!                                  ↓
//! result ← Stage 1 ← … ← Merge ←───┘
//! ```
//!
//! ## Crates
//!
//! | Crate | Contents |
//! |-------|----------|
//! | [`core`] | Products, records, factories, build context, errors |
//! | [`chain`] | Stages, build chain, merge and trace stages |
//! | [`config`] | Typed configuration and its loader |
//! | [`telemetry`] | Logging setup and build metrics |

#![doc(html_root_url = "https://docs.rs/stockyard/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod global;
mod namespace;
mod registry;

// Re-export member crates
pub use stockyard_chain as chain;
pub use stockyard_config as config;
pub use stockyard_core as core;
pub use stockyard_telemetry as telemetry;

pub use namespace::Namespace;
pub use registry::Registry;

pub use stockyard_chain::{BuildChain, FnStage, MergeStage, Next, Stage, StageRef, TraceStage};
pub use stockyard_core::{
    fields, impl_record, BuildContext, BuildError, BuildResult, ErrorKind, Factory,
    FactoryOptions, Fields, Product, ProductKind, Record,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use stockyard::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{global, Namespace, Registry};

    pub use stockyard_chain::{BuildChain, FnStage, Next, Stage};
    pub use stockyard_core::{
        fields, impl_record, BuildContext, BuildError, BuildResult, FactoryOptions, Fields,
        Product, Record,
    };
}
