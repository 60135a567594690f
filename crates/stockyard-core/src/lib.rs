//! # Stockyard Core
//!
//! Core types for the Stockyard fixture factory registry.
//!
//! This crate provides the foundational types used throughout Stockyard:
//!
//! - [`Product`] / [`Fields`] - The values a build produces and the overrides applied to them
//! - [`Record`] - Domain objects with named, settable fields
//! - [`Factory`] - A named, immutable recipe definition
//! - [`BuildContext`] - Per-build context threaded through the build chain
//! - [`BuildError`] - Standard error type

#![doc(html_root_url = "https://docs.rs/stockyard-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod factory;
pub mod product;
pub mod record;

pub use context::{BuildContext, BuildScope};
pub use error::{BuildError, BuildResult, ErrorKind};
pub use factory::{Factory, FactoryOptions, Recipe};
pub use product::{Fields, Product, ProductKind};
pub use record::Record;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
