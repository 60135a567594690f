//! Built-in stages.
//!
//! - [`merge`] - Applies the caller's overrides to the recipe's output;
//!   always the last stage of a normalized chain
//! - [`trace`] - Emits a `tracing` event for every build it wraps

pub mod merge;
pub mod trace;

pub use merge::{merge_overrides, MergeStage, MERGE_STAGE};
pub use trace::TraceStage;
