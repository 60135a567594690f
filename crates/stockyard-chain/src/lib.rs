//! # Stockyard Chain
//!
//! The build chain: an ordered list of stages folded around a factory on
//! every build call.
//!
//! ```text
//! build(name, overrides)
//!     │
//!     ▼
//!  Stage 1 ──► Stage 2 ──► … ──► Merge ──► Factory recipe
//!                                                │
//!  result ◄── Stage 1 ◄── Stage 2 ◄── … ◄── Merge ◄┘
//! ```
//!
//! Stages are composed outside-in but their effects run inside-out: the
//! recipe is evaluated first, the merge stage applies the overrides next, and
//! every other stage post-processes the merged result on the way back out.
//!
//! ## Invariants
//!
//! - A normalized chain contains each stage name once (first occurrence wins)
//! - The merge stage is always present and always last
//! - Normalization runs on every read, so direct mutation of the stage list
//!   via [`BuildChain::stages_mut`] can never break the two rules above
//!
//! ## Example
//!
//! ```
//! use stockyard_chain::{BuildChain, stages::TraceStage};
//!
//! let mut chain = BuildChain::new();
//! chain.push_front(TraceStage::new());
//!
//! assert_eq!(chain.stage_names(), vec!["trace", "merge"]);
//! ```

#![doc(html_root_url = "https://docs.rs/stockyard-chain/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod stage;
pub mod stages;

pub use chain::{BuildChain, StageRef};
pub use stage::{FnStage, Next, Stage};
pub use stages::{MergeStage, TraceStage, MERGE_STAGE};
