//! Ordered, self-normalizing list of stages.
//!
//! A [`BuildChain`] stores stages exactly as callers arranged them and
//! normalizes the list every time it is read for use:
//!
//! 1. Stages are de-duplicated by name, keeping the first occurrence
//! 2. The merge stage is removed from wherever it sits and appended last
//!    (the default [`MergeStage`] is appended if none is present)
//!
//! The stored list itself is never rewritten by normalization, so the
//! result is the same no matter how often it runs.

use crate::stage::{Next, Stage};
use crate::stages::{MergeStage, MERGE_STAGE};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use stockyard_core::{BuildContext, BuildResult, Product};

/// A type-erased stage that can be stored in a chain.
pub type StageRef = Arc<dyn Stage>;

/// The build chain of a registry.
///
/// # Example
///
/// ```
/// use stockyard_chain::{BuildChain, FnStage, MergeStage};
///
/// let mut chain = BuildChain::empty();
/// chain.push(MergeStage);
/// chain.push(FnStage::new("model", |ctx, next| next.run(ctx)));
/// chain.push(FnStage::new("model", |ctx, next| next.run(ctx)));
///
/// assert_eq!(chain.raw_len(), 3);
/// assert_eq!(chain.stage_names(), vec!["model", "merge"]);
/// ```
#[derive(Clone)]
pub struct BuildChain {
    stages: Vec<StageRef>,
}

impl BuildChain {
    /// Creates the default chain, holding only the merge stage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: vec![Arc::new(MergeStage)],
        }
    }

    /// Creates a chain with no stored stages.
    ///
    /// Reading it still yields the merge stage.
    #[must_use]
    pub const fn empty() -> Self {
        Self { stages: Vec::new() }
    }

    /// Creates a chain from stages in outermost-first order.
    #[must_use]
    pub fn from_stages(stages: impl IntoIterator<Item = StageRef>) -> Self {
        Self {
            stages: stages.into_iter().collect(),
        }
    }

    /// Appends a stage.
    pub fn push<S: Stage>(&mut self, stage: S) -> &mut Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Appends a shared stage.
    pub fn push_ref(&mut self, stage: StageRef) -> &mut Self {
        self.stages.push(stage);
        self
    }

    /// Prepends a stage, making it the outermost one.
    pub fn push_front<S: Stage>(&mut self, stage: S) -> &mut Self {
        self.stages.insert(0, Arc::new(stage));
        self
    }

    /// Inserts a stage at `index` of the stored list.
    ///
    /// An index past the end appends.
    pub fn insert<S: Stage>(&mut self, index: usize, stage: S) -> &mut Self {
        let index = index.min(self.stages.len());
        self.stages.insert(index, Arc::new(stage));
        self
    }

    /// Adds a stage, consuming and returning the chain.
    #[must_use]
    pub fn with_stage<S: Stage>(mut self, stage: S) -> Self {
        self.push(stage);
        self
    }

    /// Removes every stored stage named `name`.
    ///
    /// Returns the number of entries removed. Removing the merge stage only
    /// affects the stored list; reads still yield the default one.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.stages.len();
        self.stages.retain(|stage| stage.name() != name);
        before - self.stages.len()
    }

    /// Checks if the normalized chain contains a stage named `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        name == MERGE_STAGE || self.stages.iter().any(|stage| stage.name() == name)
    }

    /// Removes every stored stage.
    pub fn clear(&mut self) {
        self.stages.clear();
    }

    /// Returns the stored stages, as arranged by callers.
    #[must_use]
    pub fn stages(&self) -> &[StageRef] {
        &self.stages
    }

    /// Returns the stored stages for direct mutation.
    ///
    /// Any arrangement is allowed; it is normalized on the next read.
    pub fn stages_mut(&mut self) -> &mut Vec<StageRef> {
        &mut self.stages
    }

    /// Returns the number of stored stages, before normalization.
    #[must_use]
    pub fn raw_len(&self) -> usize {
        self.stages.len()
    }

    /// Returns the normalized stages, outermost first.
    #[must_use]
    pub fn normalized(&self) -> Vec<StageRef> {
        let mut seen = HashSet::new();
        let mut merge = None;
        let mut stages = Vec::with_capacity(self.stages.len() + 1);

        for stage in &self.stages {
            if !seen.insert(stage.name()) {
                continue;
            }
            if stage.name() == MERGE_STAGE {
                merge = Some(Arc::clone(stage));
            } else {
                stages.push(Arc::clone(stage));
            }
        }

        stages.push(merge.unwrap_or_else(|| Arc::new(MergeStage)));
        stages
    }

    /// Returns the names of the normalized stages, outermost first.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.normalized().iter().map(|stage| stage.name()).collect()
    }

    /// Folds `stages` in reverse around the factory.
    ///
    /// The first stage becomes the outermost link.
    #[must_use]
    pub fn compose(stages: &[StageRef]) -> Next<'_> {
        stages
            .iter()
            .rev()
            .fold(Next::factory(), |next, stage| Next::new(stage.as_ref(), next))
    }

    /// Normalizes the chain and runs it for one build.
    pub fn execute(&self, ctx: &BuildContext<'_>) -> BuildResult<Product> {
        let stages = self.normalized();
        Self::compose(&stages).run(ctx)
    }
}

impl Default for BuildChain {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<StageRef> for BuildChain {
    fn from_iter<I: IntoIterator<Item = StageRef>>(iter: I) -> Self {
        Self::from_stages(iter)
    }
}

impl fmt::Debug for BuildChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stored: Vec<&str> = self.stages.iter().map(|stage| stage.name()).collect();
        f.debug_struct("BuildChain")
            .field("stages", &stored)
            .finish()
    }
}
