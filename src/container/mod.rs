mod frame;
mod journal;


pub use frame::{ActiveAnalyzer, ContainerFrame};
pub use journal::{FrameJournal, FrameRecord};

use crate::analyzer::{AnalysisResult, Dispatch};
use crate::context::AnalysisContext;
use crate::error::AnalysisError;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

bitflags::bitflags! {
    /// What a container analyzer wants for the rest of the subtree
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ContainerBehaviour: u8 {
        /// Stay active for the entity's children
        const FOLLOW_CHILDREN = 1 << 0;
        /// Suppress root matching for this entity and everything below it
        const BLOCK_OTHER = 1 << 1;
    }
}

impl ContainerBehaviour {
    /// Neither follow nor block; the analyzer drops out of the subtree
    pub const NONE: Self = Self::empty();
}

/// Result of a container analyzer looking at one entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStep {
    pub behaviour: ContainerBehaviour,
    pub result: AnalysisResult,
}

impl ContainerStep {
    /// Not interested in this entity or anything below it
    pub fn pass() -> Self {
        Self::default()
    }

    /// Keep following the entity's children without claiming the entity
    pub fn follow() -> Self {
        Self {
            behaviour: ContainerBehaviour::FOLLOW_CHILDREN,
            result: AnalysisResult::declined(),
        }
    }

    pub fn with_behaviour(mut self, behaviour: ContainerBehaviour) -> Self {
        self.behaviour |= behaviour;
        self
    }

    pub fn with_result(mut self, result: AnalysisResult) -> Self {
        self.result = result;
        self
    }
}

/// Analyzer active over a whole container subtree
///
/// Invoked for each descendant entity while it asks to follow children.
pub trait ContainerAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    /// Look at `entity`, a child of `parent`
    ///
    /// `parent` is the value of the frame the entity arrived through, and so
    /// is `dispatch`. A non-null node in the returned result claims the
    /// entity, so the flat registry is not consulted for it; the entity's
    /// children are then walked by [`ContainerAnalyzer::descend`].
    fn analyze(
        &self,
        parent: &dyn Value,
        entity: &dyn Value,
        ctx: &AnalysisContext,
        dispatch: &dyn Dispatch,
    ) -> Result<ContainerStep, AnalysisError>;

    /// Walk the children of an entity this analyzer claimed
    ///
    /// Runs after every active analyzer has seen the entity. `dispatch` is
    /// the entity's own frame when one was built, so children see its
    /// followers, new roots and block.
    fn descend(
        &self,
        _entity: &dyn Value,
        _ctx: &AnalysisContext,
        _dispatch: &dyn Dispatch,
    ) -> Result<AnalysisResult, AnalysisError> {
        Ok(AnalysisResult::declined())
    }
}

/// Recognizes the top of a container it understands
pub trait ContainerProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Return an analyzer for the descendants of `entity` if it is the root of
    /// this kind of container
    fn match_root(
        &self,
        entity: &dyn Value,
        ctx: &AnalysisContext,
    ) -> Result<Option<Arc<dyn ContainerAnalyzer>>, AnalysisError>;
}

/// Registration slot of a provider in the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderId(pub(crate) usize);

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider#{}", self.0)
    }
}
