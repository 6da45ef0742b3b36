use super::{ContainerAnalyzer, ProviderId};
use crate::analyzer::{AnalysisResult, Dispatch};
use crate::context::AnalysisContext;
use crate::engine::Engine;
use crate::error::AnalysisError;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// A container analyzer together with the provider that rooted it
#[derive(Clone)]
pub struct ActiveAnalyzer {
    pub analyzer: Arc<dyn ContainerAnalyzer>,
    pub provider: ProviderId,
}

impl fmt::Debug for ActiveAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveAnalyzer")
            .field("analyzer", &self.analyzer.name())
            .field("provider", &self.provider)
            .finish()
    }
}

/// Recursion unit for one entity whose children are analyzed through it
///
/// Frames borrow their parent, so the frame tree mirrors the call stack and
/// cannot form cycles. A frame is immutable once built.
pub struct ContainerFrame<'a> {
    engine: &'a Engine,
    parent: Option<&'a ContainerFrame<'a>>,
    value: &'a dyn Value,
    active: Vec<ActiveAnalyzer>,
    blocking: bool,
    record: Option<usize>,
}

impl<'a> ContainerFrame<'a> {
    pub(crate) fn new(
        engine: &'a Engine,
        parent: Option<&'a ContainerFrame<'a>>,
        value: &'a dyn Value,
        active: Vec<ActiveAnalyzer>,
        blocking: bool,
        record: Option<usize>,
    ) -> Self {
        Self {
            engine,
            parent,
            value,
            active,
            blocking,
            record,
        }
    }

    pub fn parent(&self) -> Option<&ContainerFrame<'a>> {
        self.parent
    }

    /// The entity this frame was built for
    pub fn value(&self) -> &dyn Value {
        self.value
    }

    /// Active analyzers in invocation order: inherited followers first, then
    /// analyzers rooted at this frame's entity
    pub fn active(&self) -> &[ActiveAnalyzer] {
        &self.active
    }

    /// Whether root matching is suppressed below this frame
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    pub fn is_active(&self, provider: ProviderId) -> bool {
        self.active.iter().any(|a| a.provider == provider)
    }

    /// Index of this frame in the engine's journal, if one is attached
    pub fn record(&self) -> Option<usize> {
        self.record
    }

    /// Number of frames above this one
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent;
        while let Some(frame) = current {
            depth += 1;
            current = frame.parent;
        }
        depth
    }
}

impl fmt::Debug for ContainerFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerFrame")
            .field("value", &self.value.kind())
            .field("active", &self.active)
            .field("blocking", &self.blocking)
            .field("depth", &self.depth())
            .finish()
    }
}

impl Dispatch for ContainerFrame<'_> {
    fn analyze_entity(
        &self,
        entity: &dyn Value,
        ctx: &AnalysisContext,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.engine.analyze_entity(Some(self), entity, ctx)
    }

    fn analyze_value(
        &self,
        value: &dyn Value,
        ctx: &AnalysisContext,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.engine.analyzers().dispatch(value, ctx, self)
    }
}
