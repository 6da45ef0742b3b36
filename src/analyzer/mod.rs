mod registry;
mod result;
mod typed;


pub use registry::{AnalyzerRegistry, AnalyzerRegistryBuilder};
pub use result::AnalysisResult;
pub use typed::TypedAnalyzer;

use crate::context::AnalysisContext;
use crate::error::AnalysisError;
use crate::value::{Value, ValueKind};

/// Core trait that all analyzers must implement
pub trait Analyzer: Send + Sync {
    /// Name used in logs and diagnostics
    fn name(&self) -> &str;

    /// Most specific kind this analyzer accepts
    fn kind(&self) -> ValueKind;

    /// Describe `value` in `ctx.node()`
    ///
    /// # Arguments
    /// * `value` - Value whose kind is assignable to [`Analyzer::kind`]
    /// * `ctx` - Node, link and match services for this value
    /// * `dispatch` - Where nested entities and decoded values are sent
    ///
    /// # Returns
    /// A result with a node to claim the value, a declined result to let
    /// the next analyzer try.
    fn analyze(
        &self,
        value: &dyn Value,
        ctx: &AnalysisContext,
        dispatch: &dyn Dispatch,
    ) -> Result<AnalysisResult, AnalysisError>;
}

/// Entry point for analyzing nested values
///
/// The engine itself dispatches when no container analyzer is active; inside
/// a container the entity's frame does, so active container analyzers see the
/// children.
pub trait Dispatch: Send + Sync {
    /// Analyze an entity (file, directory, ...) found inside the current one
    fn analyze_entity(
        &self,
        entity: &dyn Value,
        ctx: &AnalysisContext,
    ) -> Result<AnalysisResult, AnalysisError>;

    /// Analyze a value decoded from the current entity, describing it in the
    /// same node
    fn analyze_value(
        &self,
        value: &dyn Value,
        ctx: &AnalysisContext,
    ) -> Result<AnalysisResult, AnalysisError>;
}
