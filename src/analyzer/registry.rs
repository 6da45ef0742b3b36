use super::{AnalysisResult, Analyzer, Dispatch};
use crate::context::AnalysisContext;
use crate::error::{AnalysisError, ErrorPolicy};
use crate::value::{KindHierarchy, Value, ValueKind};
use std::sync::Arc;
use tracing::trace;

/// Mutable builder collecting analyzers at startup
pub struct AnalyzerRegistryBuilder {
    hierarchy: KindHierarchy,
    analyzers: Vec<Arc<dyn Analyzer>>,
    policy: ErrorPolicy,
}

/// Frozen, specificity-ordered analyzer table
///
/// An analyzer declared for a derived kind always comes before one declared
/// for any of its supertypes; unrelated kinds keep registration order.
pub struct AnalyzerRegistry {
    hierarchy: KindHierarchy,
    ordered: Vec<Arc<dyn Analyzer>>,
    policy: ErrorPolicy,
}

impl AnalyzerRegistryBuilder {
    /// Create a builder over the built-in kind hierarchy
    pub fn new() -> Self {
        Self::with_hierarchy(KindHierarchy::builtin())
    }

    pub fn with_hierarchy(hierarchy: KindHierarchy) -> Self {
        Self {
            hierarchy,
            analyzers: Vec::new(),
            policy: ErrorPolicy::default(),
        }
    }

    /// Declare additional kind relations
    pub fn hierarchy_mut(&mut self) -> &mut KindHierarchy {
        &mut self.hierarchy
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register an analyzer
    ///
    /// # Example
    /// ```ignore
    /// builder.register(PngAnalyzer);
    /// builder.register(ImageAnalyzer);
    /// ```
    pub fn register(&mut self, analyzer: impl Analyzer + 'static) -> &mut Self {
        self.register_arc(Arc::new(analyzer))
    }

    pub fn register_arc(&mut self, analyzer: Arc<dyn Analyzer>) -> &mut Self {
        self.analyzers.push(analyzer);
        self
    }

    /// Freeze into the ordered registry
    pub fn build(self) -> AnalyzerRegistry {
        let mut ordered: Vec<Arc<dyn Analyzer>> = Vec::with_capacity(self.analyzers.len());
        for analyzer in self.analyzers {
            // Insert before the first analyzer declared for a supertype; the
            // list stays ordered since every descendant of that supertype
            // already sits before it.
            let position = ordered
                .iter()
                .position(|existing| {
                    self.hierarchy
                        .is_strict_ancestor(existing.kind(), analyzer.kind())
                })
                .unwrap_or(ordered.len());
            ordered.insert(position, analyzer);
        }

        AnalyzerRegistry {
            hierarchy: self.hierarchy,
            ordered,
            policy: self.policy,
        }
    }
}

impl Default for AnalyzerRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerRegistry {
    pub fn hierarchy(&self) -> &KindHierarchy {
        &self.hierarchy
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Number of registered analyzers
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Analyzer names in dispatch order
    pub fn names(&self) -> Vec<&str> {
        self.ordered.iter().map(|a| a.name()).collect()
    }

    /// Analyzers accepting a value of `kind`, most specific first
    pub fn candidates(&self, kind: ValueKind) -> impl Iterator<Item = &Arc<dyn Analyzer>> {
        self.ordered
            .iter()
            .filter(move |a| self.hierarchy.is_assignable(a.kind(), kind))
    }

    /// Offer `value` to each candidate until one claims it
    ///
    /// Failed analyzers are contained according to the error policy and the
    /// value falls through to the next candidate. A fatal error loses one
    /// wrapper and is returned.
    pub fn dispatch(
        &self,
        value: &dyn Value,
        ctx: &AnalysisContext,
        dispatch: &dyn Dispatch,
    ) -> Result<AnalysisResult, AnalysisError> {
        let mut outcome = AnalysisResult::declined();
        for analyzer in self.candidates(value.kind()) {
            trace!(analyzer = analyzer.name(), kind = %value.kind(), "dispatch");
            match analyzer.analyze(value, ctx, dispatch) {
                Ok(result) => {
                    outcome = outcome.merge(result);
                    if !outcome.is_declined() {
                        return Ok(outcome);
                    }
                }
                Err(err) => self.policy.contain(analyzer.name(), err)?,
            }
        }
        Ok(outcome)
    }
}
