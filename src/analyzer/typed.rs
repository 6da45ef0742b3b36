use super::{AnalysisResult, Analyzer, Dispatch};
use crate::context::AnalysisContext;
use crate::error::AnalysisError;
use crate::value::{Value, ValueKind};
use std::marker::PhantomData;

/// Analyzer for one concrete value type, backed by a closure
///
/// Values that are assignable by kind but are not a `T` are declined.
pub struct TypedAnalyzer<T, F> {
    name: String,
    kind: ValueKind,
    analyze: F,
    _value: PhantomData<fn(&T)>,
}

impl<T, F> TypedAnalyzer<T, F>
where
    T: Value + 'static,
    F: Fn(&T, &AnalysisContext, &dyn Dispatch) -> Result<AnalysisResult, AnalysisError>
        + Send
        + Sync,
{
    pub fn new(name: impl Into<String>, kind: ValueKind, analyze: F) -> Self {
        Self {
            name: name.into(),
            kind,
            analyze,
            _value: PhantomData,
        }
    }
}

impl<T, F> Analyzer for TypedAnalyzer<T, F>
where
    T: Value + 'static,
    F: Fn(&T, &AnalysisContext, &dyn Dispatch) -> Result<AnalysisResult, AnalysisError>
        + Send
        + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ValueKind {
        self.kind
    }

    fn analyze(
        &self,
        value: &dyn Value,
        ctx: &AnalysisContext,
        dispatch: &dyn Dispatch,
    ) -> Result<AnalysisResult, AnalysisError> {
        match value.downcast_ref::<T>() {
            Some(typed) => (self.analyze)(typed, ctx, dispatch),
            None => Ok(AnalysisResult::declined()),
        }
    }
}
