use crate::analyzer::{AnalysisResult, Analyzer, Dispatch};
use crate::context::AnalysisContext;
use crate::entity::DirectoryEntity;
use crate::error::{AnalysisError, PartialFailure};
use crate::value::{Value, ValueKind, kinds};

/// Walks a directory listing, handing each entry to the active dispatcher
pub struct DirectoryAnalyzer;

impl Analyzer for DirectoryAnalyzer {
    fn name(&self) -> &str {
        "directory"
    }

    fn kind(&self) -> ValueKind {
        kinds::DIRECTORY
    }

    fn analyze(
        &self,
        value: &dyn Value,
        ctx: &AnalysisContext,
        dispatch: &dyn Dispatch,
    ) -> Result<AnalysisResult, AnalysisError> {
        let Some(dir) = value.downcast_ref::<DirectoryEntity>() else {
            return Ok(AnalysisResult::declined());
        };

        let node = ctx.node();
        if !dir.name().is_empty() {
            node.set_label_if_absent(dir.name());
        }
        node.add_class("directory");
        node.set("entries", dir.entries().len());

        let mut incomplete = 0;
        for entry in dir.entries() {
            let child = ctx.child(entry.name());
            let result = dispatch.analyze_entity(entry.as_value(), &child)?;
            if result.failure.is_some() {
                incomplete += 1;
            }
        }

        let result = AnalysisResult::claimed(node.clone());
        if incomplete == 0 {
            return Ok(result);
        }
        Ok(result.with_failure(PartialFailure::Incomplete(format!(
            "{} of {} entries not fully readable",
            incomplete,
            dir.entries().len()
        ))))
    }
}
