use crate::analyzer::{AnalysisResult, Analyzer, Dispatch};
use crate::archive::{Archive, ArchiveBuilder};
use crate::context::AnalysisContext;
use crate::engine::ArchiveLimits;
use crate::entity::DirectoryEntity;
use crate::error::{AnalysisError, PartialFailure};
use crate::format::{FormatError, SignatureFormat};
use crate::value::{Value, ValueKind, kinds};
use std::sync::Arc;

/// An unpacked ZIP archive
#[derive(Debug, Clone)]
pub struct ZipValue {
    pub archive: Arc<Archive>,
}

impl ZipValue {
    pub fn new(archive: Archive) -> Self {
        Self {
            archive: Arc::new(archive),
        }
    }

    /// How the archive falls short of being fully readable
    pub fn failure(&self) -> Option<PartialFailure> {
        let skipped = self.archive.skipped();
        if skipped.is_empty() {
            return None;
        }
        if skipped.iter().all(|s| s.failure == PartialFailure::Encrypted) {
            return Some(PartialFailure::Encrypted);
        }
        Some(PartialFailure::Incomplete(format!(
            "{} of {} entries unreadable",
            skipped.len(),
            skipped.len() + self.archive.file_count()
        )))
    }
}

impl Value for ZipValue {
    fn kind(&self) -> ValueKind {
        kinds::ZIP_ARCHIVE
    }
}

/// `PK\x03\x04` local file header format
pub fn format(limits: ArchiveLimits) -> SignatureFormat {
    SignatureFormat::new("application/zip", b"PK\x03\x04", move |stream, _ctx| {
        let archive = ArchiveBuilder::with_limits(limits)
            .read_zip(stream)
            .map_err(|e| FormatError::Malformed(e.to_string()))?
            .build();
        Ok(Some(Box::new(ZipValue::new(archive))))
    })
    .with_extension("zip")
}

/// Describes an archive and dispatches its contents as a directory tree
pub struct ZipAnalyzer;

impl Analyzer for ZipAnalyzer {
    fn name(&self) -> &str {
        "zip"
    }

    fn kind(&self) -> ValueKind {
        kinds::ZIP_ARCHIVE
    }

    fn analyze(
        &self,
        value: &dyn Value,
        ctx: &AnalysisContext,
        dispatch: &dyn Dispatch,
    ) -> Result<AnalysisResult, AnalysisError> {
        let Some(zip) = value.downcast_ref::<ZipValue>() else {
            return Ok(AnalysisResult::declined());
        };

        let node = ctx.node();
        node.add_class("archive");
        node.set("entries", zip.archive.file_count());
        node.set("unpackedSize", zip.archive.total_size());

        let root = DirectoryEntity::from_archive(&zip.archive);
        let contents = dispatch.analyze_entity(&root, &ctx.child("contents"))?;

        let result = AnalysisResult::claimed(node.clone());
        Ok(match zip.failure().or(contents.failure) {
            Some(failure) => result.with_failure(failure),
            None => result,
        })
    }
}
