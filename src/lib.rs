// Public API exports
pub mod analyzer;
pub mod archive;
pub mod builtin;
pub mod container;
pub mod context;
pub mod engine;
pub mod entity;
pub mod error;
pub mod format;
pub mod node;
pub mod race;
pub mod value;
pub mod xml;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use analyzer::{AnalysisResult, Analyzer, AnalyzerRegistry, Dispatch, TypedAnalyzer};
pub use archive::{Archive, ArchiveBuilder, ArchiveError, PathSanitizer};
pub use container::{
    ContainerAnalyzer, ContainerBehaviour, ContainerFrame, ContainerProvider, ContainerStep,
    FrameJournal, FrameRecord,
};
pub use context::{AnalysisContext, MatchContext, SourceName};
pub use engine::{Analysis, Engine, EngineBuilder, EngineConfig, EngineError};
pub use entity::{DirectoryEntity, Entity, FileEntity, load_path};
pub use error::{AnalysisError, ErrorPolicy, PartialFailure};
pub use format::xml::{VocabularyFormat, XmlFormat};
pub use format::{Format, FormatError, FormatRegistry, SignatureFormat};
pub use node::{Node, NodeFactory, NodeSnapshot};
pub use value::{KindHierarchy, Value, ValueKind, kinds};
