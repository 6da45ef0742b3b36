use crate::error::PartialFailure;
use chrono::{DateTime, Utc};

/// Metadata for a single entry in the archive arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Byte offset into the arena
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
    /// Sanitized virtual path (e.g., "word/document.xml")
    pub virtual_path: String,
    /// Modification time recorded in the archive, if any
    pub modified: Option<DateTime<Utc>>,
}

/// An entry that is listed by the archive but whose contents are not available
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub virtual_path: String,
    pub failure: PartialFailure,
}
