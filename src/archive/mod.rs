mod entry;
mod error;
mod path;


pub use entry::{ArchiveEntry, SkippedEntry};
pub use error::ArchiveError;
pub use path::PathSanitizer;

use crate::engine::ArchiveLimits;
use crate::error::PartialFailure;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Seek};
use std::sync::Arc;
use tracing::debug;

/// Immutable archive contents with arena-backed storage
///
/// Entries are indexed by sanitized virtual path in sorted order, so every
/// listing of the same archive comes out the same.
#[derive(Debug)]
pub struct Archive {
    /// Single contiguous blob containing all entry data
    arena: Vec<u8>,
    /// Index mapping virtual paths to arena slices
    index: BTreeMap<String, ArchiveEntry>,
    /// Directories listed explicitly by the archive
    directories: BTreeSet<String>,
    skipped: Vec<SkippedEntry>,
}

/// Mutable builder for constructing an archive
pub struct ArchiveBuilder {
    arena: Vec<u8>,
    index: BTreeMap<String, ArchiveEntry>,
    directories: BTreeSet<String>,
    skipped: Vec<SkippedEntry>,
    max_entry_size: u64,
    max_total_size: u64,
}

impl ArchiveBuilder {
    /// Create a new builder with default limits
    pub fn new() -> Self {
        Self::with_limits(ArchiveLimits::default())
    }

    pub fn with_limits(limits: ArchiveLimits) -> Self {
        Self {
            arena: Vec::new(),
            index: BTreeMap::new(),
            directories: BTreeSet::new(),
            skipped: Vec::new(),
            max_entry_size: limits.max_entry_size,
            max_total_size: limits.max_total_size,
        }
    }

    /// Set maximum individual entry size
    pub fn max_entry_size(mut self, size: u64) -> Self {
        self.max_entry_size = size;
        self
    }

    /// Set maximum total arena size
    pub fn max_total_size(mut self, size: u64) -> Self {
        self.max_total_size = size;
        self
    }

    /// Add an entry to the archive arena
    pub fn add_file(&mut self, raw_path: &str, data: &[u8]) -> Result<(), ArchiveError> {
        self.add_file_with_time(raw_path, data, None)
    }

    pub fn add_file_with_time(
        &mut self,
        raw_path: &str,
        data: &[u8],
        modified: Option<DateTime<Utc>>,
    ) -> Result<(), ArchiveError> {
        let virtual_path = PathSanitizer::sanitize(raw_path)?;
        self.check_size(data.len() as u64)?;

        let offset = self.arena.len();
        self.arena.extend_from_slice(data);

        self.index.insert(
            virtual_path.clone(),
            ArchiveEntry {
                offset,
                length: data.len(),
                virtual_path,
                modified,
            },
        );
        Ok(())
    }

    /// Record a directory, so it is listed even when empty
    pub fn add_directory(&mut self, raw_path: &str) -> Result<(), ArchiveError> {
        let virtual_path = PathSanitizer::sanitize(raw_path)?;
        self.directories.insert(virtual_path);
        Ok(())
    }

    /// Record an entry whose contents could not be taken into the arena
    pub fn skip(&mut self, raw_path: &str, failure: PartialFailure) -> Result<(), ArchiveError> {
        let virtual_path = PathSanitizer::sanitize(raw_path)?;
        debug!(path = %virtual_path, reason = %failure, "archive entry skipped");
        self.skipped.push(SkippedEntry {
            virtual_path,
            failure,
        });
        Ok(())
    }

    /// Unpack a ZIP archive
    ///
    /// Entries that are encrypted, too large or unreadable are recorded as
    /// skipped instead of failing the whole archive. Entries with unsafe
    /// paths are dropped.
    pub fn read_zip<R: Read + Seek>(mut self, reader: R) -> Result<Self, ArchiveError> {
        let mut zip = zip::ZipArchive::new(reader)?;

        for i in 0..zip.len() {
            let (raw_path, is_dir, encrypted, size, modified) = {
                let file = zip.by_index_raw(i)?;
                (
                    file.name().to_string(),
                    file.is_dir(),
                    file.encrypted(),
                    file.size(),
                    file.last_modified().and_then(zip_time),
                )
            };

            let outcome = if is_dir {
                self.add_directory(&raw_path)
            } else if encrypted {
                self.skip(&raw_path, PartialFailure::Encrypted)
            } else if size > self.max_entry_size {
                self.skip(
                    &raw_path,
                    PartialFailure::TooLarge {
                        size,
                        max: self.max_entry_size,
                    },
                )
            } else {
                match read_entry(&mut zip, i, self.max_entry_size) {
                    Ok(contents) => match self.add_file_with_time(&raw_path, &contents, modified) {
                        Err(ArchiveError::FileTooLarge { size, max }) => {
                            self.skip(&raw_path, PartialFailure::TooLarge { size, max })
                        }
                        other => other,
                    },
                    Err(failure) => self.skip(&raw_path, failure),
                }
            };

            if let Err(ArchiveError::InvalidPath(reason)) = &outcome {
                debug!(path = %raw_path, reason = %reason, "unsafe archive path dropped");
                continue;
            }
            outcome?;
        }

        Ok(self)
    }

    fn check_size(&self, size: u64) -> Result<(), ArchiveError> {
        if size > self.max_entry_size {
            return Err(ArchiveError::FileTooLarge {
                size,
                max: self.max_entry_size,
            });
        }

        let new_total = self.arena.len() as u64 + size;
        if new_total > self.max_total_size {
            return Err(ArchiveError::FileTooLarge {
                size: new_total,
                max: self.max_total_size,
            });
        }
        Ok(())
    }

    /// Build the immutable archive
    pub fn build(self) -> Archive {
        Archive {
            arena: self.arena,
            index: self.index,
            directories: self.directories,
            skipped: self.skipped,
        }
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn read_entry<R: Read + Seek>(
    zip: &mut zip::ZipArchive<R>,
    index: usize,
    max: u64,
) -> Result<Vec<u8>, PartialFailure> {
    let file = zip
        .by_index(index)
        .map_err(|e| PartialFailure::Unreadable(e.to_string()))?;

    // The declared size can lie; never read more than the limit allows.
    let mut contents = Vec::new();
    file.take(max.saturating_add(1))
        .read_to_end(&mut contents)
        .map_err(|e| PartialFailure::Incomplete(e.to_string()))?;
    if contents.len() as u64 > max {
        return Err(PartialFailure::TooLarge {
            size: contents.len() as u64,
            max,
        });
    }
    Ok(contents)
}

fn zip_time(time: zip::DateTime) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(time.year().into(), time.month().into(), time.day().into())?
        .and_hms_opt(time.hour().into(), time.minute().into(), time.second().into())
        .map(|naive| naive.and_utc())
}

impl Archive {
    /// Get an entry's contents as a byte slice (zero-copy)
    pub fn get(&self, virtual_path: &str) -> Option<&[u8]> {
        self.index
            .get(virtual_path)
            .map(|entry| &self.arena[entry.offset..entry.offset + entry.length])
    }

    /// Zero-copy handle on an entry that outlives the borrow of the archive
    pub fn slice(self: &Arc<Self>, virtual_path: &str) -> Option<ArchiveSlice> {
        self.index.get(virtual_path).map(|entry| ArchiveSlice {
            archive: Arc::clone(self),
            start: entry.offset,
            end: entry.offset + entry.length,
        })
    }

    /// List all entries in path order
    pub fn list(&self) -> impl Iterator<Item = &ArchiveEntry> {
        self.index.values()
    }

    /// Directories listed explicitly by the archive
    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.directories.iter().map(String::as_str)
    }

    /// Entries whose contents are missing, in archive order
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    /// Get metadata for an entry without reading contents
    pub fn get_entry(&self, virtual_path: &str) -> Option<&ArchiveEntry> {
        self.index.get(virtual_path)
    }

    /// Get the total number of readable entries
    pub fn file_count(&self) -> usize {
        self.index.len()
    }

    /// Get the total arena size in bytes
    pub fn total_size(&self) -> usize {
        self.arena.len()
    }
}

/// Shared view of one archive entry, readable through `std::io::Cursor`
#[derive(Debug, Clone)]
pub struct ArchiveSlice {
    archive: Arc<Archive>,
    start: usize,
    end: usize,
}

impl AsRef<[u8]> for ArchiveSlice {
    fn as_ref(&self) -> &[u8] {
        &self.archive.arena[self.start..self.end]
    }
}
