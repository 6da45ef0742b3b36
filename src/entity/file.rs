use crate::archive::{Archive, ArchiveSlice, PathSanitizer};
use crate::error::PartialFailure;
use crate::format::ReadSeek;
use crate::value::{Value, ValueKind, kinds};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{self, BufReader, Cursor};
use std::path::PathBuf;
use std::sync::Arc;

/// Where a file's bytes come from
#[derive(Debug, Clone)]
pub enum FileSource {
    Memory(Arc<[u8]>),
    Archive(ArchiveSlice),
    Disk(PathBuf),
    /// Listed by its container but not readable
    Unavailable(PartialFailure),
}

/// A file inside a directory tree or archive
#[derive(Debug, Clone)]
pub struct FileEntity {
    name: String,
    path: String,
    size: Option<u64>,
    modified: Option<DateTime<Utc>>,
    source: FileSource,
}

impl FileEntity {
    /// File with in-memory contents
    pub fn from_bytes(path: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        let data: Arc<[u8]> = data.into();
        Self::new(path, Some(data.len() as u64), FileSource::Memory(data))
    }

    /// Entry `virtual_path` of an unpacked archive
    pub fn from_archive(archive: &Arc<Archive>, virtual_path: &str) -> Option<Self> {
        let entry = archive.get_entry(virtual_path)?;
        let slice = archive.slice(virtual_path)?;
        let mut file = Self::new(
            virtual_path,
            Some(entry.length as u64),
            FileSource::Archive(slice),
        );
        file.modified = entry.modified;
        Some(file)
    }

    /// File that exists in a listing but cannot be read
    pub fn unavailable(path: impl Into<String>, failure: PartialFailure) -> Self {
        Self::new(path, None, FileSource::Unavailable(failure))
    }

    pub fn new(path: impl Into<String>, size: Option<u64>, source: FileSource) -> Self {
        let path = path.into();
        let name = PathSanitizer::file_name(&path).to_string();
        Self {
            name,
            path,
            size,
            modified: None,
            source,
        }
    }

    pub fn with_modified(mut self, modified: Option<DateTime<Utc>>) -> Self {
        self.modified = modified;
        self
    }

    /// File name without directories
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path relative to the root of the tree the file was found in
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Lowercased extension of the file name
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .filter(|(stem, _)| !stem.is_empty())
            .map(|(_, ext)| ext.to_lowercase())
    }

    /// Why the contents cannot be read, if they cannot
    pub fn failure(&self) -> Option<&PartialFailure> {
        match &self.source {
            FileSource::Unavailable(failure) => Some(failure),
            _ => None,
        }
    }

    /// Open the contents for reading from the start
    pub fn open(&self) -> io::Result<Box<dyn ReadSeek>> {
        match &self.source {
            FileSource::Memory(data) => Ok(Box::new(Cursor::new(Arc::clone(data)))),
            FileSource::Archive(slice) => Ok(Box::new(Cursor::new(slice.clone()))),
            FileSource::Disk(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            FileSource::Unavailable(failure) => Err(io::Error::other(failure.to_string())),
        }
    }
}

impl Value for FileEntity {
    fn kind(&self) -> ValueKind {
        kinds::FILE
    }

    fn label(&self) -> Option<&str> {
        Some(&self.name)
    }
}
