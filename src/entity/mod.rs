mod directory;
mod file;


pub use directory::DirectoryEntity;
pub use file::{FileEntity, FileSource};

use crate::value::Value;
use chrono::{DateTime, Utc};
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// A node of a file tree: a file or a directory
#[derive(Debug, Clone)]
pub enum Entity {
    File(FileEntity),
    Directory(DirectoryEntity),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Entity::File(file) => file.name(),
            Entity::Directory(dir) => dir.name(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Entity::File(file) => file.path(),
            Entity::Directory(dir) => dir.path(),
        }
    }

    pub fn as_value(&self) -> &dyn Value {
        match self {
            Entity::File(file) => file,
            Entity::Directory(dir) => dir,
        }
    }

    pub fn as_file(&self) -> Option<&FileEntity> {
        match self {
            Entity::File(file) => Some(file),
            Entity::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryEntity> {
        match self {
            Entity::Directory(dir) => Some(dir),
            Entity::File(_) => None,
        }
    }
}

/// Turn a path on disk into an entity
///
/// A directory is walked completely (symlinks are not followed); file
/// contents are only read when analyzed.
pub fn load_path(path: &Path) -> io::Result<Entity> {
    let metadata = std::fs::metadata(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if metadata.is_file() {
        let file = FileEntity::new(name, Some(metadata.len()), FileSource::Disk(path.into()))
            .with_modified(metadata.modified().ok().map(DateTime::<Utc>::from));
        return Ok(Entity::File(file));
    }

    let mut root = DirectoryEntity::new("").named(name);
    for entry in WalkDir::new(path)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry
            .path()
            .strip_prefix(path)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let file_type = entry.file_type();
        if file_type.is_dir() {
            root.insert_directory(&relative);
        } else if file_type.is_file() {
            let metadata = entry.metadata().map_err(io::Error::other)?;
            let file = FileEntity::new(
                relative,
                Some(metadata.len()),
                FileSource::Disk(entry.path().to_path_buf()),
            )
            .with_modified(metadata.modified().ok().map(DateTime::<Utc>::from));
            root.insert_file(file);
        }
    }
    Ok(Entity::Directory(root))
}
