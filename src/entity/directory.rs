use super::{Entity, FileEntity};
use crate::archive::{Archive, PathSanitizer};
use crate::value::{Value, ValueKind, kinds};
use std::sync::Arc;

/// A directory listing: files and subdirectories in name order
#[derive(Debug, Clone, Default)]
pub struct DirectoryEntity {
    name: String,
    path: String,
    entries: Vec<Entity>,
}

impl DirectoryEntity {
    /// Empty directory at `path` (empty for the root of a tree)
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = PathSanitizer::file_name(&path).to_string();
        Self {
            name,
            path,
            entries: Vec::new(),
        }
    }

    /// Override the displayed name, e.g. for the root of a tree
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Root directory holding every entry of an unpacked archive
    ///
    /// Skipped entries appear as unavailable files.
    pub fn from_archive(archive: &Arc<Archive>) -> Self {
        let mut root = Self::new("");
        for directory in archive.directories() {
            root.insert_directory(directory);
        }
        for entry in archive.list() {
            if let Some(file) = FileEntity::from_archive(archive, &entry.virtual_path) {
                root.insert_file(file);
            }
        }
        for skipped in archive.skipped() {
            root.insert_file(FileEntity::unavailable(
                skipped.virtual_path.clone(),
                skipped.failure.clone(),
            ));
        }
        root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn entries(&self) -> &[Entity] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry of this directory named `name`, compared case-insensitively
    pub fn find_ignore_case(&self, name: &str) -> Option<&Entity> {
        self.entries
            .iter()
            .find(|entry| entry.name().eq_ignore_ascii_case(name))
    }

    /// Entry at a `/`-separated path below this directory
    pub fn find_path(&self, path: &str) -> Option<&Entity> {
        let (first, rest) = match path.split_once('/') {
            Some((first, rest)) => (first, Some(rest)),
            None => (path, None),
        };
        let entry = self.entries.iter().find(|e| e.name() == first)?;
        match (rest, entry) {
            (None, _) => Some(entry),
            (Some(rest), Entity::Directory(dir)) => dir.find_path(rest),
            (Some(_), Entity::File(_)) => None,
        }
    }

    /// Insert a file at its path relative to this directory, creating
    /// intermediate directories
    pub fn insert_file(&mut self, file: FileEntity) {
        let relative = self.relative(file.path()).to_string();
        let parent = match relative.rsplit_once('/') {
            Some((parent, _)) => self.directory_mut(parent),
            None => Some(self),
        };
        if let Some(parent) = parent {
            parent.put(Entity::File(file));
        }
    }

    /// Make sure a directory exists at `path` relative to the tree root
    pub fn insert_directory(&mut self, path: &str) {
        let relative = self.relative(path).to_string();
        if !relative.is_empty() {
            self.directory_mut(&relative);
        }
    }

    fn relative<'p>(&self, path: &'p str) -> &'p str {
        if self.path.is_empty() {
            path
        } else {
            path.strip_prefix(&self.path)
                .map(|rest| rest.trim_start_matches('/'))
                .unwrap_or(path)
        }
    }

    fn directory_mut(&mut self, relative: &str) -> Option<&mut DirectoryEntity> {
        let mut current = self;
        for part in relative.split('/').filter(|p| !p.is_empty()) {
            let exists = current
                .entries
                .iter()
                .any(|e| matches!(e, Entity::Directory(d) if d.name == part));
            if !exists {
                let path = if current.path.is_empty() {
                    part.to_string()
                } else {
                    format!("{}/{}", current.path, part)
                };
                current.put(Entity::Directory(DirectoryEntity::new(path)));
            }
            current = current.entries.iter_mut().find_map(|e| match e {
                Entity::Directory(d) if d.name == part => Some(d),
                _ => None,
            })?;
        }
        Some(current)
    }

    /// Insert keeping entries sorted by name
    fn put(&mut self, entry: Entity) {
        let position = self
            .entries
            .partition_point(|existing| existing.name() < entry.name());
        self.entries.insert(position, entry);
    }
}

impl Value for DirectoryEntity {
    fn kind(&self) -> ValueKind {
        kinds::DIRECTORY
    }

    fn label(&self) -> Option<&str> {
        if self.name.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }
}
