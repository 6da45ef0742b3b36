use super::ArchiveError;
use std::path::{Component, Path};

pub struct PathSanitizer;

impl PathSanitizer {
    /// Sanitize an entry name from an archive to prevent:
    /// - Directory traversal (../)
    /// - Absolute paths (/etc/passwd, C:\Windows)
    /// - Zip slip attacks
    ///
    /// Backslashes are treated as separators, since archivers on Windows
    /// write them. Hidden files (starting with .) are allowed.
    /// Returns a normalized virtual path or an error.
    pub fn sanitize(raw_path: &str) -> Result<String, ArchiveError> {
        Self::sanitize_with_options(raw_path, true)
    }

    /// Sanitize with custom options
    pub fn sanitize_with_options(raw_path: &str, allow_hidden: bool) -> Result<String, ArchiveError> {
        if raw_path.is_empty() {
            return Err(ArchiveError::InvalidPath("Empty path".to_string()));
        }

        let normalized = raw_path.replace('\\', "/");
        if has_drive_prefix(&normalized) {
            return Err(ArchiveError::InvalidPath(format!(
                "Absolute path not allowed: {}",
                raw_path
            )));
        }

        let mut components = Vec::new();
        for component in Path::new(&normalized).components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {
                    return Err(ArchiveError::InvalidPath(format!(
                        "Absolute path not allowed: {}",
                        raw_path
                    )));
                }
                Component::ParentDir => {
                    return Err(ArchiveError::InvalidPath(format!(
                        "Parent directory traversal not allowed: {}",
                        raw_path
                    )));
                }
                Component::CurDir => continue,
                Component::Normal(part) => {
                    let part_str = part.to_str().ok_or_else(|| {
                        ArchiveError::InvalidPath(format!("Invalid UTF-8 in path: {:?}", part))
                    })?;

                    if !allow_hidden && part_str.starts_with('.') {
                        return Err(ArchiveError::InvalidPath(format!(
                            "Hidden files not allowed: {}",
                            raw_path
                        )));
                    }

                    components.push(part_str);
                }
            }
        }

        if components.is_empty() {
            return Err(ArchiveError::InvalidPath(format!(
                "No valid components: {}",
                raw_path
            )));
        }

        Ok(components.join("/"))
    }

    /// Last component of a sanitized virtual path
    pub fn file_name(virtual_path: &str) -> &str {
        virtual_path.rsplit('/').next().unwrap_or(virtual_path)
    }
}

/// `C:` or `C:/...`, which `Path` only recognizes on Windows
fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
