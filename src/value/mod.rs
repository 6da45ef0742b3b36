mod hierarchy;

#[cfg(test)]
mod tests;

pub use hierarchy::KindHierarchy;

use std::any::Any;
use std::fmt;

/// Runtime kind of an analyzable value
///
/// Kinds stand in for the concrete type of a value when picking analyzers.
/// Their supertype relation lives in a [`KindHierarchy`] built once at startup.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueKind(&'static str);

impl ValueKind {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Debug for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueKind({})", self.0)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Kinds known to the built-in analyzers
pub mod kinds {
    use super::ValueKind;

    /// Top of the hierarchy; every kind is assignable to it
    pub const ANY: ValueKind = ValueKind::new("any");
    /// Something with a place in a file system or archive tree
    pub const ENTITY: ValueKind = ValueKind::new("entity");
    pub const FILE: ValueKind = ValueKind::new("file");
    pub const DIRECTORY: ValueKind = ValueKind::new("directory");
    pub const ARCHIVE: ValueKind = ValueKind::new("archive");
    pub const ZIP_ARCHIVE: ValueKind = ValueKind::new("archive/zip");
    pub const IMAGE: ValueKind = ValueKind::new("image");
    pub const PNG_IMAGE: ValueKind = ValueKind::new("image/png");
    pub const SVG_IMAGE: ValueKind = ValueKind::new("image/svg+xml");
    pub const XML_DOCUMENT: ValueKind = ValueKind::new("xml-document");
    /// Bytes no registered format recognized
    pub const DATA: ValueKind = ValueKind::new("data");
}

/// Object-safe access to `Any` for every value
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A value offered to the analysis pipeline
///
/// Entities (files, directories), decoded formats (archives, images) and
/// anything else an analyzer can be registered for implement this trait.
pub trait Value: AsAny + Send + Sync + fmt::Debug {
    /// The most specific kind of this value
    fn kind(&self) -> ValueKind;

    /// Human-readable name, e.g. the file name of an entity
    fn label(&self) -> Option<&str> {
        None
    }
}

impl<'a> dyn Value + 'a {
    /// Downcast to a concrete value type
    pub fn downcast_ref<T: Value + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Value + 'static>(&self) -> bool {
        self.as_any().is::<T>()
    }
}
