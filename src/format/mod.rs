mod registry;
mod signature;
pub mod xml;


pub use registry::{FormatRegistry, FormatRegistryBuilder, Resolved};
pub use signature::SignatureFormat;

use crate::context::MatchContext;
use crate::value::Value;
use crate::xml::XmlError;
use std::io::{Read, Seek};
use thiserror::Error;

/// A readable, seekable stream
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("I/O error while matching: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed body: {0}")]
    Malformed(String),

    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// One recognizable shape of binary data
pub trait Format: Send + Sync {
    /// Media type of matched data, e.g. `application/zip`
    fn media_type(&self) -> &str;

    /// Usual file extension without the dot
    fn extension(&self) -> Option<&str> {
        None
    }

    /// Number of leading bytes [`Format::check_header`] needs
    fn header_length(&self) -> usize;

    /// Cheap test on the leading bytes; may see fewer bytes than requested
    /// when the stream is short
    fn check_header(&self, header: &[u8], ctx: &MatchContext) -> bool;

    /// Decode the stream (positioned at its start) into a typed value
    ///
    /// `Ok(None)` and `Err(_)` both mean "not this format"; the registry moves
    /// on to the next candidate.
    fn matches(
        &self,
        stream: &mut dyn ReadSeek,
        ctx: &MatchContext,
    ) -> Result<Option<Box<dyn Value>>, FormatError>;
}
