mod prolog;
mod reader;
mod token;


pub use prolog::{XmlDocumentInfo, read_prolog};
pub use reader::{ReplaySource, VecTokenSource, XmlTokenReader};
pub use token::{XmlToken, XmlTokenKind};

use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum XmlError {
    #[error("Malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("Document has no root element")]
    NoRoot,
}

impl XmlError {
    pub(crate) fn malformed(position: u64, err: impl std::fmt::Display) -> Self {
        XmlError::Malformed {
            position,
            message: err.to_string(),
        }
    }
}

/// Forward-only source of parse events
///
/// Implemented by the real reader and by the queue-backed views handed to
/// racing candidates, so format matchers cannot tell them apart.
pub trait XmlTokenSource {
    /// Next token in document order, `None` at the end of the document
    fn next_token(&mut self) -> Result<Option<Arc<XmlToken>>, XmlError>;
}

impl<S: XmlTokenSource + ?Sized> XmlTokenSource for &mut S {
    fn next_token(&mut self) -> Result<Option<Arc<XmlToken>>, XmlError> {
        (**self).next_token()
    }
}

impl<S: XmlTokenSource + ?Sized> XmlTokenSource for Box<S> {
    fn next_token(&mut self) -> Result<Option<Arc<XmlToken>>, XmlError> {
        (**self).next_token()
    }
}

/// Skip the remainder of the element whose start token was just read
pub fn skip_element(source: &mut dyn XmlTokenSource, start: &XmlToken) -> Result<(), XmlError> {
    while let Some(token) = source.next_token()? {
        if token.is_end() && token.depth == start.depth {
            return Ok(());
        }
    }
    Ok(())
}
