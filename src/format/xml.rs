use super::{Format, FormatError, ReadSeek};
use crate::context::MatchContext;
use crate::race;
use crate::value::{Value, ValueKind, kinds};
use crate::xml::{ReplaySource, XmlDocumentInfo, XmlTokenReader, XmlTokenSource, read_prolog};
use std::io::BufReader;
use std::sync::Arc;
use tracing::debug;

/// A vocabulary of XML documents, recognized by its root element
pub trait XmlFormat: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the document's DOCTYPE and root element belong to this vocabulary
    fn check_document(&self, document: &XmlDocumentInfo) -> bool;

    /// Parse the document from its first token
    ///
    /// The source replays the prolog and root element before continuing with
    /// the rest of the document.
    fn matches(
        &self,
        source: &mut dyn XmlTokenSource,
        document: &XmlDocumentInfo,
        ctx: &MatchContext,
    ) -> Result<Option<Box<dyn Value>>, FormatError>;
}

type XmlFactory = dyn Fn(
        &mut dyn XmlTokenSource,
        &XmlDocumentInfo,
        &MatchContext,
    ) -> Result<Option<Box<dyn Value>>, FormatError>
    + Send
    + Sync;

/// Vocabulary matched by root namespace, DOCTYPE public id, and/or root name
///
/// Every criterion that is set must hold.
pub struct VocabularyFormat {
    name: String,
    namespace: Option<String>,
    public_id: Option<String>,
    root: Option<String>,
    factory: Box<XmlFactory>,
}

impl VocabularyFormat {
    /// Match documents whose root element is in `namespace`
    pub fn by_namespace<F>(name: impl Into<String>, namespace: impl Into<String>, factory: F) -> Self
    where
        F: Fn(
                &mut dyn XmlTokenSource,
                &XmlDocumentInfo,
                &MatchContext,
            ) -> Result<Option<Box<dyn Value>>, FormatError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            namespace: Some(namespace.into()),
            public_id: None,
            root: None,
            factory: Box::new(factory),
        }
    }

    /// Match documents declaring `public_id` in their DOCTYPE
    pub fn by_public_id<F>(name: impl Into<String>, public_id: impl Into<String>, factory: F) -> Self
    where
        F: Fn(
                &mut dyn XmlTokenSource,
                &XmlDocumentInfo,
                &MatchContext,
            ) -> Result<Option<Box<dyn Value>>, FormatError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            namespace: None,
            public_id: Some(public_id.into()),
            root: None,
            factory: Box::new(factory),
        }
    }

    /// Additionally require the root element's local name
    pub fn with_root(mut self, local_name: impl Into<String>) -> Self {
        self.root = Some(local_name.into());
        self
    }
}

impl XmlFormat for VocabularyFormat {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_document(&self, document: &XmlDocumentInfo) -> bool {
        let namespace_ok = self
            .namespace
            .as_deref()
            .is_none_or(|ns| document.root_namespace() == Some(ns));
        let public_ok = self
            .public_id
            .as_deref()
            .is_none_or(|id| document.public_id.as_deref() == Some(id));
        let root_ok = self
            .root
            .as_deref()
            .is_none_or(|root| document.root_name() == root);
        namespace_ok && public_ok && root_ok
    }

    fn matches(
        &self,
        source: &mut dyn XmlTokenSource,
        document: &XmlDocumentInfo,
        ctx: &MatchContext,
    ) -> Result<Option<Box<dyn Value>>, FormatError> {
        (self.factory)(source, document, ctx)
    }
}

/// A vocabulary value produced for a document
#[derive(Debug)]
pub struct MatchedVocabulary {
    pub name: String,
    pub value: Box<dyn Value>,
}

/// A parsed XML document with every vocabulary it satisfied
#[derive(Debug)]
pub struct XmlDocument {
    pub info: XmlDocumentInfo,
    pub vocabularies: Vec<MatchedVocabulary>,
}

impl Value for XmlDocument {
    fn kind(&self) -> ValueKind {
        kinds::XML_DOCUMENT
    }

    fn label(&self) -> Option<&str> {
        Some(self.info.root_name())
    }
}

/// Generic XML sniffing format that hands documents to registered vocabularies
///
/// Several vocabularies may accept the same root element; they then race
/// over one read of the document and every one that produces a value is kept.
pub struct XmlDocumentFormat {
    vocabularies: Vec<Arc<dyn XmlFormat>>,
    race_capacity: usize,
}

impl XmlDocumentFormat {
    pub fn new(vocabularies: Vec<Arc<dyn XmlFormat>>, race_capacity: usize) -> Self {
        Self {
            vocabularies,
            race_capacity,
        }
    }
}

impl Format for XmlDocumentFormat {
    fn media_type(&self) -> &str {
        "application/xml"
    }

    fn extension(&self) -> Option<&str> {
        Some("xml")
    }

    fn header_length(&self) -> usize {
        64
    }

    fn check_header(&self, header: &[u8], _ctx: &MatchContext) -> bool {
        let body = header.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(header);
        let mut bytes = body.iter().skip_while(|b| b.is_ascii_whitespace());
        match (bytes.next(), bytes.next()) {
            (Some(b'<'), Some(next)) => {
                matches!(next, b'?' | b'!' | b'_') || next.is_ascii_alphabetic()
            }
            _ => false,
        }
    }

    fn matches(
        &self,
        stream: &mut dyn ReadSeek,
        ctx: &MatchContext,
    ) -> Result<Option<Box<dyn Value>>, FormatError> {
        let mut reader = XmlTokenReader::new(BufReader::new(stream));
        let (info, prefix) = read_prolog(&mut reader)?;

        let candidates: Vec<Arc<dyn XmlFormat>> = self
            .vocabularies
            .iter()
            .filter(|vocabulary| vocabulary.check_document(&info))
            .cloned()
            .collect();

        let source = ReplaySource::new(prefix, reader);
        let mut vocabularies = Vec::new();
        for outcome in race::race(source, &candidates, &info, ctx, self.race_capacity) {
            match outcome.result {
                Ok(Some(value)) => vocabularies.push(MatchedVocabulary {
                    name: outcome.candidate,
                    value,
                }),
                Ok(None) => debug!(vocabulary = %outcome.candidate, "vocabulary declined document"),
                Err(err) => {
                    debug!(vocabulary = %outcome.candidate, error = %err, "vocabulary failed on document")
                }
            }
        }

        Ok(Some(Box::new(XmlDocument { info, vocabularies })))
    }
}
