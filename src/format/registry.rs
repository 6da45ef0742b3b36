use super::xml::{XmlDocumentFormat, XmlFormat};
use super::{Format, FormatError, ReadSeek};
use crate::context::MatchContext;
use crate::race::DEFAULT_RACE_CAPACITY;
use crate::value::Value;
use std::fmt;
use std::io::{Read, SeekFrom};
use std::sync::Arc;
use tracing::debug;

/// Mutable builder collecting formats at startup
pub struct FormatRegistryBuilder {
    formats: Vec<Arc<dyn Format>>,
    vocabularies: Vec<Arc<dyn XmlFormat>>,
    race_capacity: usize,
    sniff_xml: bool,
}

/// Frozen list of binary formats tried in registration order
pub struct FormatRegistry {
    formats: Vec<Arc<dyn Format>>,
    vocabularies: Vec<Arc<dyn XmlFormat>>,
    max_header: usize,
}

/// A successfully matched stream
pub struct Resolved {
    pub format: Arc<dyn Format>,
    pub value: Box<dyn Value>,
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("media_type", &self.format.media_type())
            .field("value", &self.value)
            .finish()
    }
}

impl FormatRegistryBuilder {
    pub fn new() -> Self {
        Self {
            formats: Vec::new(),
            vocabularies: Vec::new(),
            race_capacity: DEFAULT_RACE_CAPACITY,
            sniff_xml: true,
        }
    }

    /// Register a binary format; formats are tried in registration order
    pub fn register(&mut self, format: impl Format + 'static) -> &mut Self {
        self.formats.push(Arc::new(format));
        self
    }

    /// Register an XML vocabulary
    pub fn register_xml(&mut self, format: impl XmlFormat + 'static) -> &mut Self {
        self.vocabularies.push(Arc::new(format));
        self
    }

    pub fn race_capacity(mut self, capacity: usize) -> Self {
        self.race_capacity = capacity;
        self
    }

    /// Whether to append the generic XML document format (on by default)
    pub fn sniff_xml(mut self, enabled: bool) -> Self {
        self.sniff_xml = enabled;
        self
    }

    pub fn build(self) -> FormatRegistry {
        let mut formats = self.formats;
        if self.sniff_xml {
            // Last, so more specific binary formats get the first look.
            formats.push(Arc::new(XmlDocumentFormat::new(
                self.vocabularies.clone(),
                self.race_capacity,
            )));
        }
        let max_header = formats.iter().map(|f| f.header_length()).max().unwrap_or(0);

        FormatRegistry {
            formats,
            vocabularies: self.vocabularies,
            max_header,
        }
    }
}

impl Default for FormatRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Largest header any registered format asks for
    pub fn max_header_length(&self) -> usize {
        self.max_header
    }

    pub fn formats(&self) -> impl Iterator<Item = &Arc<dyn Format>> {
        self.formats.iter()
    }

    pub fn vocabularies(&self) -> impl Iterator<Item = &Arc<dyn XmlFormat>> {
        self.vocabularies.iter()
    }

    /// Formats whose header predicate accepts `header`, in registration order
    pub fn candidates<'a>(
        &'a self,
        header: &'a [u8],
        ctx: &'a MatchContext,
    ) -> impl Iterator<Item = &'a Arc<dyn Format>> + 'a {
        self.formats.iter().filter(move |format| {
            let len = header.len().min(format.header_length());
            format.check_header(&header[..len], ctx)
        })
    }

    /// Identify the stream and decode it with the first format that matches
    ///
    /// The header is read once; each candidate's `matches` sees the stream
    /// rewound to where it started. A malformed body is "no match", not an
    /// error. Only I/O failures on the stream itself are returned.
    pub fn resolve(
        &self,
        stream: &mut dyn ReadSeek,
        ctx: &MatchContext,
    ) -> Result<Option<Resolved>, FormatError> {
        let start = stream.stream_position()?;
        let mut header = Vec::with_capacity(self.max_header);
        (&mut *stream)
            .take(self.max_header as u64)
            .read_to_end(&mut header)?;

        for format in self.candidates(&header, ctx) {
            stream.seek(SeekFrom::Start(start))?;
            match format.matches(stream, ctx) {
                Ok(Some(value)) => {
                    return Ok(Some(Resolved {
                        format: Arc::clone(format),
                        value,
                    }));
                }
                Ok(None) => {
                    debug!(format = format.media_type(), "header matched but body declined");
                }
                Err(err) => {
                    debug!(format = format.media_type(), error = %err, "header matched but body is malformed");
                }
            }
        }

        stream.seek(SeekFrom::Start(start))?;
        Ok(None)
    }
}
