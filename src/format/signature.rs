use super::{Format, FormatError, ReadSeek};
use crate::context::{MatchContext, SourceName};
use crate::value::Value;

type Factory = dyn Fn(&mut dyn ReadSeek, &MatchContext) -> Result<Option<Box<dyn Value>>, FormatError>
    + Send
    + Sync;

/// Binary format recognized by a byte-literal signature
///
/// # Example
/// ```ignore
/// let gif = SignatureFormat::new("image/gif", b"GIF8", |stream, _ctx| decode_gif(stream))
///     .with_extension("gif");
/// ```
pub struct SignatureFormat {
    media_type: String,
    extension: Option<String>,
    signature: Vec<u8>,
    offset: usize,
    required_extension: Option<String>,
    factory: Box<Factory>,
}

impl SignatureFormat {
    pub fn new<F>(media_type: impl Into<String>, signature: &[u8], factory: F) -> Self
    where
        F: Fn(&mut dyn ReadSeek, &MatchContext) -> Result<Option<Box<dyn Value>>, FormatError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            media_type: media_type.into(),
            extension: None,
            signature: signature.to_vec(),
            offset: 0,
            required_extension: None,
            factory: Box::new(factory),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Expect the signature `offset` bytes into the stream
    pub fn at_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Only accept streams whose [`SourceName`] has this extension
    ///
    /// For weak signatures that are only meaningful together with the name
    /// the data came from.
    pub fn requiring_extension(mut self, extension: impl Into<String>) -> Self {
        self.required_extension = Some(extension.into().to_lowercase());
        self
    }
}

impl Format for SignatureFormat {
    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    fn header_length(&self) -> usize {
        self.offset + self.signature.len()
    }

    fn check_header(&self, header: &[u8], ctx: &MatchContext) -> bool {
        let signature_matches = header
            .get(self.offset..self.offset + self.signature.len())
            .is_some_and(|bytes| bytes == self.signature.as_slice());
        if !signature_matches {
            return false;
        }

        match &self.required_extension {
            Some(required) => ctx
                .get::<SourceName>()
                .and_then(SourceName::extension)
                .is_some_and(|ext| &ext == required),
            None => true,
        }
    }

    fn matches(
        &self,
        stream: &mut dyn ReadSeek,
        ctx: &MatchContext,
    ) -> Result<Option<Box<dyn Value>>, FormatError> {
        (self.factory)(stream, ctx)
    }
}
