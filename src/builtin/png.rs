use crate::analyzer::{AnalysisResult, Analyzer, Dispatch};
use crate::context::AnalysisContext;
use crate::error::AnalysisError;
use crate::format::{FormatError, ReadSeek, SignatureFormat};
use crate::value::{Value, ValueKind, kinds};

const SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Header fields of a PNG image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngImage {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_type: u8,
}

impl Value for PngImage {
    fn kind(&self) -> ValueKind {
        kinds::PNG_IMAGE
    }
}

impl PngImage {
    /// Read the signature and the IHDR chunk that must follow it
    pub fn read_header(stream: &mut dyn ReadSeek) -> Result<Self, FormatError> {
        let mut header = [0u8; 8 + 8 + 13];
        stream.read_exact(&mut header)?;

        if &header[..8] != SIGNATURE {
            return Err(FormatError::Malformed("missing PNG signature".into()));
        }
        if &header[12..16] != b"IHDR" {
            return Err(FormatError::Malformed("first chunk is not IHDR".into()));
        }
        let length = u32::from_be_bytes([header[8], header[9], header[10], header[11]]);
        if length != 13 {
            return Err(FormatError::Malformed(format!("IHDR length {}", length)));
        }

        let width = u32::from_be_bytes([header[16], header[17], header[18], header[19]]);
        let height = u32::from_be_bytes([header[20], header[21], header[22], header[23]]);
        if width == 0 || height == 0 {
            return Err(FormatError::Malformed("zero image dimension".into()));
        }

        Ok(Self {
            width,
            height,
            bit_depth: header[24],
            color_type: header[25],
        })
    }
}

pub fn format() -> SignatureFormat {
    SignatureFormat::new("image/png", SIGNATURE, |stream, _ctx| {
        Ok(Some(Box::new(PngImage::read_header(stream)?)))
    })
    .with_extension("png")
}

pub struct PngAnalyzer;

impl Analyzer for PngAnalyzer {
    fn name(&self) -> &str {
        "png"
    }

    fn kind(&self) -> ValueKind {
        kinds::PNG_IMAGE
    }

    fn analyze(
        &self,
        value: &dyn Value,
        ctx: &AnalysisContext,
        _dispatch: &dyn Dispatch,
    ) -> Result<AnalysisResult, AnalysisError> {
        let Some(image) = value.downcast_ref::<PngImage>() else {
            return Ok(AnalysisResult::declined());
        };

        let node = ctx.node();
        node.add_class("image");
        node.set("width", image.width);
        node.set("height", image.height);
        node.set("bitDepth", image.bit_depth);
        Ok(AnalysisResult::claimed(node.clone()))
    }
}
