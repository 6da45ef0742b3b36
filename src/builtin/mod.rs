//! Formats, analyzers and container providers available out of the box

mod directory;
mod fallback;
mod file;
mod opc;
mod png;
mod xml;
mod zip;


pub use directory::DirectoryAnalyzer;
pub use fallback::{FallbackAnalyzer, RawData};
pub use file::FileAnalyzer;
pub use opc::{CONTENT_TYPES_NS, CONTENT_TYPES_PART, ContentTypes, OpcAnalyzer, OpcProvider};
pub use png::{PngAnalyzer, PngImage};
pub use xml::{SVG_NS, SvgAnalyzer, SvgImage, XmlDocumentAnalyzer, svg_format};
pub use zip::{ZipAnalyzer, ZipValue};

use crate::analyzer::AnalyzerRegistryBuilder;
use crate::container::ContainerProvider;
use crate::engine::EngineConfig;
use crate::format::{FormatRegistry, FormatRegistryBuilder};
use std::sync::Arc;

/// Register the built-in binary formats and XML vocabularies
pub fn register_formats(formats: &mut FormatRegistryBuilder, config: &EngineConfig) {
    formats
        .register(zip::format(config.archive_limits))
        .register(png::format())
        .register_xml(svg_format());
}

/// Register the built-in analyzers; files are resolved against `formats`
pub fn register_analyzers(analyzers: &mut AnalyzerRegistryBuilder, formats: Arc<FormatRegistry>) {
    analyzers
        .register(FileAnalyzer::new(formats))
        .register(DirectoryAnalyzer)
        .register(ZipAnalyzer)
        .register(PngAnalyzer)
        .register(XmlDocumentAnalyzer)
        .register(SvgAnalyzer)
        .register(FallbackAnalyzer);
}

/// Built-in container providers in probing order
pub fn providers() -> Vec<Arc<dyn ContainerProvider>> {
    vec![Arc::new(OpcProvider)]
}
