use crate::analyzer::{AnalysisResult, Analyzer, Dispatch};
use crate::context::AnalysisContext;
use crate::error::AnalysisError;
use crate::format::xml::{VocabularyFormat, XmlDocument};
use crate::value::{Value, ValueKind, kinds};
use crate::xml::{XmlError, XmlToken, XmlTokenKind, XmlTokenSource};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Describes any XML document and forwards the vocabulary values it matched
pub struct XmlDocumentAnalyzer;

impl Analyzer for XmlDocumentAnalyzer {
    fn name(&self) -> &str {
        "xml"
    }

    fn kind(&self) -> ValueKind {
        kinds::XML_DOCUMENT
    }

    fn analyze(
        &self,
        value: &dyn Value,
        ctx: &AnalysisContext,
        dispatch: &dyn Dispatch,
    ) -> Result<AnalysisResult, AnalysisError> {
        let Some(document) = value.downcast_ref::<XmlDocument>() else {
            return Ok(AnalysisResult::declined());
        };

        let node = ctx.node();
        node.add_class("xml");
        node.set("rootElement", document.info.root_name());
        if let Some(ns) = document.info.root_namespace() {
            node.set("namespace", ns);
        }
        if let Some(public_id) = &document.info.public_id {
            node.set("publicId", public_id);
        }

        let mut result = AnalysisResult::claimed(node.clone());
        for vocabulary in &document.vocabularies {
            node.set("vocabulary", &vocabulary.name);
            let nested = dispatch.analyze_value(vocabulary.value.as_ref(), ctx)?;
            result = result.merge(nested);
        }
        Ok(result)
    }
}

/// Root attributes and a few body facts of an SVG drawing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SvgImage {
    pub width: Option<String>,
    pub height: Option<String>,
    pub view_box: Option<String>,
    pub title: Option<String>,
    pub elements: usize,
}

impl Value for SvgImage {
    fn kind(&self) -> ValueKind {
        kinds::SVG_IMAGE
    }
}

impl SvgImage {
    /// Read the drawing from its first token to the end of the document
    pub fn read(source: &mut dyn XmlTokenSource) -> Result<Self, XmlError> {
        let mut image = SvgImage::default();
        let mut in_title = false;

        while let Some(token) = source.next_token()? {
            match token.kind {
                XmlTokenKind::StartElement if token.depth == 0 => image.set_root(&token),
                XmlTokenKind::StartElement => {
                    image.elements += 1;
                    in_title = token.depth == 1 && token.name == "title" && image.title.is_none();
                }
                XmlTokenKind::Text if in_title => {
                    image.title = Some(token.value.trim().to_string());
                    in_title = false;
                }
                XmlTokenKind::EndElement => in_title = false,
                _ => {}
            }
        }
        Ok(image)
    }

    fn set_root(&mut self, root: &XmlToken) {
        self.width = root.attribute("width").map(str::to_string);
        self.height = root.attribute("height").map(str::to_string);
        self.view_box = root.attribute("viewBox").map(str::to_string);
    }
}

pub fn svg_format() -> VocabularyFormat {
    VocabularyFormat::by_namespace("svg", SVG_NS, |source, _document, _ctx| {
        Ok(Some(Box::new(SvgImage::read(source)?)))
    })
    .with_root("svg")
}

pub struct SvgAnalyzer;

impl Analyzer for SvgAnalyzer {
    fn name(&self) -> &str {
        "svg"
    }

    fn kind(&self) -> ValueKind {
        kinds::SVG_IMAGE
    }

    fn analyze(
        &self,
        value: &dyn Value,
        ctx: &AnalysisContext,
        _dispatch: &dyn Dispatch,
    ) -> Result<AnalysisResult, AnalysisError> {
        let Some(image) = value.downcast_ref::<SvgImage>() else {
            return Ok(AnalysisResult::declined());
        };

        let node = ctx.node();
        node.add_class("image");
        node.add_class("vector");
        if let Some(width) = &image.width {
            node.set("width", width);
        }
        if let Some(height) = &image.height {
            node.set("height", height);
        }
        if let Some(view_box) = &image.view_box {
            node.set("viewBox", view_box);
        }
        if let Some(title) = &image.title {
            node.set("title", title);
        }
        node.set("elements", image.elements);
        Ok(AnalysisResult::claimed(node.clone()))
    }
}
