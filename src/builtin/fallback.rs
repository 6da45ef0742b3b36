use crate::analyzer::{AnalysisResult, Analyzer, Dispatch};
use crate::context::AnalysisContext;
use crate::error::AnalysisError;
use crate::value::{Value, ValueKind, kinds};

/// Leading bytes of a file that no registered format recognized
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawData {
    pub extension: Option<String>,
    pub size: Option<u64>,
    pub sample: Vec<u8>,
    /// Whether the whole file (not only the sample) is valid UTF-8
    pub utf8: bool,
}

impl Value for RawData {
    fn kind(&self) -> ValueKind {
        kinds::DATA
    }
}

impl RawData {
    /// Share of sample bytes that are printable ASCII or whitespace
    pub fn printable_ratio(&self) -> f64 {
        if self.sample.is_empty() {
            return 0.0;
        }
        let printable = self
            .sample
            .iter()
            .filter(|b| b.is_ascii_graphic() || b.is_ascii_whitespace())
            .count();
        printable as f64 / self.sample.len() as f64
    }

    pub fn line_count(&self) -> usize {
        String::from_utf8_lossy(&self.sample).lines().count()
    }
}

/// Last-resort description of unrecognized data
pub struct FallbackAnalyzer;

impl FallbackAnalyzer {
    /// Heuristic language detection from extension
    pub fn guess_language(ext: &str) -> &'static str {
        match ext {
            "rs" => "rust",
            "py" => "python",
            "js" | "jsx" => "javascript",
            "ts" | "tsx" => "typescript",
            "go" => "go",
            "c" | "h" => "c",
            "cpp" | "cc" | "cxx" | "hpp" => "cpp",
            "java" => "java",
            "rb" => "ruby",
            "cs" => "csharp",
            "md" => "markdown",
            "txt" => "text",
            "json" => "json",
            "yaml" | "yml" => "yaml",
            "toml" => "toml",
            "csv" => "csv",
            "html" | "htm" => "html",
            "css" => "css",
            "sh" | "bash" => "shell",
            "sql" => "sql",
            _ => "unknown",
        }
    }
}

impl Analyzer for FallbackAnalyzer {
    fn name(&self) -> &str {
        "fallback"
    }

    fn kind(&self) -> ValueKind {
        kinds::DATA
    }

    fn analyze(
        &self,
        value: &dyn Value,
        ctx: &AnalysisContext,
        _dispatch: &dyn Dispatch,
    ) -> Result<AnalysisResult, AnalysisError> {
        let Some(data) = value.downcast_ref::<RawData>() else {
            return Ok(AnalysisResult::declined());
        };

        let node = ctx.node();
        let ext = data.extension.as_deref().unwrap_or("");
        node.set("language", Self::guess_language(ext));

        if data.utf8 {
            node.add_class("text");
            node.set("lines", data.line_count());
        } else {
            node.add_class("binary");
            node.set("printableRatio", format!("{:.2}", data.printable_ratio()));
        }
        Ok(AnalysisResult::claimed(node.clone()))
    }
}
