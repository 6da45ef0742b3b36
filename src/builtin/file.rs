use super::fallback::RawData;
use crate::analyzer::{AnalysisResult, Analyzer, Dispatch};
use crate::context::{AnalysisContext, SourceName};
use crate::entity::FileEntity;
use crate::error::AnalysisError;
use crate::format::FormatRegistry;
use crate::value::{Value, ValueKind, kinds};
use anyhow::Context;
use sha2::{Digest, Sha256};
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::Arc;

/// Bytes kept for the fallback analyzer when no format matched
const SAMPLE_SIZE: usize = 8 * 1024;

/// Describes a file, resolves its format and dispatches the decoded value
pub struct FileAnalyzer {
    formats: Arc<FormatRegistry>,
}

impl FileAnalyzer {
    pub fn new(formats: Arc<FormatRegistry>) -> Self {
        Self { formats }
    }
}

impl Analyzer for FileAnalyzer {
    fn name(&self) -> &str {
        "file"
    }

    fn kind(&self) -> ValueKind {
        kinds::FILE
    }

    fn analyze(
        &self,
        value: &dyn Value,
        ctx: &AnalysisContext,
        dispatch: &dyn Dispatch,
    ) -> Result<AnalysisResult, AnalysisError> {
        let Some(file) = value.downcast_ref::<FileEntity>() else {
            return Ok(AnalysisResult::declined());
        };

        let node = ctx.node();
        node.set_label_if_absent(file.name());
        node.add_class("file");
        if let Some(size) = file.size() {
            node.set("size", size);
        }
        if let Some(modified) = file.modified() {
            node.set("modified", modified.to_rfc3339());
        }
        if let Some(ext) = file.extension() {
            node.set("extension", ext);
        }

        if let Some(failure) = file.failure() {
            return Ok(AnalysisResult::partial(node.clone(), failure.clone()));
        }

        let mut stream = file
            .open()
            .with_context(|| format!("Failed to open {}", file.path()))?;
        let summary = summarize(&mut stream)
            .with_context(|| format!("Failed to read {}", file.path()))?;
        node.set("sha256", &summary.sha256);
        node.set("utf8", summary.utf8);
        stream
            .seek(SeekFrom::Start(0))
            .with_context(|| format!("Failed to rewind {}", file.path()))?;

        let match_context = ctx
            .match_context()
            .with_service(SourceName(file.name().to_string()));
        let resolved = self
            .formats
            .resolve(&mut *stream, &match_context)
            .with_context(|| format!("Failed to resolve {}", file.path()))?;
        let value_ctx = ctx.with_match_context(match_context);

        let result = match resolved {
            Some(resolved) => {
                node.set("mediaType", resolved.format.media_type());
                dispatch.analyze_value(resolved.value.as_ref(), &value_ctx)?
            }
            None => {
                let raw = RawData {
                    extension: file.extension(),
                    size: file.size(),
                    sample: summary.sample,
                    utf8: summary.utf8,
                };
                dispatch.analyze_value(&raw, &value_ctx)?
            }
        };

        Ok(AnalysisResult::claimed(node.clone()).merge(result))
    }
}

struct Summary {
    sha256: String,
    utf8: bool,
    sample: Vec<u8>,
}

/// Hash the whole stream and check that it is valid UTF-8
fn summarize(reader: &mut dyn Read) -> io::Result<Summary> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    let mut sample = Vec::new();
    // Bytes of a character split across two reads
    let mut pending: Vec<u8> = Vec::new();
    let mut utf8 = true;

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        let chunk = &buf[..n];
        hasher.update(chunk);

        if sample.len() < SAMPLE_SIZE {
            let take = (SAMPLE_SIZE - sample.len()).min(n);
            sample.extend_from_slice(&chunk[..take]);
        }

        if utf8 {
            pending.extend_from_slice(chunk);
            match std::str::from_utf8(&pending) {
                Ok(_) => pending.clear(),
                Err(e) if e.error_len().is_none() => {
                    let valid = e.valid_up_to();
                    pending.drain(..valid);
                }
                Err(_) => utf8 = false,
            }
        }
    }

    Ok(Summary {
        sha256: hex::encode(hasher.finalize()),
        utf8: utf8 && pending.is_empty(),
        sample,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_summarize_digest_and_utf8() {
        let summary = summarize(&mut Cursor::new(b"hello".to_vec())).unwrap();
        assert_eq!(
            summary.sha256,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert!(summary.utf8);
        assert_eq!(summary.sample, b"hello");
    }

    #[test]
    fn test_summarize_binary() {
        let summary = summarize(&mut Cursor::new(vec![0xff, 0xfe, 0x00])).unwrap();
        assert!(!summary.utf8);
    }

    #[test]
    fn test_summarize_truncated_character() {
        // first two bytes of a three-byte character
        let summary = summarize(&mut Cursor::new(vec![b'a', 0xe2, 0x82])).unwrap();
        assert!(!summary.utf8);
    }

    #[test]
    fn test_summarize_character_split_across_reads() {
        let mut data = vec![b'a'; 8191];
        data.extend_from_slice("€".as_bytes());
        let summary = summarize(&mut Cursor::new(data)).unwrap();
        assert!(summary.utf8);
        assert_eq!(summary.sample.len(), SAMPLE_SIZE);
    }
}
