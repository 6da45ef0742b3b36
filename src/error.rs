use thiserror::Error;
use tracing::warn;

/// Failure raised by an analyzer, container analyzer or provider
///
/// `Failed` is contained by the dispatcher that invoked the analyzer: it is
/// logged and the value falls through to the next candidate. `Fatal` is never
/// swallowed; each dispatch layer it crosses strips one wrapper, so
/// `Fatal(Failed(e))` escapes exactly one layer before being contained.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Failed(#[from] anyhow::Error),

    #[error("fatal: {0}")]
    Fatal(Box<AnalysisError>),
}

impl AnalysisError {
    /// Wrap an error so it escapes one more dispatch layer
    pub fn fatal(inner: impl Into<AnalysisError>) -> Self {
        AnalysisError::Fatal(Box::new(inner.into()))
    }

    pub fn failed(message: impl std::fmt::Display) -> Self {
        AnalysisError::Failed(anyhow::anyhow!("{}", message))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, AnalysisError::Fatal(_))
    }
}

/// Whether contained failures are suppressed or handed back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Log and continue with the next candidate
    #[default]
    Contain,
    /// Return every failure to the caller (useful under a debugger)
    Propagate,
}

impl ErrorPolicy {
    /// Apply the policy to an error raised by `source`
    ///
    /// Returns `Ok(())` when the error was contained and analysis should
    /// continue with the next candidate.
    pub fn contain(self, source: &str, error: AnalysisError) -> Result<(), AnalysisError> {
        match error {
            AnalysisError::Fatal(inner) => Err(*inner),
            AnalysisError::Failed(err) => match self {
                ErrorPolicy::Contain => {
                    warn!(analyzer = source, error = %format!("{:#}", err), "analyzer failed");
                    Ok(())
                }
                ErrorPolicy::Propagate => Err(AnalysisError::Failed(err)),
            },
        }
    }
}

/// A container body that could be opened but not fully read
///
/// Carried in `AnalysisResult::failure` and turned into a classification on
/// the parent node instead of being raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartialFailure {
    #[error("contents are encrypted")]
    Encrypted,

    #[error("contents are incomplete: {0}")]
    Incomplete(String),

    #[error("entry is too large: {size} bytes (max: {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("nesting exceeds the depth limit of {0}")]
    DepthLimit(usize),

    #[error("contents are unreadable: {0}")]
    Unreadable(String),
}

impl PartialFailure {
    /// Classification tag attached to the node of the containing entity
    pub fn tag(&self) -> &'static str {
        match self {
            PartialFailure::Encrypted => "encrypted",
            PartialFailure::Incomplete(_) => "incomplete",
            PartialFailure::TooLarge { .. } => "too-large",
            PartialFailure::DepthLimit(_) => "depth-limit",
            PartialFailure::Unreadable(_) => "unreadable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contain_swallows_failed() {
        let err = AnalysisError::failed("bad header");
        assert!(ErrorPolicy::Contain.contain("zip", err).is_ok());
    }

    #[test]
    fn test_propagate_returns_failed() {
        let err = AnalysisError::failed("bad header");
        let out = ErrorPolicy::Propagate.contain("zip", err);
        assert!(matches!(out, Err(AnalysisError::Failed(_))));
    }

    #[test]
    fn test_fatal_unwraps_one_layer() {
        let err = AnalysisError::fatal(AnalysisError::fatal(AnalysisError::failed("cancelled")));

        let once = ErrorPolicy::Contain.contain("a", err).unwrap_err();
        assert!(once.is_fatal());

        let twice = ErrorPolicy::Contain.contain("b", once).unwrap_err();
        assert!(!twice.is_fatal());

        assert!(ErrorPolicy::Contain.contain("c", twice).is_ok());
    }

    #[test]
    fn test_failed_display_is_transparent() {
        let err = AnalysisError::failed("truncated archive");
        assert_eq!(err.to_string(), "truncated archive");
    }

    #[test]
    fn test_partial_failure_tags() {
        assert_eq!(PartialFailure::Encrypted.tag(), "encrypted");
        assert_eq!(PartialFailure::DepthLimit(4).tag(), "depth-limit");
        assert_eq!(
            PartialFailure::TooLarge { size: 10, max: 5 }.to_string(),
            "entry is too large: 10 bytes (max: 5)"
        );
    }
}
