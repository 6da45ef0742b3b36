use crate::error::PartialFailure;
use crate::node::Node;

/// Outcome of analyzing one value
///
/// A `None` node means the analyzer declined and the next candidate should
/// be tried. `failure` reports a partially readable container body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisResult {
    pub node: Option<Node>,
    pub label: Option<String>,
    pub failure: Option<PartialFailure>,
}

impl AnalysisResult {
    pub fn declined() -> Self {
        Self::default()
    }

    /// Claim the value, described in `node`
    pub fn claimed(node: Node) -> Self {
        Self {
            node: Some(node),
            ..Self::default()
        }
    }

    /// Claim the value but report that it could only be read partially
    pub fn partial(node: Node, failure: PartialFailure) -> Self {
        Self {
            node: Some(node),
            label: None,
            failure: Some(failure),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_failure(mut self, failure: PartialFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn is_declined(&self) -> bool {
        self.node.is_none()
    }

    /// Combine with a later result; fields already set here win
    pub fn merge(self, later: AnalysisResult) -> AnalysisResult {
        AnalysisResult {
            node: self.node.or(later.node),
            label: self.label.or(later.label),
            failure: self.failure.or(later.failure),
        }
    }
}
