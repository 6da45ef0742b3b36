use super::MatchContext;
use crate::node::{Node, NodeFactory};

/// Everything an analyzer needs besides the value itself
///
/// Passed by reference and derived, never mutated: `with_*` and
/// [`AnalysisContext::child`] return new contexts.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    node: Node,
    parent_link: Option<String>,
    nodes: NodeFactory,
    match_context: MatchContext,
    depth: usize,
}

impl AnalysisContext {
    /// Context for a top-level input, writing into `node`
    pub fn new(nodes: NodeFactory, node: Node) -> Self {
        Self {
            node,
            parent_link: None,
            nodes,
            match_context: MatchContext::new(),
            depth: 0,
        }
    }

    /// Node the current value is described in
    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn parent_link(&self) -> Option<&str> {
        self.parent_link.as_deref()
    }

    pub fn nodes(&self) -> &NodeFactory {
        &self.nodes
    }

    pub fn match_context(&self) -> &MatchContext {
        &self.match_context
    }

    /// Nesting depth below the top-level input
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn with_node(&self, node: Node) -> Self {
        Self {
            node,
            ..self.clone()
        }
    }

    pub fn with_parent_link(&self, link: impl Into<String>) -> Self {
        Self {
            parent_link: Some(link.into()),
            ..self.clone()
        }
    }

    pub fn with_match_context(&self, match_context: MatchContext) -> Self {
        Self {
            match_context,
            ..self.clone()
        }
    }

    /// Context for a nested entity: a fresh node linked below the current one
    pub fn child(&self, link: &str) -> Self {
        let node = self.nodes.create_child(&self.node, link);
        Self {
            node,
            parent_link: Some(link.to_string()),
            nodes: self.nodes.clone(),
            match_context: self.match_context.clone(),
            depth: self.depth + 1,
        }
    }
}
