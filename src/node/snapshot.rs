use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// A key/value annotation on a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: String,
}

/// Serializable copy of a node subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub properties: Vec<Property>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Indented text rendering, one node per line
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let link = self.link.as_deref().unwrap_or("<root>");
        let _ = write!(out, "{}{}", indent, link);
        if let Some(label) = &self.label {
            if Some(label.as_str()) != self.link.as_deref() {
                let _ = write!(out, " \"{}\"", label);
            }
        }
        if !self.classes.is_empty() {
            let _ = write!(out, " [{}]", self.classes.join(", "));
        }
        out.push('\n');
        for property in &self.properties {
            let _ = writeln!(out, "{}  - {}: {}", indent, property.key, property.value);
        }
        for child in &self.children {
            child.render_into(out, depth + 1);
        }
    }

    /// Number of nodes in this subtree
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(NodeSnapshot::count).sum::<usize>()
    }
}
