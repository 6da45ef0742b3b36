mod snapshot;

#[cfg(test)]
mod tests;

pub use snapshot::{NodeSnapshot, Property};

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// A node of the description tree
///
/// Handles are cheap to clone and every analyzer working on the same entity
/// writes into the same node.
#[derive(Clone)]
pub struct Node {
    inner: Arc<NodeInner>,
}

struct NodeInner {
    id: u64,
    link: Option<String>,
    state: Mutex<NodeState>,
}

#[derive(Default)]
struct NodeState {
    label: Option<String>,
    classes: Vec<String>,
    properties: Vec<Property>,
    children: Vec<Node>,
}

impl Node {
    fn new(id: u64, link: Option<String>) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                id,
                link,
                state: Mutex::new(NodeState::default()),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Name of the edge from the parent to this node
    pub fn link(&self) -> Option<&str> {
        self.inner.link.as_deref()
    }

    pub fn label(&self) -> Option<String> {
        self.inner.state.lock().label.clone()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        self.inner.state.lock().label = Some(label.into());
    }

    /// Set the label unless an analyzer already chose one
    pub fn set_label_if_absent(&self, label: &str) {
        let mut state = self.inner.state.lock();
        if state.label.is_none() {
            state.label = Some(label.to_string());
        }
    }

    /// Add a classification tag (deduplicated)
    pub fn add_class(&self, class: impl Into<String>) {
        let class = class.into();
        let mut state = self.inner.state.lock();
        if !state.classes.contains(&class) {
            state.classes.push(class);
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.inner.state.lock().classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.inner.state.lock().classes.clone()
    }

    /// Append a property; keys may repeat
    pub fn set(&self, key: impl Into<String>, value: impl ToString) {
        self.inner.state.lock().properties.push(Property {
            key: key.into(),
            value: value.to_string(),
        });
    }

    /// First value recorded for `key`
    pub fn property(&self, key: &str) -> Option<String> {
        self.inner
            .state
            .lock()
            .properties
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.clone())
    }

    pub fn children(&self) -> Vec<Node> {
        self.inner.state.lock().children.clone()
    }

    /// Child reached over the edge named `link`
    pub fn child(&self, link: &str) -> Option<Node> {
        self.inner
            .state
            .lock()
            .children
            .iter()
            .find(|c| c.link() == Some(link))
            .cloned()
    }

    /// Follow a path of links from this node
    pub fn descend(&self, path: &[&str]) -> Option<Node> {
        let mut current = self.clone();
        for link in path {
            current = current.child(link)?;
        }
        Some(current)
    }

    fn push_child(&self, child: Node) {
        self.inner.state.lock().children.push(child);
    }

    /// Detached copy of this subtree for serialization
    pub fn snapshot(&self) -> NodeSnapshot {
        let (label, classes, properties, children) = {
            let state = self.inner.state.lock();
            (
                state.label.clone(),
                state.classes.clone(),
                state.properties.clone(),
                state.children.clone(),
            )
        };
        NodeSnapshot {
            id: self.id(),
            link: self.inner.link.clone(),
            label,
            classes,
            properties,
            children: children.iter().map(Node::snapshot).collect(),
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.inner.id)
            .field("link", &self.inner.link)
            .finish_non_exhaustive()
    }
}

/// Creates nodes for one analysis run
#[derive(Clone)]
pub struct NodeFactory {
    inner: Arc<FactoryInner>,
}

struct FactoryInner {
    run_id: Uuid,
    next_id: AtomicU64,
}

impl NodeFactory {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FactoryInner {
                run_id: Uuid::new_v4(),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Identifier of this run, e.g. `urn:uuid:…`
    pub fn run_iri(&self) -> String {
        format!("urn:uuid:{}", self.inner.run_id)
    }

    /// Create the root node of the run
    pub fn root(&self) -> Node {
        let node = Node::new(self.next_id(), None);
        node.set("iri", self.run_iri());
        node
    }

    /// Create a node linked below `parent`
    pub fn create_child(&self, parent: &Node, link: &str) -> Node {
        let child = Node::new(self.next_id(), Some(link.to_string()));
        parent.push_child(child.clone());
        child
    }

    fn next_id(&self) -> u64 {
        self.inner.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl fmt::Debug for NodeFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeFactory")
            .field("run_id", &self.inner.run_id)
            .finish()
    }
}

impl Default for NodeFactory {
    fn default() -> Self {
        Self::new()
    }
}
