use std::fmt;

/// Kind of a parse event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XmlTokenKind {
    Declaration,
    DocType,
    StartElement,
    EndElement,
    Text,
    CData,
    Comment,
    ProcessingInstruction,
}

/// Immutable snapshot of one parse event
///
/// Carries enough to replay the document without the reader that produced
/// it, so a single token can be shared by every consumer of a broadcast.
#[derive(Clone, PartialEq, Eq)]
pub struct XmlToken {
    pub kind: XmlTokenKind,
    /// Local name for elements, target for processing instructions
    pub name: String,
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    /// Text content, raw DOCTYPE text or declaration body
    pub value: String,
    pub depth: usize,
    pub attributes: Vec<(String, String)>,
}

impl XmlToken {
    pub fn new(kind: XmlTokenKind, depth: usize) -> Self {
        Self {
            kind,
            name: String::new(),
            prefix: None,
            namespace: None,
            value: String::new(),
            depth,
            attributes: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn is_start(&self) -> bool {
        self.kind == XmlTokenKind::StartElement
    }

    pub fn is_end(&self) -> bool {
        self.kind == XmlTokenKind::EndElement
    }

    /// Value of an attribute by qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute lookup ignoring ASCII case of the name
    pub fn attribute_ignore_case(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether this is a start element with the given namespace and local name
    pub fn is_element(&self, namespace: &str, local_name: &str) -> bool {
        self.is_start() && self.namespace.as_deref() == Some(namespace) && self.name == local_name
    }
}

impl fmt::Debug for XmlToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{}", self.kind, self.depth)?;
        if !self.name.is_empty() {
            write!(f, " {}", self.name)?;
        }
        if let Some(ns) = &self.namespace {
            write!(f, " {{{}}}", ns)?;
        }
        if !self.value.is_empty() {
            write!(f, " {:?}", self.value)?;
        }
        Ok(())
    }
}
