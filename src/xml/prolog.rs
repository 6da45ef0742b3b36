use super::{XmlError, XmlToken, XmlTokenKind, XmlTokenSource};
use std::sync::Arc;

/// What is known about a document once its root element has been read
///
/// This is the discriminating "header" of an XML document: the DOCTYPE
/// identifiers and the root element's name and namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocumentInfo {
    pub version: Option<String>,
    pub doctype_name: Option<String>,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
    pub root: Arc<XmlToken>,
}

impl XmlDocumentInfo {
    pub fn root_name(&self) -> &str {
        &self.root.name
    }

    pub fn root_namespace(&self) -> Option<&str> {
        self.root.namespace.as_deref()
    }
}

/// Read tokens up to and including the root start element
///
/// Returns the document info and every token consumed, so the caller can
/// replay them to whoever parses the document next.
pub fn read_prolog(
    source: &mut dyn XmlTokenSource,
) -> Result<(XmlDocumentInfo, Vec<Arc<XmlToken>>), XmlError> {
    let mut consumed = Vec::new();
    let mut version = None;
    let mut doctype = DocType::default();

    while let Some(token) = source.next_token()? {
        consumed.push(token.clone());
        match token.kind {
            XmlTokenKind::Declaration => version = Some(token.value.clone()),
            XmlTokenKind::DocType => doctype = DocType::parse(&token.value),
            XmlTokenKind::StartElement => {
                let info = XmlDocumentInfo {
                    version,
                    doctype_name: doctype.name,
                    public_id: doctype.public_id,
                    system_id: doctype.system_id,
                    root: token,
                };
                return Ok((info, consumed));
            }
            XmlTokenKind::Text | XmlTokenKind::CData => {
                return Err(XmlError::Malformed {
                    position: 0,
                    message: "text before the root element".to_string(),
                });
            }
            _ => {}
        }
    }
    Err(XmlError::NoRoot)
}

/// Identifiers declared by a `<!DOCTYPE ...>`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct DocType {
    pub name: Option<String>,
    pub public_id: Option<String>,
    pub system_id: Option<String>,
}

impl DocType {
    /// Parse the text between `<!DOCTYPE` and `>`
    pub fn parse(text: &str) -> Self {
        let (name, rest) = split_word(text);
        let mut doctype = DocType {
            name: (!name.is_empty()).then(|| name.to_string()),
            ..DocType::default()
        };

        let (keyword, rest) = split_word(rest);
        match keyword {
            "PUBLIC" => {
                if let Some((public_id, rest)) = quoted(rest) {
                    doctype.public_id = Some(public_id);
                    doctype.system_id = quoted(rest).map(|(system_id, _)| system_id);
                }
            }
            "SYSTEM" => doctype.system_id = quoted(rest).map(|(system_id, _)| system_id),
            _ => {}
        }
        doctype
    }
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(|c: char| c.is_whitespace() || c == '[') {
        Some(end) => (&text[..end], &text[end..]),
        None => (text, ""),
    }
}

fn quoted(text: &str) -> Option<(String, &str)> {
    let text = text.trim_start();
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &text[1..];
    let end = body.find(quote)?;
    Some((body[..end].to_string(), &body[end + 1..]))
}
