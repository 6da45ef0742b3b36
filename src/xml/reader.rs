use super::{XmlError, XmlToken, XmlTokenKind, XmlTokenSource};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use std::collections::VecDeque;
use std::io::BufRead;
use std::sync::Arc;

/// Forward-only token reader over a byte stream
///
/// Empty elements are reported as a start token immediately followed by an
/// end token, so consumers never need to special-case them.
pub struct XmlTokenReader<R: BufRead> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    depth: usize,
    pending_end: Option<Arc<XmlToken>>,
    finished: bool,
}

impl<R: BufRead> XmlTokenReader<R> {
    pub fn new(input: R) -> Self {
        let mut reader = NsReader::from_reader(input);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            depth: 0,
            pending_end: None,
            finished: false,
        }
    }
}

impl<R: BufRead> XmlTokenSource for XmlTokenReader<R> {
    fn next_token(&mut self) -> Result<Option<Arc<XmlToken>>, XmlError> {
        if let Some(end) = self.pending_end.take() {
            return Ok(Some(end));
        }
        if self.finished {
            return Ok(None);
        }

        loop {
            self.buf.clear();
            let position = self.reader.buffer_position() as u64;
            let (resolve, event) = match self.reader.read_resolved_event_into(&mut self.buf) {
                Ok(pair) => pair,
                Err(err) => {
                    self.finished = true;
                    return Err(XmlError::malformed(position, err));
                }
            };
            let depth = self.depth;

            let token = match event {
                Event::Start(start) => {
                    let token = element_token(&start, &resolve, depth, position)?;
                    self.depth += 1;
                    token
                }
                Event::Empty(start) => {
                    let token = element_token(&start, &resolve, depth, position)?;
                    let mut end = XmlToken::new(XmlTokenKind::EndElement, depth)
                        .with_name(token.name.clone());
                    end.prefix = token.prefix.clone();
                    end.namespace = token.namespace.clone();
                    self.pending_end = Some(Arc::new(end));
                    token
                }
                Event::End(end) => {
                    self.depth = self.depth.saturating_sub(1);
                    let mut token = XmlToken::new(XmlTokenKind::EndElement, self.depth)
                        .with_name(lossy(end.local_name().as_ref()));
                    token.prefix = end.name().prefix().map(|p| lossy(p.as_ref()));
                    token.namespace = bound_namespace(&resolve);
                    token
                }
                Event::Text(text) => {
                    let value = match text.unescape() {
                        Ok(value) => value.into_owned(),
                        Err(_) => lossy(&text),
                    };
                    if value.is_empty() {
                        continue;
                    }
                    XmlToken::new(XmlTokenKind::Text, depth).with_value(value)
                }
                Event::CData(data) => XmlToken::new(XmlTokenKind::CData, depth).with_value(lossy(&data)),
                Event::Comment(text) => {
                    XmlToken::new(XmlTokenKind::Comment, depth).with_value(lossy(&text))
                }
                Event::Decl(decl) => {
                    let version = decl
                        .version()
                        .map(|v| lossy(v.as_ref()))
                        .unwrap_or_default();
                    XmlToken::new(XmlTokenKind::Declaration, depth)
                        .with_name("xml")
                        .with_value(version)
                }
                Event::PI(pi) => {
                    let raw = lossy(&pi);
                    let (target, body) = raw
                        .split_once(char::is_whitespace)
                        .unwrap_or((raw.as_str(), ""));
                    XmlToken::new(XmlTokenKind::ProcessingInstruction, depth)
                        .with_name(target)
                        .with_value(body.trim())
                }
                Event::DocType(text) => {
                    XmlToken::new(XmlTokenKind::DocType, depth).with_value(lossy(&text).trim())
                }
                Event::Eof => {
                    self.finished = true;
                    return Ok(None);
                }
                #[allow(unreachable_patterns)]
                _ => continue,
            };
            return Ok(Some(Arc::new(token)));
        }
    }
}

fn element_token(
    start: &BytesStart<'_>,
    resolve: &ResolveResult<'_>,
    depth: usize,
    position: u64,
) -> Result<XmlToken, XmlError> {
    let mut token =
        XmlToken::new(XmlTokenKind::StartElement, depth).with_name(lossy(start.local_name().as_ref()));
    token.prefix = start.name().prefix().map(|p| lossy(p.as_ref()));
    token.namespace = bound_namespace(resolve);

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| XmlError::malformed(position, err))?;
        let key = lossy(attribute.key.as_ref());
        let value = match attribute.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => lossy(&attribute.value),
        };
        token.attributes.push((key, value));
    }
    Ok(token)
}

fn bound_namespace(resolve: &ResolveResult<'_>) -> Option<String> {
    match resolve {
        ResolveResult::Bound(namespace) => Some(lossy(namespace.as_ref())),
        _ => None,
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Replays already consumed tokens before continuing with the inner source
pub struct ReplaySource<S> {
    prefix: VecDeque<Arc<XmlToken>>,
    inner: S,
}

impl<S: XmlTokenSource> ReplaySource<S> {
    pub fn new(prefix: impl IntoIterator<Item = Arc<XmlToken>>, inner: S) -> Self {
        Self {
            prefix: prefix.into_iter().collect(),
            inner,
        }
    }
}

impl<S: XmlTokenSource> XmlTokenSource for ReplaySource<S> {
    fn next_token(&mut self) -> Result<Option<Arc<XmlToken>>, XmlError> {
        match self.prefix.pop_front() {
            Some(token) => Ok(Some(token)),
            None => self.inner.next_token(),
        }
    }
}

/// Token source over an in-memory token list
#[derive(Debug, Default)]
pub struct VecTokenSource {
    tokens: VecDeque<Arc<XmlToken>>,
}

impl VecTokenSource {
    pub fn new(tokens: impl IntoIterator<Item = Arc<XmlToken>>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

impl XmlTokenSource for VecTokenSource {
    fn next_token(&mut self) -> Result<Option<Arc<XmlToken>>, XmlError> {
        Ok(self.tokens.pop_front())
    }
}
