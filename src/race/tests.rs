use super::*;
use crate::format::FormatError;
use crate::value::ValueKind;
use crate::xml::{VecTokenSource, XmlError, XmlToken, XmlTokenKind};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn text_tokens(count: usize) -> Vec<Arc<XmlToken>> {
    let mut tokens = vec![Arc::new(XmlToken::new(XmlTokenKind::StartElement, 0).with_name("root"))];
    for i in 0..count {
        tokens.push(Arc::new(
            XmlToken::new(XmlTokenKind::Text, 1).with_value(i.to_string()),
        ));
    }
    tokens.push(Arc::new(XmlToken::new(XmlTokenKind::EndElement, 0).with_name("root")));
    tokens
}

fn document(root: Arc<XmlToken>) -> XmlDocumentInfo {
    XmlDocumentInfo {
        version: None,
        doctype_name: None,
        public_id: None,
        system_id: None,
        root,
    }
}

#[derive(Debug)]
struct Winner(usize);

impl Value for Winner {
    fn kind(&self) -> ValueKind {
        ValueKind::new("test/winner")
    }
}

/// Candidate that reads a fixed number of tokens and records them
struct Recorder {
    name: String,
    limit: usize,
    accept: bool,
    seen: Mutex<Vec<Arc<XmlToken>>>,
}

impl Recorder {
    fn new(name: &str, limit: usize, accept: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            limit,
            accept,
            seen: Mutex::new(Vec::new()),
        })
    }
}

impl XmlFormat for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_document(&self, _document: &XmlDocumentInfo) -> bool {
        true
    }

    fn matches(
        &self,
        source: &mut dyn XmlTokenSource,
        _document: &XmlDocumentInfo,
        _ctx: &MatchContext,
    ) -> Result<Option<Box<dyn Value>>, FormatError> {
        let mut seen = Vec::new();
        while seen.len() < self.limit {
            match source.next_token()? {
                Some(token) => seen.push(token),
                None => break,
            }
        }
        let count = seen.len();
        *self.seen.lock() = seen;
        Ok(self.accept.then(|| Box::new(Winner(count)) as Box<dyn Value>))
    }
}

fn as_formats(recorders: &[Arc<Recorder>]) -> Vec<Arc<dyn XmlFormat>> {
    recorders
        .iter()
        .map(|r| Arc::clone(r) as Arc<dyn XmlFormat>)
        .collect()
}

// ========================================================================
// Race Tests
// ========================================================================

#[test]
fn test_race_three_candidates_share_tokens() {
    let tokens = text_tokens(1200);
    let info = document(Arc::clone(&tokens[0]));
    let recorders = vec![
        Recorder::new("first", 1000, false),
        Recorder::new("second", 1000, true),
        Recorder::new("third", 1000, false),
    ];

    let outcomes = race(
        VecTokenSource::new(tokens.clone()),
        &as_formats(&recorders),
        &info,
        &MatchContext::new(),
        16,
    );

    assert_eq!(outcomes.len(), 3);
    let names: Vec<&str> = outcomes.iter().map(|o| o.candidate.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);

    let kept: Vec<&RaceOutcome> = outcomes
        .iter()
        .filter(|o| matches!(o.result, Ok(Some(_))))
        .collect();
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].candidate, "second");

    let first = recorders[0].seen.lock();
    assert_eq!(first.len(), 1000);
    for recorder in &recorders[1..] {
        let seen = recorder.seen.lock();
        assert_eq!(seen.len(), 1000);
        for (a, b) in first.iter().zip(seen.iter()) {
            // one snapshot per token, shared by every consumer
            assert!(Arc::ptr_eq(a, b));
        }
    }
    for (a, b) in first.iter().zip(tokens.iter()) {
        assert!(Arc::ptr_eq(a, b));
    }
}

#[test]
fn test_race_single_candidate_reads_source_directly() {
    let tokens = text_tokens(10);
    let info = document(Arc::clone(&tokens[0]));
    let recorder = Recorder::new("only", usize::MAX, true);

    let outcomes = race(
        VecTokenSource::new(tokens),
        &as_formats(std::slice::from_ref(&recorder)),
        &info,
        &MatchContext::new(),
        1,
    );

    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0].result, Ok(Some(_))));
    // root, ten texts, end
    assert_eq!(recorder.seen.lock().len(), 12);
}

#[test]
fn test_race_without_candidates() {
    let tokens = text_tokens(3);
    let info = document(Arc::clone(&tokens[0]));
    let outcomes = race(
        VecTokenSource::new(tokens),
        &[],
        &info,
        &MatchContext::new(),
        4,
    );
    assert!(outcomes.is_empty());
}

/// Candidate that panics after its first token
struct Panicking;

impl XmlFormat for Panicking {
    fn name(&self) -> &str {
        "panicking"
    }

    fn check_document(&self, _document: &XmlDocumentInfo) -> bool {
        true
    }

    fn matches(
        &self,
        source: &mut dyn XmlTokenSource,
        _document: &XmlDocumentInfo,
        _ctx: &MatchContext,
    ) -> Result<Option<Box<dyn Value>>, FormatError> {
        source.next_token()?;
        panic!("vocabulary bug");
    }
}

#[test]
fn test_race_panicking_candidate_is_malformed_on_both_paths() {
    let tokens = text_tokens(5);
    let info = document(Arc::clone(&tokens[0]));
    let panicking: Arc<dyn XmlFormat> = Arc::new(Panicking);

    let alone = race(
        VecTokenSource::new(tokens.clone()),
        &[Arc::clone(&panicking)],
        &info,
        &MatchContext::new(),
        2,
    );
    assert_eq!(alone.len(), 1);
    assert!(matches!(&alone[0].result, Err(FormatError::Malformed(m)) if m.contains("panicking")));

    let recorder = Recorder::new("steady", usize::MAX, true);
    let mut candidates = vec![panicking];
    candidates.extend(as_formats(std::slice::from_ref(&recorder)));
    let shared = race(
        VecTokenSource::new(tokens),
        &candidates,
        &info,
        &MatchContext::new(),
        2,
    );
    assert!(matches!(&shared[0].result, Err(FormatError::Malformed(m)) if m.contains("panicking")));
    assert!(matches!(shared[1].result, Ok(Some(_))));
    assert_eq!(recorder.seen.lock().len(), 7);
}

#[test]
fn test_race_uneven_consumers_all_finish() {
    let tokens = text_tokens(500);
    let info = document(Arc::clone(&tokens[0]));
    let recorders = vec![
        Recorder::new("quitter", 3, true),
        Recorder::new("reader", usize::MAX, true),
    ];

    let outcomes = race(
        VecTokenSource::new(tokens),
        &as_formats(&recorders),
        &info,
        &MatchContext::new(),
        2,
    );

    assert!(outcomes.iter().all(|o| matches!(o.result, Ok(Some(_)))));
    assert_eq!(recorders[0].seen.lock().len(), 3);
    assert_eq!(recorders[1].seen.lock().len(), 502);
}

// ========================================================================
// Broadcaster Tests
// ========================================================================

/// Endless source counting how many tokens were pulled from it
struct Counting {
    reads: Arc<AtomicUsize>,
}

impl XmlTokenSource for Counting {
    fn next_token(&mut self) -> Result<Option<Arc<XmlToken>>, XmlError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Arc::new(XmlToken::new(XmlTokenKind::Text, 0).with_value("x"))))
    }
}

#[test]
fn test_broadcaster_backpressure_bounds_reads() {
    let capacity = 4;
    let reads = Arc::new(AtomicUsize::new(0));
    let source = Counting {
        reads: Arc::clone(&reads),
    };
    let (broadcaster, mut readers) = Broadcaster::new(source, 1, capacity);
    let reader = readers.remove(0);

    let handle = std::thread::spawn(move || broadcaster.run());
    std::thread::sleep(Duration::from_millis(100));

    // the queue is full and one more token is blocked in send
    assert!(reads.load(Ordering::SeqCst) <= capacity + 1);
    assert_eq!(reader.pending(), capacity);

    drop(reader);
    let summary = handle.join().unwrap();
    assert!(summary.closed_early);
    assert!(!summary.failed);
}

#[test]
fn test_broadcaster_forwards_source_error() {
    struct Failing(usize);
    impl XmlTokenSource for Failing {
        fn next_token(&mut self) -> Result<Option<Arc<XmlToken>>, XmlError> {
            if self.0 == 0 {
                return Err(XmlError::NoRoot);
            }
            self.0 -= 1;
            Ok(Some(Arc::new(XmlToken::new(XmlTokenKind::Comment, 0))))
        }
    }

    let (broadcaster, readers) = Broadcaster::new(Failing(2), 2, 8);
    let summary = broadcaster.run();
    assert!(summary.failed);
    assert_eq!(summary.tokens, 2);

    for mut reader in readers {
        assert!(reader.next_token().unwrap().is_some());
        assert!(reader.next_token().unwrap().is_some());
        assert_eq!(reader.next_token().unwrap_err(), XmlError::NoRoot);
        // the broadcaster is gone
        assert!(reader.next_token().unwrap().is_none());
    }
}

#[test]
fn test_broadcaster_skips_closed_queue() {
    let tokens = text_tokens(20);
    let (broadcaster, mut readers) = Broadcaster::new(VecTokenSource::new(tokens), 2, 64);
    drop(readers.remove(0));

    let summary = broadcaster.run();
    assert_eq!(summary.tokens, 22);
    assert!(!summary.closed_early);

    let mut survivor = readers.remove(0);
    let mut count = 0;
    while survivor.next_token().unwrap().is_some() {
        count += 1;
    }
    assert_eq!(count, 22);
}
