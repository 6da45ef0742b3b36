use crate::xml::{XmlError, XmlToken, XmlTokenSource};
use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;

type Item = Result<Arc<XmlToken>, XmlError>;

/// Single owner of a token source fanning tokens out to bounded queues
///
/// Every token is converted into one shared snapshot and enqueued to each
/// open queue before the next token is read, so a slow consumer holds the
/// whole broadcast back instead of forcing unbounded buffering.
pub struct Broadcaster<S> {
    source: S,
    outlets: Vec<Option<Sender<Item>>>,
}

/// What a finished broadcast did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastSummary {
    /// Tokens read from the source and offered to consumers
    pub tokens: usize,
    /// The broadcast stopped because every consumer went away
    pub closed_early: bool,
    /// The source failed; the error was forwarded to open consumers
    pub failed: bool,
}

impl<S: XmlTokenSource> Broadcaster<S> {
    /// Create a broadcaster with `consumers` queues of `capacity` tokens each
    pub fn new(source: S, consumers: usize, capacity: usize) -> (Self, Vec<QueuedTokenReader>) {
        let capacity = capacity.max(1);
        let mut outlets = Vec::with_capacity(consumers);
        let mut readers = Vec::with_capacity(consumers);
        for _ in 0..consumers {
            let (tx, rx) = bounded(capacity);
            outlets.push(Some(tx));
            readers.push(QueuedTokenReader { queue: rx });
        }
        (Self { source, outlets }, readers)
    }

    /// Feed all consumers until the source ends or every queue is closed
    ///
    /// Dropping the broadcaster at the end closes the remaining queues, which
    /// consumers observe as end of document.
    pub fn run(mut self) -> BroadcastSummary {
        let mut summary = BroadcastSummary {
            tokens: 0,
            closed_early: false,
            failed: false,
        };

        loop {
            if self.outlets.iter().all(Option::is_none) {
                summary.closed_early = true;
                break;
            }

            let item = match self.source.next_token() {
                Ok(Some(token)) => Ok(token),
                Ok(None) => break,
                Err(err) => Err(err),
            };
            let failed = item.is_err();

            for outlet in self.outlets.iter_mut() {
                let closed = match outlet {
                    Some(tx) => tx.send(item.clone()).is_err(),
                    None => false,
                };
                if closed {
                    *outlet = None;
                }
            }

            if failed {
                summary.failed = true;
                break;
            }
            summary.tokens += 1;
        }
        summary
    }
}

/// Consumer view of a broadcast, usable wherever a token source is expected
pub struct QueuedTokenReader {
    queue: Receiver<Item>,
}

impl QueuedTokenReader {
    /// Tokens waiting in this consumer's queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl XmlTokenSource for QueuedTokenReader {
    fn next_token(&mut self) -> Result<Option<Arc<XmlToken>>, XmlError> {
        match self.queue.recv() {
            Ok(item) => item.map(Some),
            // broadcaster finished and dropped the sender
            Err(_) => Ok(None),
        }
    }
}
