mod broadcast;

#[cfg(test)]
mod tests;

pub use broadcast::{BroadcastSummary, Broadcaster, QueuedTokenReader};

use crate::context::MatchContext;
use crate::format::FormatError;
use crate::format::xml::XmlFormat;
use crate::value::Value;
use crate::xml::{XmlDocumentInfo, XmlTokenSource};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace};

/// Default number of tokens a candidate may lag behind the broadcaster
pub const DEFAULT_RACE_CAPACITY: usize = 64;

/// Result of one candidate in a race
#[derive(Debug)]
pub struct RaceOutcome {
    pub candidate: String,
    pub result: Result<Option<Box<dyn Value>>, FormatError>,
}

/// Try every candidate vocabulary against one forward-only token source
///
/// With a single candidate the source is handed over directly. With more,
/// one broadcaster reads the source and each candidate consumes a bounded
/// private queue of shared token snapshots on its own thread. Outcomes are
/// returned in candidate order; every candidate is awaited. A candidate that
/// panics reports a malformed document on either path.
pub fn race<S: XmlTokenSource>(
    source: S,
    candidates: &[Arc<dyn XmlFormat>],
    document: &XmlDocumentInfo,
    ctx: &MatchContext,
    capacity: usize,
) -> Vec<RaceOutcome> {
    match candidates {
        [] => Vec::new(),
        [only] => {
            let mut source = source;
            let result =
                panic::catch_unwind(AssertUnwindSafe(|| only.matches(&mut source, document, ctx)))
                    .unwrap_or_else(|_| Err(panicked(&**only)));
            if let Err(err) = &result {
                debug!(candidate = only.name(), error = %err, "race candidate failed");
            }
            vec![RaceOutcome {
                candidate: only.name().to_string(),
                result,
            }]
        }
        _ => race_concurrent(source, candidates, document, ctx, capacity),
    }
}

fn race_concurrent<S: XmlTokenSource>(
    source: S,
    candidates: &[Arc<dyn XmlFormat>],
    document: &XmlDocumentInfo,
    ctx: &MatchContext,
    capacity: usize,
) -> Vec<RaceOutcome> {
    let (broadcaster, readers) = Broadcaster::new(source, candidates.len(), capacity);
    trace!(candidates = candidates.len(), capacity, "race started");

    thread::scope(|scope| {
        let handles: Vec<_> = candidates
            .iter()
            .zip(readers)
            .map(|(candidate, mut reader)| {
                let candidate = Arc::clone(candidate);
                scope.spawn(move || candidate.matches(&mut reader, document, ctx))
            })
            .collect();

        // The broadcaster runs on this thread and owns the source exclusively.
        let summary = broadcaster.run();
        trace!(
            tokens = summary.tokens,
            closed_early = summary.closed_early,
            "race broadcast finished"
        );

        handles
            .into_iter()
            .zip(candidates)
            .map(|(handle, candidate)| {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| Err(panicked(&**candidate)));
                if let Err(err) = &result {
                    debug!(candidate = candidate.name(), error = %err, "race candidate failed");
                }
                RaceOutcome {
                    candidate: candidate.name().to_string(),
                    result,
                }
            })
            .collect()
    })
}

fn panicked(candidate: &dyn XmlFormat) -> FormatError {
    FormatError::Malformed(format!("candidate {} panicked", candidate.name()))
}
