use parking_lot::Mutex;
use serde::Serialize;

/// One frame built during an analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameRecord {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    /// Nesting depth of the entity the frame was built for
    pub depth: usize,
    pub entity: String,
    pub analyzers: Vec<String>,
    pub blocking: bool,
}

/// Append-only log of frames, in the order they were built
///
/// Two runs over the same input produce equal journals.
#[derive(Debug, Default)]
pub struct FrameJournal {
    records: Mutex<Vec<FrameRecord>>,
}

impl FrameJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame and return its index
    pub fn record(
        &self,
        parent: Option<usize>,
        depth: usize,
        entity: impl Into<String>,
        analyzers: Vec<String>,
        blocking: bool,
    ) -> usize {
        let mut records = self.records.lock();
        let index = records.len();
        records.push(FrameRecord {
            index,
            parent,
            depth,
            entity: entity.into(),
            analyzers,
            blocking,
        });
        index
    }

    pub fn records(&self) -> Vec<FrameRecord> {
        self.records.lock().clone()
    }

    /// Remove and return everything recorded so far
    pub fn take(&self) -> Vec<FrameRecord> {
        std::mem::take(&mut *self.records.lock())
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
