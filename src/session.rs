//! In-memory review session.
//!
//! Records accumulate across several loads (one per uploaded export) and
//! are rendered together as one numbered batch. Nothing is persisted.

use crate::models::ClinicalRecord;
use crate::pipeline::{build_batch, ReviewOptions};

#[derive(Debug, Default)]
pub struct ReviewSession {
    records: Vec<ClinicalRecord>,
}

impl ReviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ClinicalRecord) {
        self.records.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ClinicalRecord>) {
        let before = self.records.len();
        self.records.extend(records);
        tracing::debug!(added = self.records.len() - before, total = self.records.len(), "Session extended");
    }

    pub fn records(&self) -> &[ClinicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The numbered batch text for everything collected so far.
    pub fn render(&self, options: &ReviewOptions) -> String {
        build_batch(&self.records, options)
    }

    pub fn clear(&mut self) {
        tracing::debug!(dropped = self.records.len(), "Session cleared");
        self.records.clear();
    }
}
