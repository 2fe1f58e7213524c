//! Exact-match deduplication on [`CompositeKey`].

use std::collections::HashSet;

use mpi_model::{CanonicalPatientRecord, CompositeKey};

/// Accumulated canonical set; keeps the first record seen per composite key.
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    seen: HashSet<CompositeKey>,
    records: Vec<CanonicalPatientRecord>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the records whose key is new, in order. Returns how many were dropped.
    pub fn admit<I>(&mut self, incoming: I) -> usize
    where
        I: IntoIterator<Item = CanonicalPatientRecord>,
    {
        let mut dropped = 0;
        for record in incoming {
            if self.seen.insert(record.composite_key()) {
                self.records.push(record);
            } else {
                dropped += 1;
            }
        }
        dropped
    }

    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.seen.contains(key)
    }

    pub fn records(&self) -> &[CanonicalPatientRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<CanonicalPatientRecord> {
        self.records
    }
}

/// `existing ++ incoming` with later duplicates removed, first-seen order kept.
pub fn dedup(
    existing: &[CanonicalPatientRecord],
    incoming: &[CanonicalPatientRecord],
) -> Vec<CanonicalPatientRecord> {
    let mut deduplicator = Deduplicator::new();
    deduplicator.admit(existing.iter().cloned());
    deduplicator.admit(incoming.iter().cloned());
    deduplicator.into_records()
}
