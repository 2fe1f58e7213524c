//! Blocking index: partitions records so only bucket-mates are compared.

use std::collections::BTreeMap;

use mpi_model::{CanonicalPatientRecord, RecordId};
use serde::{Deserialize, Serialize};

use crate::field::CompareField;

/// Bucket key used for records whose blocking value is missing.
pub const MISSING_KEY: &str = "<missing>";

/// One component of a compound blocking key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockingKey {
    pub field: CompareField,
    /// Only the first `prefix` characters of the normalized value are used.
    pub prefix: Option<usize>,
}

impl BlockingKey {
    pub fn new(field: impl Into<CompareField>) -> Self {
        Self {
            field: field.into(),
            prefix: None,
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: usize) -> Self {
        self.prefix = Some(prefix);
        self
    }

    fn value(&self, record: &CanonicalPatientRecord) -> String {
        match self.field.text(record) {
            Some(text) => match self.prefix {
                Some(len) => text.chars().take(len).collect(),
                None => text,
            },
            None => MISSING_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockingStrategy {
    /// A single bucket holding every record (exhaustive comparison).
    Full,
    /// Records sharing every key value land in the same bucket.
    Keys(Vec<BlockingKey>),
}

impl BlockingStrategy {
    pub fn on(field: impl Into<CompareField>) -> Self {
        Self::Keys(vec![BlockingKey::new(field)])
    }

    fn bucket_key(&self, record: &CanonicalPatientRecord) -> String {
        match self {
            Self::Full => String::new(),
            Self::Keys(keys) => keys
                .iter()
                .map(|key| key.value(record))
                .collect::<Vec<_>>()
                .join("|"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub key: String,
    /// Members in ascending record order.
    pub members: Vec<RecordId>,
}

impl Bucket {
    /// Number of unordered pairs inside the bucket.
    pub fn pair_count(&self) -> usize {
        let n = self.members.len();
        n * n.saturating_sub(1) / 2
    }

    /// Lazily yields the bucket's pairs in `scope`, in ascending order.
    pub fn pairs<'a>(
        &'a self,
        records: &'a [CanonicalPatientRecord],
        scope: PairScope,
    ) -> impl Iterator<Item = CandidatePair> + 'a {
        (0..self.members.len()).flat_map(move |offset| self.pairs_from(offset, records, scope))
    }

    /// Pairs whose left record is the `offset`-th member.
    pub fn pairs_from<'a>(
        &'a self,
        offset: usize,
        records: &'a [CanonicalPatientRecord],
        scope: PairScope,
    ) -> impl Iterator<Item = CandidatePair> + 'a {
        let left = self.members[offset];
        self.members[offset + 1..]
            .iter()
            .map(move |&right| CandidatePair { left, right })
            .filter(move |pair| match scope {
                PairScope::All => true,
                PairScope::CrossSource => {
                    records[pair.left.index()].source_system
                        != records[pair.right.index()].source_system
                }
            })
    }
}

/// Which candidate pairs inside a bucket are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairScope {
    #[default]
    All,
    /// Only pairs whose records come from different source systems.
    CrossSource,
}

/// An unordered pair, stored with `left < right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidatePair {
    pub left: RecordId,
    pub right: RecordId,
}

/// Partitions `records`; every record lands in exactly one bucket.
///
/// Buckets are ordered by key. Empty input yields no buckets.
pub fn block(records: &[CanonicalPatientRecord], strategy: &BlockingStrategy) -> Vec<Bucket> {
    let mut buckets: BTreeMap<String, Vec<RecordId>> = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        buckets
            .entry(strategy.bucket_key(record))
            .or_default()
            .push(RecordId::new(index));
    }
    buckets
        .into_iter()
        .map(|(key, members)| Bucket { key, members })
        .collect()
}

/// Collects the pairs to compare, bucket by bucket.
///
/// [`LinkageEngine::run`](crate::LinkageEngine::run) streams [`Bucket::pairs`]
/// instead of materializing this list.
pub fn candidate_pairs(
    buckets: &[Bucket],
    records: &[CanonicalPatientRecord],
    scope: PairScope,
) -> Vec<CandidatePair> {
    buckets
        .iter()
        .flat_map(|bucket| bucket.pairs(records, scope))
        .collect()
}
