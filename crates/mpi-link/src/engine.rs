//! Linkage run: block, compare in parallel, classify, cluster.

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use mpi_model::{CanonicalPatientRecord, RecordId};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::blocking::{BlockingStrategy, Bucket, PairScope, block};
use crate::classify::{ClassificationPolicy, MatchDecision};
use crate::cluster::{DisjointSet, DuplicateCluster, duplicate_clusters};
use crate::compare::{Comparator, ComparisonVector, compare};

/// A classified pair that merged two clusters (match or possible duplicate).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairDecision {
    pub left: RecordId,
    pub right: RecordId,
    pub decision: MatchDecision,
    pub comparison: ComparisonVector,
}

#[derive(Debug, Clone, Default)]
pub struct LinkageResult {
    pub bucket_count: usize,
    pub largest_bucket: usize,
    pub candidate_pairs: usize,
    /// Linking decisions ordered by `(left, right)`.
    pub links: Vec<PairDecision>,
    /// Multi-record clusters in canonical order.
    pub clusters: Vec<DuplicateCluster>,
    /// Cluster id per record; `None` for records that linked to nothing.
    pub cluster_of: Vec<Option<usize>>,
}

impl LinkageResult {
    pub fn cluster_for(&self, id: RecordId) -> Option<&DuplicateCluster> {
        let cluster = (*self.cluster_of.get(id.index())?)?;
        self.clusters.get(cluster)
    }
}

struct Merge {
    set: DisjointSet,
    links: Vec<PairDecision>,
}

/// Configured linkage: comparators, classification policy, blocking and pair scope.
#[derive(Debug, Clone)]
pub struct LinkageEngine {
    comparators: Vec<Comparator>,
    policy: ClassificationPolicy,
    blocking: BlockingStrategy,
    pair_scope: PairScope,
}

impl LinkageEngine {
    pub fn new(
        comparators: Vec<Comparator>,
        policy: ClassificationPolicy,
        blocking: BlockingStrategy,
        pair_scope: PairScope,
    ) -> Self {
        Self {
            comparators,
            policy,
            blocking,
            pair_scope,
        }
    }

    pub fn comparators(&self) -> &[Comparator] {
        &self.comparators
    }

    pub fn policy(&self) -> &ClassificationPolicy {
        &self.policy
    }

    pub fn blocking(&self) -> &BlockingStrategy {
        &self.blocking
    }

    pub fn pair_scope(&self) -> PairScope {
        self.pair_scope
    }

    #[must_use]
    pub fn with_blocking(mut self, blocking: BlockingStrategy) -> Self {
        self.blocking = blocking;
        self
    }

    #[must_use]
    pub fn with_pair_scope(mut self, pair_scope: PairScope) -> Self {
        self.pair_scope = pair_scope;
        self
    }

    /// Compares and classifies a single pair.
    pub fn decide(
        &self,
        a: &CanonicalPatientRecord,
        b: &CanonicalPatientRecord,
    ) -> (ComparisonVector, MatchDecision) {
        let vector = compare(a, b, &self.comparators);
        let decision = self.policy.decide(&vector);
        (vector, decision)
    }

    /// Links `records`, whose positions are their [`RecordId`]s.
    ///
    /// Pairs are compared on the rayon pool; merges into the union-find are
    /// serialized by one mutex. Output is independent of scheduling.
    pub fn run(&self, records: &[CanonicalPatientRecord]) -> LinkageResult {
        let _span = info_span!("linkage", records = records.len()).entered();
        let started = Instant::now();

        let buckets = block(records, &self.blocking);
        let largest_bucket = buckets.iter().map(|bucket| bucket.members.len()).max().unwrap_or(0);
        debug!(
            buckets = buckets.len(),
            largest_bucket,
            max_pairs = buckets.iter().map(Bucket::pair_count).sum::<usize>(),
            "blocking complete"
        );

        let merge = Mutex::new(Merge {
            set: DisjointSet::new(records.len()),
            links: Vec::new(),
        });
        // Pairs are generated per left member inside the parallel pass, never collected.
        let candidate_pairs = buckets
            .par_iter()
            .flat_map(|bucket| {
                (0..bucket.members.len()).into_par_iter().flat_map_iter(move |offset| {
                    bucket.pairs_from(offset, records, self.pair_scope)
                })
            })
            .inspect(|pair| {
                let (comparison, decision) =
                    self.decide(&records[pair.left.index()], &records[pair.right.index()]);
                if !decision.outcome.links() {
                    return;
                }
                let mut merge = merge.lock().unwrap_or_else(PoisonError::into_inner);
                merge.set.union(pair.left, pair.right);
                merge.links.push(PairDecision {
                    left: pair.left,
                    right: pair.right,
                    decision,
                    comparison,
                });
            })
            .count();

        let Merge { mut set, mut links } = merge.into_inner().unwrap_or_else(PoisonError::into_inner);
        links.sort_by_key(|link| (link.left, link.right));
        let clusters = duplicate_clusters(&mut set);
        let mut cluster_of = vec![None; records.len()];
        for cluster in &clusters {
            for member in &cluster.members {
                cluster_of[member.index()] = Some(cluster.id);
            }
        }

        info!(
            pairs = candidate_pairs,
            links = links.len(),
            clusters = clusters.len(),
            duration_ms = started.elapsed().as_millis(),
            "linkage complete"
        );

        LinkageResult {
            bucket_count: buckets.len(),
            largest_bucket,
            candidate_pairs,
            links,
            clusters,
            cluster_of,
        }
    }
}
