//! Probabilistic record linkage over canonical patient records.
//!
//! The exact-match layer lives in the deduplicator; this crate finds records
//! that disagree on identifiers but agree closely on secondary attributes:
//!
//! 1. [`block`] partitions records into buckets
//! 2. [`compare`] builds a [`ComparisonVector`] for each candidate pair
//! 3. a [`ClassificationPolicy`] turns the vector into a [`MatchDecision`]
//! 4. linking decisions are merged into [`DuplicateCluster`]s via [`DisjointSet`]
//!
//! [`LinkageEngine::run`] drives all four steps.

#![deny(unsafe_code)]

pub mod blocking;
pub mod classify;
pub mod cluster;
pub mod compare;
pub mod config;
pub mod engine;
pub mod error;
pub mod field;

pub use blocking::{
    Bucket, BlockingKey, BlockingStrategy, CandidatePair, MISSING_KEY, PairScope, block,
    candidate_pairs,
};
pub use classify::{ClassificationPolicy, MatchDecision, MatchOutcome, classify, classify_agreement};
pub use cluster::{DisjointSet, DuplicateCluster, duplicate_clusters};
pub use compare::{Comparator, ComparatorKind, ComparisonEntry, ComparisonVector, compare};
pub use config::{BlockingConfig, BlockingKeyConfig, ComparatorConfig, LinkageConfig, PolicyConfig};
pub use engine::{LinkageEngine, LinkageResult, PairDecision};
pub use error::LinkageConfigError;
pub use field::CompareField;
