//! Federation pipeline.
//!
//! Batches are admitted one at a time, each fully mapped and deduplicated
//! before the next, so every batch sees a complete "existing" set. Linkage runs
//! once over the accumulated records.
//!
//! ```ignore
//! let mut pipeline = FederationPipeline::new(config.engine.clone());
//! for source in &config.sources {
//!     let reader = open_source(source.source_system().clone(), source.reader.clone());
//!     pipeline.ingest(reader.as_ref(), &source.table);
//! }
//! let output = pipeline.finish();
//! ```

use std::time::Instant;

use mpi_ingest::{RecordSource, SourceBatch, open_source};
use mpi_link::{DuplicateCluster, LinkageEngine, LinkageResult, PairDecision};
use mpi_map::{MappingTable, RecordError, map_batch};
use mpi_model::{CanonicalPatientRecord, SourceSystem};
use serde::Serialize;
use tracing::{info, info_span, warn};

use crate::config::FederationConfig;
use crate::dedup::Deduplicator;
use crate::error::FederationError;
use crate::stats::IntegrationStats;

/// Counts for one admitted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub source_system: SourceSystem,
    /// Records produced by the reader.
    pub read: usize,
    pub skipped_rows: usize,
    pub mapped: usize,
    pub unidentifiable: usize,
    pub malformed: usize,
    pub exact_duplicates: usize,
    pub admitted: usize,
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct FederationOutput {
    /// Deduplicated canonical records; positions are the linkage record ids.
    pub records: Vec<CanonicalPatientRecord>,
    pub linkage: LinkageResult,
    pub stats: IntegrationStats,
    pub batches: Vec<BatchSummary>,
    pub record_errors: Vec<RecordError>,
}

impl FederationOutput {
    pub fn clusters(&self) -> &[DuplicateCluster] {
        &self.linkage.clusters
    }

    pub fn links(&self) -> &[PairDecision] {
        &self.linkage.links
    }
}

pub struct FederationPipeline {
    engine: LinkageEngine,
    deduplicator: Deduplicator,
    batches: Vec<BatchSummary>,
    record_errors: Vec<RecordError>,
    failures: Vec<FederationError>,
}

impl FederationPipeline {
    pub fn new(engine: LinkageEngine) -> Self {
        Self {
            engine,
            deduplicator: Deduplicator::new(),
            batches: Vec::new(),
            record_errors: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Maps and deduplicates one batch against everything admitted so far.
    pub fn admit(&mut self, batch: &SourceBatch, table: &MappingTable) -> BatchSummary {
        let _span = info_span!("admit", source_system = %table.source_system()).entered();
        let mapped = map_batch(&batch.records, table);
        let mapped_count = mapped.records.len();
        let unidentifiable = mapped.unidentifiable_count();
        let malformed = mapped.malformed_count();
        self.record_errors.extend(mapped.failures);
        let before = self.deduplicator.len();
        let exact_duplicates = self.deduplicator.admit(mapped.records);

        let summary = BatchSummary {
            source_system: table.source_system().clone(),
            read: batch.records.len(),
            skipped_rows: batch.skipped_rows,
            mapped: mapped_count,
            unidentifiable,
            malformed,
            exact_duplicates,
            admitted: self.deduplicator.len() - before,
        };
        info!(
            read = summary.read,
            mapped = summary.mapped,
            exact_duplicates = summary.exact_duplicates,
            admitted = summary.admitted,
            "batch admitted"
        );
        self.batches.push(summary.clone());
        summary
    }

    /// Reads a source and admits it. A failed read is logged and recorded; the run goes on.
    pub fn ingest(&mut self, source: &dyn RecordSource, table: &MappingTable) -> Option<BatchSummary> {
        if source.source_system() != table.source_system() {
            let failure = FederationError::SourceMismatch {
                reader: source.source_system().clone(),
                table: table.source_system().clone(),
            };
            warn!(%failure, "source skipped");
            self.failures.push(failure);
            return None;
        }
        match source.read_batch() {
            Ok(batch) => Some(self.admit(&batch, table)),
            Err(error) => {
                let failure = FederationError::Ingest {
                    source_system: source.source_system().clone(),
                    error,
                };
                warn!(%failure, "source skipped");
                self.failures.push(failure);
                None
            }
        }
    }

    pub fn records(&self) -> &[CanonicalPatientRecord] {
        self.deduplicator.records()
    }

    pub fn batches(&self) -> &[BatchSummary] {
        &self.batches
    }

    pub fn failures(&self) -> &[FederationError] {
        &self.failures
    }

    /// Runs linkage over the admitted records and builds the report.
    ///
    /// Returns the output together with the sources that could not be read.
    pub fn finish(self) -> (FederationOutput, Vec<FederationError>) {
        let records = self.deduplicator.into_records();
        let linkage = self.engine.run(&records);
        let stats = IntegrationStats::compute(&records, &linkage, &self.batches, self.failures.len());
        info!(
            total_records = stats.total_records,
            cross_source_duplicates = stats.cross_source_duplicates,
            shared_patient_keys = stats.shared_patient_keys,
            "federation complete"
        );
        (
            FederationOutput {
                records,
                linkage,
                stats,
                batches: self.batches,
                record_errors: self.record_errors,
            },
            self.failures,
        )
    }
}

/// Reads every configured source in order and runs the whole pipeline.
pub fn run_federation(config: &FederationConfig) -> (FederationOutput, Vec<FederationError>) {
    let _span = info_span!("federation", sources = config.sources.len()).entered();
    let started = Instant::now();
    let mut pipeline = FederationPipeline::new(config.engine.clone());
    for source in &config.sources {
        let reader = open_source(source.source_system().clone(), source.reader.clone());
        pipeline.ingest(reader.as_ref(), &source.table);
    }
    let result = pipeline.finish();
    info!(duration_ms = started.elapsed().as_millis(), "run finished");
    result
}
