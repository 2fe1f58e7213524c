//! Integration report over one federation run.

use std::collections::{BTreeMap, BTreeSet};

use mpi_link::LinkageResult;
use mpi_model::{CanonicalField, CanonicalPatientRecord, PatientKey, SourceSystem};
use serde::Serialize;

use crate::pipeline::BatchSummary;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrationStats {
    /// Records left after deduplication.
    pub total_records: usize,
    pub by_source: BTreeMap<String, usize>,
    /// Deduplicated records whose duplicate cluster spans more than one source.
    pub cross_source_duplicates: usize,
    pub cross_source_clusters: usize,
    /// Patient keys carried by records from more than one source.
    pub shared_patient_keys: usize,
    /// Records with no value, per optional canonical field.
    pub empty_fields: BTreeMap<String, usize>,
    pub unidentifiable_records: usize,
    pub malformed_rows: usize,
    /// Rows the readers could not decode at all.
    pub skipped_rows: usize,
    pub exact_duplicates_removed: usize,
    pub failed_sources: usize,
}

impl IntegrationStats {
    pub fn compute(
        records: &[CanonicalPatientRecord],
        linkage: &LinkageResult,
        batches: &[BatchSummary],
        failed_sources: usize,
    ) -> Self {
        let mut by_source: BTreeMap<String, usize> = batches
            .iter()
            .map(|batch| (batch.source_system.to_string(), 0))
            .collect();
        let mut empty_counts: Vec<(CanonicalField, usize)> =
            CanonicalField::optional_fields().map(|field| (field, 0)).collect();
        let mut key_sources: BTreeMap<PatientKey, BTreeSet<&SourceSystem>> = BTreeMap::new();

        for record in records {
            *by_source.entry(record.source_system.to_string()).or_default() += 1;
            for (field, count) in &mut empty_counts {
                if record.is_empty(*field) {
                    *count += 1;
                }
            }
            key_sources
                .entry(record.patient_key)
                .or_default()
                .insert(&record.source_system);
        }

        let mut cross_source_clusters = 0;
        let mut cross_source_duplicates = 0;
        for cluster in &linkage.clusters {
            let sources: BTreeSet<&SourceSystem> = cluster
                .members
                .iter()
                .filter_map(|id| records.get(id.index()))
                .map(|record| &record.source_system)
                .collect();
            if sources.len() > 1 {
                cross_source_clusters += 1;
                cross_source_duplicates += cluster.len();
            }
        }

        Self {
            total_records: records.len(),
            by_source,
            cross_source_duplicates,
            cross_source_clusters,
            shared_patient_keys: key_sources.values().filter(|sources| sources.len() > 1).count(),
            empty_fields: empty_counts
                .into_iter()
                .map(|(field, count)| (field.as_str().to_string(), count))
                .collect(),
            unidentifiable_records: batches.iter().map(|batch| batch.unidentifiable).sum(),
            malformed_rows: batches.iter().map(|batch| batch.malformed).sum(),
            skipped_rows: batches.iter().map(|batch| batch.skipped_rows).sum(),
            exact_duplicates_removed: batches.iter().map(|batch| batch.exact_duplicates).sum(),
            failed_sources,
        }
    }
}
