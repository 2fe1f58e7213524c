//! Output files of an `integrate` run.
//!
//! - `patients.csv`: one row per deduplicated record, with its cluster id
//! - `clusters.json`: duplicate clusters and the pair decisions that formed them
//! - `stats.json`: integration statistics and per-source batch summaries

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use mpi_core::{BatchSummary, FederationOutput, IntegrationStats};
use mpi_link::PairDecision;
use mpi_model::{CanonicalPatientRecord, RecordId, SourceSystem};
use serde::Serialize;

pub const PATIENTS_FILE: &str = "patients.csv";
pub const CLUSTERS_FILE: &str = "clusters.json";
pub const STATS_FILE: &str = "stats.json";

#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub patients: PathBuf,
    pub clusters: PathBuf,
    pub stats: PathBuf,
}

#[derive(Serialize)]
struct PatientRow<'a> {
    record_id: usize,
    cluster_id: Option<usize>,
    source_system: &'a str,
    patient_key: u32,
    given_name: Option<&'a str>,
    family_name: Option<&'a str>,
    maternal_family_name: Option<&'a str>,
    address: Option<&'a str>,
    national_id: Option<&'a str>,
    age: Option<u32>,
    sex: Option<&'static str>,
    phone: Option<&'a str>,
}

impl<'a> PatientRow<'a> {
    fn new(id: usize, cluster_id: Option<usize>, record: &'a CanonicalPatientRecord) -> Self {
        Self {
            record_id: id,
            cluster_id,
            source_system: record.source_system.as_str(),
            patient_key: record.patient_key.get(),
            given_name: record.given_name.as_deref(),
            family_name: record.family_name.as_deref(),
            maternal_family_name: record.maternal_family_name.as_deref(),
            address: record.address.as_deref(),
            national_id: record.national_id.as_deref(),
            age: record.age,
            sex: record.sex.map(|sex| sex.code()),
            phone: record.phone.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct ClusterMember<'a> {
    record_id: RecordId,
    source_system: &'a SourceSystem,
    patient_key: u32,
}

#[derive(Serialize)]
struct ClusterEntry<'a> {
    id: usize,
    source_count: usize,
    members: Vec<ClusterMember<'a>>,
}

#[derive(Serialize)]
struct ClustersDocument<'a> {
    generated_at: DateTime<Utc>,
    clusters: Vec<ClusterEntry<'a>>,
    links: &'a [PairDecision],
}

#[derive(Serialize)]
struct StatsDocument<'a> {
    generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    federation: Option<&'a str>,
    #[serde(flatten)]
    stats: &'a IntegrationStats,
    candidate_pairs: usize,
    batches: &'a [BatchSummary],
}

/// Writes the three output files into `dir`, creating it if needed.
///
/// # Errors
///
/// Fails when the directory or any file cannot be written.
pub fn write_outputs(
    dir: &Path,
    output: &FederationOutput,
    federation: Option<&str>,
    generated_at: DateTime<Utc>,
) -> Result<OutputPaths> {
    fs::create_dir_all(dir).with_context(|| format!("create output dir {}", dir.display()))?;
    let paths = OutputPaths {
        patients: dir.join(PATIENTS_FILE),
        clusters: dir.join(CLUSTERS_FILE),
        stats: dir.join(STATS_FILE),
    };
    write_patients(&paths.patients, output)?;
    write_clusters(&paths.clusters, output, generated_at)?;
    write_json(
        &paths.stats,
        &StatsDocument {
            generated_at,
            federation,
            stats: &output.stats,
            candidate_pairs: output.linkage.candidate_pairs,
            batches: &output.batches,
        },
    )?;
    Ok(paths)
}

fn write_patients(path: &Path, output: &FederationOutput) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for (index, record) in output.records.iter().enumerate() {
        let cluster_id = output.linkage.cluster_of.get(index).copied().flatten();
        writer
            .serialize(PatientRow::new(index, cluster_id, record))
            .with_context(|| format!("write {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(())
}

fn write_clusters(
    path: &Path,
    output: &FederationOutput,
    generated_at: DateTime<Utc>,
) -> Result<()> {
    let clusters = output
        .clusters()
        .iter()
        .map(|cluster| {
            let members: Vec<ClusterMember<'_>> = cluster
                .members
                .iter()
                .filter_map(|&id| {
                    let record = output.records.get(id.index())?;
                    Some(ClusterMember {
                        record_id: id,
                        source_system: &record.source_system,
                        patient_key: record.patient_key.get(),
                    })
                })
                .collect();
            let mut sources: Vec<&SourceSystem> =
                members.iter().map(|member| member.source_system).collect();
            sources.sort();
            sources.dedup();
            ClusterEntry {
                id: cluster.id,
                source_count: sources.len(),
                members,
            }
        })
        .collect();
    write_json(
        path,
        &ClustersDocument {
            generated_at,
            clusters,
            links: output.links(),
        },
    )
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))
}
