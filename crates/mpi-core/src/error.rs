#![deny(unsafe_code)]

use std::path::PathBuf;

use mpi_ingest::IngestError;
use mpi_link::LinkageConfigError;
use mpi_map::MappingError;
use mpi_model::{ModelError, SourceSystem};

/// Invalid federation configuration. Raised by [`FederationConfig::load`](crate::FederationConfig::load)
/// before any source is read.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("unsupported schema_version {0} (expected 1)")]
    UnsupportedSchemaVersion(u32),

    #[error("no sources configured")]
    NoSources,

    #[error("duplicate source name '{0}'")]
    DuplicateSource(String),

    #[error("invalid source name: {0}")]
    SourceName(#[from] ModelError),

    #[error("invalid mapping: {0}")]
    Mapping(#[from] MappingError),

    #[error("invalid linkage section: {0}")]
    Linkage(#[from] LinkageConfigError),
}

/// Failure to ingest one source. The run continues without it.
#[derive(Debug, thiserror::Error)]
pub enum FederationError {
    #[error("source {source_system}: {error}")]
    Ingest {
        source_system: SourceSystem,
        #[source]
        error: IngestError,
    },

    #[error("reader for {reader} was paired with the mapping table of {table}")]
    SourceMismatch {
        reader: SourceSystem,
        table: SourceSystem,
    },
}

impl FederationError {
    pub fn source_system(&self) -> &SourceSystem {
        match self {
            Self::Ingest { source_system, .. } => source_system,
            Self::SourceMismatch { reader, .. } => reader,
        }
    }
}
