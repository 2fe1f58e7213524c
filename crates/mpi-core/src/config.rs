//! Federation configuration file.
//!
//! ```toml
//! [federation]
//! schema_version = 1
//!
//! [[sources]]
//! name = "Siglo21"
//! reader = { format = "sql_dump", path = "siglo21.sql", table = "Pacientes" }
//! mapping = [
//!     { source_field = "NSS", canonical_field = "patient_key" },
//!     { source_field = "NOMBRE", canonical_field = "given_name", transform = "normalize" },
//! ]
//!
//! [linkage]
//! pair_scope = "all"
//! ```

#![deny(unsafe_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use mpi_ingest::SourceFormat;
use mpi_link::{LinkageConfig, LinkageEngine};
use mpi_map::{MappingRuleConfig, MappingTable};
use mpi_model::SourceSystem;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FederationFile {
    pub federation: FederationHeader,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub linkage: Option<LinkageConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FederationHeader {
    pub schema_version: u32,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub name: String,
    pub reader: SourceFormat,
    pub mapping: Vec<MappingRuleConfig>,
}

/// A source with its reader and validated mapping table.
#[derive(Debug, Clone)]
pub struct ConfiguredSource {
    pub table: MappingTable,
    pub reader: SourceFormat,
}

impl ConfiguredSource {
    pub fn source_system(&self) -> &SourceSystem {
        self.table.source_system()
    }
}

/// Fully validated configuration.
#[derive(Debug, Clone)]
pub struct FederationConfig {
    pub name: Option<String>,
    pub sources: Vec<ConfiguredSource>,
    pub linkage: LinkageConfig,
    pub engine: LinkageEngine,
}

impl FederationConfig {
    /// Loads and validates a config file; reader paths resolve against its directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or when any
    /// section is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FederationFile = toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        let base = path.parent().map_or_else(PathBuf::new, Path::to_path_buf);
        Self::from_file(file, &base)
    }

    /// Validates an already-parsed file.
    ///
    /// # Errors
    ///
    /// See [`FederationConfig::load`].
    pub fn from_file(file: FederationFile, base: &Path) -> Result<Self, ConfigError> {
        if file.federation.schema_version != SCHEMA_VERSION {
            return Err(ConfigError::UnsupportedSchemaVersion(
                file.federation.schema_version,
            ));
        }
        if file.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }

        let mut names = BTreeSet::new();
        let mut sources = Vec::with_capacity(file.sources.len());
        for source in file.sources {
            let system = SourceSystem::new(source.name)?;
            if !names.insert(system.as_str().to_ascii_lowercase()) {
                return Err(ConfigError::DuplicateSource(system.to_string()));
            }
            let table = MappingTable::new(system, &source.mapping)?;
            debug!(source = %table.source_system(), rules = table.rules().len(), "mapping table loaded");
            sources.push(ConfiguredSource {
                table,
                reader: source.reader.resolve_relative(base),
            });
        }

        let linkage = file.linkage.unwrap_or_default();
        let engine = linkage.build()?;

        Ok(Self {
            name: file.federation.name,
            sources,
            linkage,
            engine,
        })
    }
}
