//! Reader abstraction and the tagged reader configuration.

use std::path::{Path, PathBuf};

use mpi_model::{RawSourceRecord, SourceSystem};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{IngestError, Result};

/// Rows read from one source, in source order.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source_system: SourceSystem,
    pub records: Vec<RawSourceRecord>,
    /// Rows the reader could not turn into a record at all.
    pub skipped_rows: usize,
}

impl SourceBatch {
    pub fn new(source_system: SourceSystem) -> Self {
        Self {
            source_system,
            records: Vec::new(),
            skipped_rows: 0,
        }
    }
}

/// Anything that yields one batch of raw records for a source system.
pub trait RecordSource {
    fn source_system(&self) -> &SourceSystem;

    /// Reads the whole source.
    ///
    /// # Errors
    ///
    /// Returns an [`IngestError`] when the source as a whole cannot be read.
    fn read_batch(&self) -> Result<SourceBatch>;
}

/// Reader configuration, tagged by `format`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case", deny_unknown_fields)]
pub enum SourceFormat {
    Csv {
        path: PathBuf,
        #[serde(default)]
        delimiter: Option<char>,
    },
    Json {
        path: PathBuf,
    },
    SqlDump {
        path: PathBuf,
        table: String,
        /// Column names for `INSERT` statements without a column list.
        #[serde(default)]
        columns: Vec<String>,
    },
}

impl SourceFormat {
    pub fn path(&self) -> &Path {
        match self {
            Self::Csv { path, .. } | Self::Json { path } | Self::SqlDump { path, .. } => path,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Csv { .. } => "csv",
            Self::Json { .. } => "json",
            Self::SqlDump { .. } => "sql_dump",
        }
    }

    /// Rebases a relative path onto `base` (the config file's directory).
    #[must_use]
    pub fn resolve_relative(mut self, base: &Path) -> Self {
        let path = match &mut self {
            Self::Csv { path, .. } | Self::Json { path } | Self::SqlDump { path, .. } => path,
        };
        if path.is_relative() {
            *path = base.join(&*path);
        }
        self
    }
}

/// A reader backed by a file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    source_system: SourceSystem,
    format: SourceFormat,
}

impl FileSource {
    pub fn new(source_system: SourceSystem, format: SourceFormat) -> Self {
        Self {
            source_system,
            format,
        }
    }

    pub fn format(&self) -> &SourceFormat {
        &self.format
    }
}

impl RecordSource for FileSource {
    fn source_system(&self) -> &SourceSystem {
        &self.source_system
    }

    fn read_batch(&self) -> Result<SourceBatch> {
        let path = self.format.path();
        debug!(source = %self.source_system, format = self.format.name(), path = %path.display(), "reading source");
        let batch = match &self.format {
            SourceFormat::Csv { delimiter, .. } => {
                crate::delimited::read_csv(path, &self.source_system, delimiter.unwrap_or(','))?
            }
            SourceFormat::Json { .. } => crate::json::read_json(path, &self.source_system)?,
            SourceFormat::SqlDump { table, columns, .. } => {
                let bytes = std::fs::read(path).map_err(|error| IngestError::read(path, error))?;
                let text = String::from_utf8_lossy(&bytes);
                crate::sql_dump::parse_sql_dump(&text, &self.source_system, table, columns)?
            }
        };
        info!(
            source = %self.source_system,
            records = batch.records.len(),
            skipped = batch.skipped_rows,
            "source read"
        );
        Ok(batch)
    }
}

/// Records already held in memory; used by tests and embedding callers.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    source_system: SourceSystem,
    records: Vec<RawSourceRecord>,
}

impl InMemorySource {
    pub fn new(source_system: SourceSystem, records: Vec<RawSourceRecord>) -> Self {
        Self {
            source_system,
            records,
        }
    }
}

impl RecordSource for InMemorySource {
    fn source_system(&self) -> &SourceSystem {
        &self.source_system
    }

    fn read_batch(&self) -> Result<SourceBatch> {
        Ok(SourceBatch {
            source_system: self.source_system.clone(),
            records: self.records.clone(),
            skipped_rows: 0,
        })
    }
}

/// Builds the reader for a configured source.
pub fn open_source(
    source_system: SourceSystem,
    format: SourceFormat,
) -> Box<dyn RecordSource + Send + Sync> {
    Box::new(FileSource::new(source_system, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_only_relative_paths() {
        let base = Path::new("/etc/mpi");
        let relative = SourceFormat::Json {
            path: PathBuf::from("data/abc.json"),
        };
        assert_eq!(
            relative.resolve_relative(base).path(),
            Path::new("/etc/mpi/data/abc.json")
        );
        let absolute = SourceFormat::Json {
            path: PathBuf::from("/srv/abc.json"),
        };
        assert_eq!(absolute.resolve_relative(base).path(), Path::new("/srv/abc.json"));
    }
}
