//! Error types for source ingestion.

use std::path::PathBuf;

use mpi_model::ModelError;
use thiserror::Error;

/// Errors that abort reading a whole source.
///
/// Row-level problems (bad CSV records, SQL tuples of the wrong arity, JSON
/// elements that are not objects) never surface here; readers skip and count them.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Source file not found.
    #[error("source file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV header row could not be read.
    #[error("failed to read CSV header: {0}")]
    CsvHeader(#[source] csv::Error),

    /// CSV delimiter must be a single ASCII character.
    #[error("invalid CSV delimiter {0:?}")]
    InvalidDelimiter(char),

    /// JSON document could not be parsed.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON document is valid but not an array of records.
    #[error("JSON source must be an array of objects")]
    NotAnArray,

    /// SQL dump text could not be tokenized.
    #[error("SQL dump line {line}: {message}")]
    SqlLex { line: usize, message: String },

    /// SQL dump statement could not be parsed.
    #[error("SQL dump line {line}: {message}")]
    SqlParse { line: usize, message: String },

    /// No column names for a dump table: the INSERT has no column list and none were configured.
    #[error("no column names for table '{table}'")]
    MissingColumns { table: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl IngestError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::FileRead { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
