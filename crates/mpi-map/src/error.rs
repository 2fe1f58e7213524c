//! Error types for mapping operations.

use mpi_model::{CanonicalField, ModelError, SourceSystem};
use thiserror::Error;

/// An invalid mapping table. Always raised at load time, before any record is mapped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("{source_system}: unknown transform '{transform}' on source field '{source_field}'")]
    UnknownTransform {
        source_system: SourceSystem,
        source_field: String,
        transform: String,
    },
    #[error("{source_system}: unknown canonical field '{field}'")]
    UnknownCanonicalField {
        source_system: SourceSystem,
        field: String,
    },
    #[error("{source_system}: transform '{transform}' cannot populate canonical field '{field}'")]
    IncompatibleTransform {
        source_system: SourceSystem,
        field: CanonicalField,
        transform: &'static str,
    },
    #[error("{source_system}: canonical field '{field}' is mapped more than once")]
    DuplicateTarget {
        source_system: SourceSystem,
        field: CanonicalField,
    },
    #[error("{source_system}: no rule populates patient_key")]
    MissingPatientKeyRule { source_system: SourceSystem },
    #[error("{source_system}: empty source field name for canonical field '{field}'")]
    EmptySourceField {
        source_system: SourceSystem,
        field: CanonicalField,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A single raw record that could not be mapped. Counted, never fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("{source_system} row {ordinal}: unidentifiable record (no usable patient key)")]
    Unidentifiable {
        source_system: SourceSystem,
        ordinal: usize,
    },
    #[error("{source_system} row {ordinal}: required source field '{field}' is missing or yields no value")]
    MalformedRow {
        source_system: SourceSystem,
        ordinal: usize,
        field: String,
    },
}

impl RecordError {
    pub fn ordinal(&self) -> usize {
        match self {
            Self::Unidentifiable { ordinal, .. } | Self::MalformedRow { ordinal, .. } => *ordinal,
        }
    }

    pub fn is_unidentifiable(&self) -> bool {
        matches!(self, Self::Unidentifiable { .. })
    }
}
