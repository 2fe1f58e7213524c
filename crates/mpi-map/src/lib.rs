//! Source-to-canonical field mapping.
//!
//! Each source system declares a [`MappingTable`]: rows of
//! `(source_field, canonical_field, transform?)`. [`map_record`] applies a table
//! to one [`RawSourceRecord`](mpi_model::RawSourceRecord); [`map_batch`] applies it
//! to a whole batch while isolating per-record failures.

#![deny(unsafe_code)]

pub mod error;
pub mod mapper;
pub mod table;
pub mod transform;

pub use error::{MappingError, RecordError};
pub use mapper::{MappedBatch, map_batch, map_record};
pub use table::{MappingRule, MappingRuleConfig, MappingTable};
pub use transform::{MappedValue, Transform, ValueKind};
