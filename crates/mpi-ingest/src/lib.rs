//! Source readers for the patient federation.
//!
//! Each reader turns one source into a [`SourceBatch`] of
//! [`RawSourceRecord`](mpi_model::RawSourceRecord)s. Nothing downstream sees
//! file formats or dump syntax.

#![deny(unsafe_code)]

pub mod delimited;
pub mod error;
pub mod json;
pub mod source;
pub mod sql_dump;

pub use delimited::{parse_csv, read_csv};
pub use error::{IngestError, Result};
pub use json::{parse_json, read_json};
pub use source::{FileSource, InMemorySource, RecordSource, SourceBatch, SourceFormat, open_source};
pub use sql_dump::{InsertStatement, SqlValue, parse_sql_dump};
