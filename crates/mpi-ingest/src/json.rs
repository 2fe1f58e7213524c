//! JSON array reader.

use std::path::Path;

use mpi_model::{RawSourceRecord, RawValue, SourceSystem};
use serde_json::Value;
use tracing::warn;

use crate::error::{IngestError, Result};
use crate::source::SourceBatch;

fn cell(value: &Value) -> RawValue {
    match value {
        Value::Null => RawValue::Null,
        Value::String(text) => RawValue::from_cell(text),
        Value::Bool(flag) => RawValue::Text(flag.to_string()),
        Value::Number(number) => RawValue::Text(number.to_string()),
        nested => RawValue::Text(nested.to_string()),
    }
}

/// Reads a JSON array of objects. Non-object elements are skipped and counted.
///
/// # Errors
///
/// Fails when the text is not valid JSON or the top level is not an array.
pub fn parse_json(text: &str, source_system: &SourceSystem) -> Result<SourceBatch> {
    let document: Value = serde_json::from_str(text)?;
    let Value::Array(elements) = document else {
        return Err(IngestError::NotAnArray);
    };

    let mut batch = SourceBatch::new(source_system.clone());
    for (index, element) in elements.iter().enumerate() {
        let Value::Object(fields) = element else {
            warn!(source = %source_system, index, "skipping non-object JSON element");
            batch.skipped_rows += 1;
            continue;
        };
        let mut record = RawSourceRecord::new(source_system.clone(), index);
        for (name, value) in fields {
            record.insert(name.clone(), cell(value));
        }
        batch.records.push(record);
    }
    Ok(batch)
}

/// Reads a JSON file.
///
/// # Errors
///
/// See [`parse_json`]; also fails when the file cannot be read.
pub fn read_json(path: &Path, source_system: &SourceSystem) -> Result<SourceBatch> {
    let text = std::fs::read_to_string(path).map_err(|error| IngestError::read(path, error))?;
    parse_json(&text, source_system)
}
