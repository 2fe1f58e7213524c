//! Delimited text reader.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use mpi_model::{RawSourceRecord, RawValue, SourceSystem};
use tracing::warn;

use crate::error::{IngestError, Result};
use crate::source::SourceBatch;

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_blank_row(row: &StringRecord) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Reads CSV text with a header row.
///
/// Empty cells become [`RawValue::Null`]. Short rows leave the trailing fields
/// absent, extra cells are ignored, and blank rows are dropped. Records the
/// CSV parser rejects are skipped and counted.
///
/// # Errors
///
/// Fails on a non-ASCII delimiter or an unreadable header row.
pub fn parse_csv(text: &str, source_system: &SourceSystem, delimiter: char) -> Result<SourceBatch> {
    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(IngestError::InvalidDelimiter(delimiter))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(IngestError::CsvHeader)?
        .iter()
        .map(normalize_header)
        .collect();

    let mut batch = SourceBatch::new(source_system.clone());
    let mut ordinal = 0usize;
    for (index, row) in reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(error) => {
                warn!(source = %source_system, row = index + 1, %error, "skipping unreadable CSV row");
                batch.skipped_rows += 1;
                continue;
            }
        };
        if is_blank_row(&row) {
            continue;
        }
        let mut record = RawSourceRecord::new(source_system.clone(), ordinal);
        for (header, cell) in headers.iter().zip(row.iter()) {
            if header.is_empty() {
                continue;
            }
            record.insert(header.clone(), RawValue::from_cell(cell.trim()));
        }
        batch.records.push(record);
        ordinal += 1;
    }
    Ok(batch)
}

/// Reads a CSV file.
///
/// # Errors
///
/// See [`parse_csv`]; also fails when the file cannot be read.
pub fn read_csv(path: &Path, source_system: &SourceSystem, delimiter: char) -> Result<SourceBatch> {
    let bytes = std::fs::read(path).map_err(|error| IngestError::read(path, error))?;
    let text = String::from_utf8_lossy(&bytes);
    parse_csv(&text, source_system, delimiter)
}
