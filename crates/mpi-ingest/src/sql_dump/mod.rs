//! Reads patient rows out of MySQL-style `INSERT` dumps.

pub mod lexer;
pub mod parser;

use mpi_model::{RawSourceRecord, RawValue, SourceSystem};
use tracing::{debug, warn};

use crate::error::{IngestError, Result};
use crate::source::SourceBatch;

pub use parser::{InsertStatement, SqlValue};

impl SqlValue {
    fn into_raw(self) -> RawValue {
        match self {
            Self::Text(text) => RawValue::from_cell(&text),
            Self::Number(number) | Self::Other(number) => RawValue::Text(number),
            Self::Null => RawValue::Null,
        }
    }
}

/// Collects the rows of every `INSERT` into `table` (matched case-insensitively).
///
/// Column names come from the statement's own column list, falling back to
/// `columns`. Tuples whose arity differs from the column count are skipped and
/// counted in [`SourceBatch::skipped_rows`].
///
/// # Errors
///
/// Fails when the dump cannot be tokenized or parsed, or when a matching
/// statement has no column list and `columns` is empty.
pub fn parse_sql_dump(
    text: &str,
    source_system: &SourceSystem,
    table: &str,
    columns: &[String],
) -> Result<SourceBatch> {
    let tokens = lexer::tokenize(text)?;
    let statements = parser::parse_inserts(&tokens)?;

    let mut batch = SourceBatch::new(source_system.clone());
    let mut ordinal = 0usize;
    for statement in statements {
        if !statement.table.eq_ignore_ascii_case(table) {
            debug!(table = %statement.table, "skipping insert into other table");
            continue;
        }
        let names: &[String] = match &statement.columns {
            Some(names) => names,
            None if !columns.is_empty() => columns,
            None => {
                return Err(IngestError::MissingColumns {
                    table: statement.table,
                });
            }
        };
        for row in statement.rows {
            if row.len() != names.len() {
                warn!(
                    source = %source_system,
                    line = statement.line,
                    expected = names.len(),
                    found = row.len(),
                    "skipping tuple with wrong column count"
                );
                batch.skipped_rows += 1;
                ordinal += 1;
                continue;
            }
            let mut record = RawSourceRecord::new(source_system.clone(), ordinal);
            for (name, value) in names.iter().zip(row) {
                record.insert(name.clone(), value.into_raw());
            }
            batch.records.push(record);
            ordinal += 1;
        }
    }
    Ok(batch)
}
