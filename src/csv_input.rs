//! CSV transaction file decoding.
//!
//! Headers may use the canonical snake_case column names or the camelCase
//! aliases of the JSON API. Unknown headers are ignored; the set of
//! recognised headers becomes the table's column set.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{Error, Result};
use crate::transaction::{Column, ColumnSet, TransactionRecord, TransactionTable};

/// Decode a headered CSV stream into a transaction table.
pub fn read_table<R: Read>(reader: R) -> Result<TransactionTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mapping: Vec<Option<Column>> = headers.iter().map(Column::from_header).collect();
    let columns: ColumnSet = mapping.iter().flatten().copied().collect();

    for required in [Column::FromAddress, Column::ToAddress] {
        if !columns.contains(required) {
            return Err(Error::MalformedRow(format!(
                "missing required column '{}'",
                required.name()
            )));
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut record = TransactionRecord::default();
        for (column, cell) in mapping.iter().zip(row.iter()) {
            if let Some(column) = column {
                record.set_text(*column, cell);
            }
        }
        records.push(record);
    }

    tracing::debug!(rows = records.len(), "decoded transaction csv");
    Ok(TransactionTable::with_columns(records, columns))
}

/// Open and decode a CSV file.
pub fn read_path(path: impl AsRef<Path>) -> Result<TransactionTable> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .map_err(|e| Error::MalformedRow(format!("{}: {e}", path.display())))?;
    read_table(file)
}
