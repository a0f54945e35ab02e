//! Delimited-text (CSV) ingestion implementation.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::infer::{header_names, infer_text_column, is_null_token};

/// Ingest comma-separated bytes into an in-memory [`DataSet`].
///
/// Rules:
///
/// - The first row is the header (blank headers become `Unnamed: <index>`).
/// - Rows shorter than the header are padded with nulls; longer rows are an error.
/// - Each column's type is inferred from its cells (see [`super::infer`]).
pub fn ingest_csv_from_bytes(bytes: &[u8]) -> IngestionResult<DataSet> {
    let mut rdr = reader_builder().from_reader(bytes);
    ingest_csv_from_reader(&mut rdr)
}

/// Ingest a CSV file from disk.
pub fn ingest_csv_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let mut rdr = reader_builder().from_path(path)?;
    ingest_csv_from_reader(&mut rdr)
}

/// Ingest CSV data from an existing CSV reader.
///
/// The reader should be `flexible` so short rows reach the padding logic instead of failing
/// inside the csv crate.
pub fn ingest_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> IngestionResult<DataSet> {
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(IngestionError::MalformedTable {
            message: "csv input has no header row".to_string(),
        });
    }
    let names = header_names(headers.iter());
    let width = names.len();

    let mut records: Vec<csv::StringRecord> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;
        if record.len() > width {
            return Err(IngestionError::MalformedTable {
                message: format!(
                    "row {user_row} has {} fields but the header has {width}",
                    record.len()
                ),
            });
        }
        records.push(record);
    }

    let fields: Vec<Field> = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let data_type = infer_text_column(records.iter().map(|r| r.get(idx).unwrap_or("")));
            Field::new(name, data_type)
        })
        .collect();

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(records.len());
    for (row_idx0, record) in records.iter().enumerate() {
        let user_row = row_idx0 + 2;
        let mut row: Vec<Value> = Vec::with_capacity(width);
        for (idx, field) in fields.iter().enumerate() {
            let raw = record.get(idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, field.data_type, raw)?);
        }
        rows.push(row);
    }

    DataSet::try_new(Schema::new(fields), rows)
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true);
    builder
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
) -> IngestionResult<Value> {
    if is_null_token(raw) {
        return Ok(Value::Null);
    }
    let trimmed = raw.trim();

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => trimmed.parse::<i64>().map(Value::Int64).map_err(|e| {
            IngestionError::ParseError {
                row,
                column: column.to_owned(),
                raw: raw.to_owned(),
                message: e.to_string(),
            }
        }),
        DataType::Float64 => trimmed.parse::<f64>().map(Value::Float64).map_err(|e| {
            IngestionError::ParseError {
                row,
                column: column.to_owned(),
                raw: raw.to_owned(),
                message: e.to_string(),
            }
        }),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(|message| {
            IngestionError::ParseError {
                row,
                column: column.to_owned(),
                raw: raw.to_owned(),
                message,
            }
        }),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err("expected bool (true/false)".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_column_types() {
        let ds = ingest_csv_from_bytes(b"id,score,name,flag\n1,2.5,Ada,true\n2,3,Grace,false\n").unwrap();
        let types: Vec<DataType> = ds.schema.fields.iter().map(|f| f.data_type).collect();
        assert_eq!(
            types,
            vec![DataType::Int64, DataType::Float64, DataType::Utf8, DataType::Bool]
        );
        assert_eq!(ds.rows[1][1], Value::Float64(3.0));
    }

    #[test]
    fn pads_short_rows_with_nulls() {
        let ds = ingest_csv_from_bytes(b"A,B,C\n1,2,3\n4\n").unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.rows[1], vec![Value::Int64(4), Value::Null, Value::Null]);
    }

    #[test]
    fn rejects_rows_longer_than_header() {
        let err = ingest_csv_from_bytes(b"A,B\n1,2,3\n").unwrap_err();
        assert!(err.to_string().contains("row 2 has 3 fields"));
    }

    #[test]
    fn null_tokens_become_null() {
        let ds = ingest_csv_from_bytes(b"A,B\n1,NA\n,x\n").unwrap();
        assert_eq!(ds.rows[0][1], Value::Null);
        assert_eq!(ds.rows[1][0], Value::Null);
        assert_eq!(ds.schema.fields[0].data_type, DataType::Int64);
    }

    #[test]
    fn empty_input_is_malformed() {
        let err = ingest_csv_from_bytes(b"").unwrap_err();
        assert!(err.to_string().contains("no header row"));
    }

    #[test]
    fn header_only_input_has_columns_and_no_rows() {
        let ds = ingest_csv_from_bytes(b"A,B\n").unwrap();
        assert_eq!(ds.column_names(), vec!["A", "B"]);
        assert_eq!(ds.row_count(), 0);
    }
}
