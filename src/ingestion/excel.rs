#![cfg(feature = "excel")]

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Range, Reader};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::infer::{header_names, CellKind, ColumnKinds};

/// Ingest a workbook (`.xlsx`, `.xls`, `.xlsb`, `.ods`) held in memory into a `DataSet`.
///
/// Behavior:
/// - The container format is sniffed from the bytes, not from the file name
/// - Picks `sheet_name` if provided; otherwise uses the first sheet in the workbook
/// - Detects the first non-empty row as the header row
/// - Reads remaining rows and converts cells into typed `Value`s, one inferred type per column
pub fn ingest_excel_from_bytes(bytes: &[u8], sheet_name: Option<&str>) -> IngestionResult<DataSet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let sheet = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| IngestionError::MalformedTable {
                message: "workbook has no sheets".to_string(),
            })?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    ingest_sheet_range(&sheet, &range)
}

fn ingest_sheet_range(sheet: &str, range: &Range<Data>) -> IngestionResult<DataSet> {
    let (header_row_idx, header_cells) = find_header_row(range)
        .ok_or_else(|| IngestionError::MalformedTable {
            message: format!("sheet '{sheet}' has no non-empty rows (no header row found)"),
        })?;
    let names = header_names(header_cells);
    let width = names.len();

    let body: Vec<&[Data]> = range.rows().skip(header_row_idx + 1).collect();

    let fields: Vec<Field> = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut kinds = ColumnKinds::default();
            for row in &body {
                if let Some(kind) = row.get(idx).and_then(cell_kind) {
                    kinds.observe(kind);
                }
            }
            Field::new(name, kinds.data_type())
        })
        .collect();

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(body.len());
    for (idx0, row) in body.iter().enumerate() {
        // Report 1-based row number (Excel-like).
        let user_row = header_row_idx + idx0 + 2;

        let mut out_row: Vec<Value> = Vec::with_capacity(width);
        for (col_idx, field) in fields.iter().enumerate() {
            let cell = row.get(col_idx).unwrap_or(&Data::Empty);
            let col_label = format!("{sheet}:{name}", name = field.name);
            out_row.push(convert_cell(user_row, &col_label, field.data_type, cell)?);
        }
        rows.push(out_row);
    }

    DataSet::try_new(Schema::new(fields), rows)
}

fn find_header_row(range: &Range<Data>) -> Option<(usize, Vec<String>)> {
    range.rows().enumerate().find_map(|(idx0, row)| {
        let non_empty = row.iter().any(|c| !matches!(c, Data::Empty));
        non_empty.then(|| (idx0, row.iter().map(cell_to_header_string).collect()))
    })
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => (*f as i64).to_string(),
        Data::Empty => String::new(),
        other => cell_to_string(other),
    }
}

fn cell_kind(c: &Data) -> Option<CellKind> {
    match c {
        Data::Empty => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::Int(_) => Some(CellKind::Int),
        // Workbooks store every number as a float; whole values read as integers.
        Data::Float(f) if is_whole(*f) => Some(CellKind::Int),
        Data::Float(_) => Some(CellKind::Float),
        Data::Bool(_) => Some(CellKind::Bool),
        _ => Some(CellKind::Text),
    }
}

fn is_whole(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64
}

fn convert_cell(row: usize, column: &str, data_type: DataType, c: &Data) -> IngestionResult<Value> {
    if cell_kind(c).is_none() {
        return Ok(Value::Null);
    }

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(cell_to_string(c))),
        DataType::Bool => parse_bool_cell(row, column, c).map(Value::Bool),
        DataType::Int64 => parse_i64_cell(row, column, c).map(Value::Int64),
        DataType::Float64 => parse_f64_cell(row, column, c).map(Value::Float64),
    }
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::DateTime(dt) => format_datetime(dt),
        _ => c.to_string(),
    }
}

/// ISO-8601 text for a serial date cell: `2023-07-15`, `2023-07-15T08:30:00` or, for
/// durations, `26:15:00`.
fn format_datetime(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        let total = (dt.as_f64() * 86_400.0).round() as i64;
        let sign = if total < 0 { "-" } else { "" };
        let total = total.abs();
        return format!("{sign}{}:{:02}:{:02}", total / 3600, total % 3600 / 60, total % 60);
    }

    let (year, month, day, hour, min, sec, milli) = dt.to_ymd_hms_milli();
    let date = format!("{year:04}-{month:02}-{day:02}");
    match (hour, min, sec, milli) {
        (0, 0, 0, 0) => date,
        (_, _, _, 0) => format!("{date}T{hour:02}:{min:02}:{sec:02}"),
        _ => format!("{date}T{hour:02}:{min:02}:{sec:02}.{milli:03}"),
    }
}

fn parse_bool_cell(row: usize, column: &str, c: &Data) -> IngestionResult<bool> {
    match c {
        Data::Bool(b) => Ok(*b),
        _ => Err(IngestionError::ParseError {
            row,
            column: column.to_string(),
            raw: c.to_string(),
            message: "expected bool".to_string(),
        }),
    }
}

fn parse_i64_cell(row: usize, column: &str, c: &Data) -> IngestionResult<i64> {
    match c {
        Data::Int(i) => Ok(*i),
        Data::Float(f) if is_whole(*f) => Ok(*f as i64),
        _ => Err(IngestionError::ParseError {
            row,
            column: column.to_string(),
            raw: c.to_string(),
            message: "expected integer".to_string(),
        }),
    }
}

fn parse_f64_cell(row: usize, column: &str, c: &Data) -> IngestionResult<f64> {
    match c {
        Data::Float(f) => Ok(*f),
        Data::Int(i) => Ok(*i as f64),
        _ => Err(IngestionError::ParseError {
            row,
            column: column.to_string(),
            raw: c.to_string(),
            message: "expected number".to_string(),
        }),
    }
}
