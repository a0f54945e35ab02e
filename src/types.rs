//! Core data model types for ingestion.
//!
//! Every upload is extracted into an in-memory [`DataSet`]: a [`Schema`] (a list of typed
//! [`Field`]s, inferred from the data) plus row-major [`Value`] storage.

use std::fmt;

use serde::Serialize;

use crate::error::{IngestionError, IngestionResult};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
}

impl DataType {
    /// Returns `true` for [`DataType::Int64`] and [`DataType::Float64`].
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Int64 | DataType::Float64)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single typed value in a [`DataSet`].
///
/// Serializes as the bare JSON scalar (`null`, number, bool or string).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Numeric view of the value; `None` for nulls, bools and strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(s) => f.write_str(s),
        }
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields. Every row
/// holds exactly one value per field; missing cells are [`Value::Null`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    ///
    /// # Panics
    ///
    /// Panics if a row length differs from the schema field count.
    /// Use [`DataSet::try_new`] for rows built from untrusted input.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        match Self::try_new(schema, rows) {
            Ok(ds) => ds,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a dataset from schema and rows, rejecting ragged rows with
    /// [`IngestionError::MalformedTable`].
    pub fn try_new(schema: Schema, rows: Vec<Vec<Value>>) -> IngestionResult<Self> {
        let expected_len = schema.fields.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected_len) {
            return Err(IngestionError::MalformedTable {
                message: format!(
                    "row {idx} length {} does not match schema length {expected_len}",
                    row.len()
                ),
            });
        }
        Ok(Self { schema, rows })
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the dataset.
    pub fn column_count(&self) -> usize {
        self.schema.fields.len()
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<String> {
        self.schema.field_names().map(str::to_owned).collect()
    }

    /// Iterate the values of column `idx` from top to bottom.
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(idx))
    }

    /// Create a new dataset keeping only the columns at `indices`, in the given order.
    pub fn select_columns(&self, indices: &[usize]) -> Self {
        let fields = indices
            .iter()
            .filter_map(|&i| self.schema.fields.get(i).cloned())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().filter_map(|&i| row.get(i).cloned()).collect())
            .collect();
        Self {
            schema: Schema::new(fields),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("active", DataType::Bool),
            Field::new("name", DataType::Utf8),
        ]);
        DataSet::new(
            schema,
            vec![
                vec![Value::Int64(1), Value::Bool(true), Value::Utf8("a".to_string())],
                vec![Value::Int64(2), Value::Null, Value::Utf8("b".to_string())],
            ],
        )
    }

    #[test]
    fn schema_index_of_works() {
        let ds = sample_dataset();
        assert_eq!(ds.schema.index_of("id"), Some(0));
        assert_eq!(ds.schema.index_of("name"), Some(2));
        assert_eq!(ds.schema.index_of("missing"), None);
    }

    #[test]
    fn select_columns_reorders_and_preserves_rows() {
        let ds = sample_dataset();
        let out = ds.select_columns(&[2, 0]);
        assert_eq!(out.column_names(), vec!["name", "id"]);
        assert_eq!(
            out.rows[1],
            vec![Value::Utf8("b".to_string()), Value::Int64(2)]
        );
        // Original unchanged
        assert_eq!(ds.column_count(), 3);
    }

    #[test]
    fn values_serialize_as_bare_scalars() {
        let row = vec![
            Value::Null,
            Value::Int64(3),
            Value::Float64(1.5),
            Value::Bool(false),
            Value::Utf8("x".to_string()),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[null,3,1.5,false,"x"]"#);
    }

    #[test]
    fn try_new_rejects_ragged_rows() {
        let schema = Schema::new(vec![Field::new("a", DataType::Int64), Field::new("b", DataType::Utf8)]);
        let rows = vec![
            vec![Value::Int64(1), Value::Utf8("x".to_string())],
            vec![Value::Int64(2)],
        ];
        let err = DataSet::try_new(schema.clone(), rows).unwrap_err();
        match err {
            IngestionError::MalformedTable { message } => {
                assert_eq!(message, "row 1 length 1 does not match schema length 2")
            }
            other => panic!("expected MalformedTable, got {other:?}"),
        }

        let ds = DataSet::try_new(schema, vec![vec![Value::Null, Value::Null]]).unwrap();
        assert_eq!(ds.row_count(), 1);
    }

    #[test]
    #[should_panic(expected = "does not match schema length")]
    fn new_panics_on_ragged_rows() {
        let schema = Schema::new(vec![Field::new("a", DataType::Int64)]);
        let _ = DataSet::new(schema, vec![vec![Value::Int64(1), Value::Int64(2)]]);
    }
}
