//! Schema inference for uploads.
//!
//! Uploads arrive without a schema, so every strategy infers one: header cells become field
//! names (see [`header_names`]) and each column gets a [`DataType`] from the kinds of its
//! non-null cells (see [`ColumnKinds`]).

use std::collections::HashSet;

use crate::types::DataType;

/// Prefix given to columns whose header cell is empty, followed by the column index.
pub const UNNAMED_PREFIX: &str = "Unnamed: ";

/// Text tokens read as a missing value in delimited text.
const NULL_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "#N/A", "<NA>",
];

/// Returns `true` if `raw` (after trimming) denotes a missing value.
pub fn is_null_token(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || NULL_TOKENS.contains(&trimmed)
}

/// Kind of a single non-null cell, as seen by inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Int,
    Float,
    Bool,
    Text,
}

impl CellKind {
    /// Classify a raw text cell. Callers filter null tokens first.
    pub fn of_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.parse::<i64>().is_ok() {
            CellKind::Int
        } else if trimmed.parse::<f64>().is_ok() {
            CellKind::Float
        } else if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
            CellKind::Bool
        } else {
            CellKind::Text
        }
    }
}

/// Accumulates the cell kinds seen in one column.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnKinds {
    int: bool,
    float: bool,
    boolean: bool,
    text: bool,
}

impl ColumnKinds {
    pub fn observe(&mut self, kind: CellKind) {
        match kind {
            CellKind::Int => self.int = true,
            CellKind::Float => self.float = true,
            CellKind::Bool => self.boolean = true,
            CellKind::Text => self.text = true,
        }
    }

    /// Unify the observed kinds into one column type.
    ///
    /// Integers widen to floats; any other mix (or an all-null column) falls back to text.
    pub fn data_type(&self) -> DataType {
        match (self.int, self.float, self.boolean, self.text) {
            (true, false, false, false) => DataType::Int64,
            (_, true, false, false) => DataType::Float64,
            (false, false, true, false) => DataType::Bool,
            _ => DataType::Utf8,
        }
    }
}

/// Infer the type of a text column from its raw cells.
pub fn infer_text_column<'a>(cells: impl IntoIterator<Item = &'a str>) -> DataType {
    let mut kinds = ColumnKinds::default();
    for raw in cells {
        if !is_null_token(raw) {
            kinds.observe(CellKind::of_text(raw));
        }
    }
    kinds.data_type()
}

/// Turn raw header cells into unique field names.
///
/// Empty headers become `"Unnamed: <index>"`; repeated names get `.1`, `.2`, ... suffixes.
pub fn header_names<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for (idx, cell) in raw.into_iter().enumerate() {
        let trimmed = cell.as_ref().trim();
        let base = if trimmed.is_empty() {
            format!("{UNNAMED_PREFIX}{idx}")
        } else {
            trimmed.to_string()
        };

        let mut name = base.clone();
        let mut n = 1usize;
        while seen.contains(&name) {
            name = format!("{base}.{n}");
            n += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}
