//! Table normalization: dropping synthetic/index-only columns.

use regex::Regex;

use crate::types::{DataSet, Value};

/// Default pattern for columns that only carry a positional index (`Unnamed: 0`, ...).
pub const DEFAULT_SYNTHETIC_PATTERN: &str = "^Unnamed";

/// Column-name pattern identifying synthetic columns.
#[derive(Debug, Clone)]
pub struct SyntheticColumnPattern {
    regex: Regex,
}

impl SyntheticColumnPattern {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns `true` if `column` should be dropped.
    pub fn is_synthetic(&self, column: &str) -> bool {
        self.regex.is_match(column)
    }
}

impl Default for SyntheticColumnPattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_SYNTHETIC_PATTERN).expect("default synthetic-column pattern is valid"),
        }
    }
}

impl PartialEq for SyntheticColumnPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// A [`DataSet`] whose synthetic columns have been removed.
///
/// This is what statistics, charts and table views consume.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedTable {
    dataset: DataSet,
}

impl NormalizedTable {
    pub fn dataset(&self) -> &DataSet {
        &self.dataset
    }

    pub fn into_dataset(self) -> DataSet {
        self.dataset
    }

    pub fn column_names(&self) -> Vec<String> {
        self.dataset.column_names()
    }

    pub fn row_count(&self) -> usize {
        self.dataset.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.dataset.column_count()
    }

    /// Values of the named column, top to bottom. `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.dataset.schema.index_of(name)?;
        Some(self.dataset.column_values(idx).collect())
    }
}

/// Return a copy of `dataset` without the columns matching `pattern`.
///
/// Column order is preserved. Normalizing an already-normalized table is a no-op.
pub fn normalize(dataset: &DataSet, pattern: &SyntheticColumnPattern) -> NormalizedTable {
    let keep: Vec<usize> = dataset
        .schema
        .fields
        .iter()
        .enumerate()
        .filter(|(_, f)| !pattern.is_synthetic(&f.name))
        .map(|(idx, _)| idx)
        .collect();

    let dataset = if keep.len() == dataset.column_count() {
        dataset.clone()
    } else {
        dataset.select_columns(&keep)
    };
    NormalizedTable { dataset }
}
