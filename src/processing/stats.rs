//! Per-column summary statistics for the dashboard's stats panel.

use serde::{Deserialize, Serialize};

use super::normalize::NormalizedTable;
use super::reduce::{reduce, ReduceOp};

/// Aggregate metrics, in the order they are emitted per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    Mean,
    Max,
    Min,
    Sum,
}

impl Metric {
    /// All metrics, in display order.
    pub const ALL: [Metric; 4] = [Metric::Mean, Metric::Max, Metric::Min, Metric::Sum];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Mean => "Mean",
            Metric::Max => "Max",
            Metric::Min => "Min",
            Metric::Sum => "Sum",
        }
    }

    fn op(self) -> ReduceOp {
        match self {
            Metric::Mean => ReduceOp::Mean,
            Metric::Max => ReduceOp::Max,
            Metric::Min => ReduceOp::Min,
            Metric::Sum => ReduceOp::Sum,
        }
    }
}

/// One metric of one column, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStat {
    pub column: String,
    pub metric: Metric,
    pub value: f64,
    /// `value` with exactly two decimal digits.
    pub formatted: String,
}

impl ColumnStat {
    fn new(column: &str, metric: Metric, value: f64) -> Self {
        Self {
            column: column.to_string(),
            metric,
            value,
            formatted: format!("{value:.2}"),
        }
    }

    /// Card title, e.g. `"Mean of Price"`.
    pub fn title(&self) -> String {
        format!("{} of {}", self.metric.label(), self.column)
    }
}

/// Options for [`column_stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsOptions {
    /// Identifier-like columns never summarized (exact, case-sensitive names).
    pub excluded_columns: Vec<String>,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            excluded_columns: vec!["Sr No".to_string(), "Serial No".to_string(), "ID".to_string()],
        }
    }
}

impl StatsOptions {
    pub fn is_excluded(&self, column: &str) -> bool {
        self.excluded_columns.iter().any(|c| c == column)
    }
}

/// Compute mean, max, min and sum for every numeric, non-excluded column.
///
/// Output is grouped by column (table order) with metrics in [`Metric::ALL`] order. Columns
/// whose type is not numeric, and columns with no non-null values, produce nothing.
pub fn column_stats(table: &NormalizedTable, options: &StatsOptions) -> Vec<ColumnStat> {
    let ds = table.dataset();
    let mut out = Vec::new();

    for field in &ds.schema.fields {
        if options.is_excluded(&field.name) || !field.data_type.is_numeric() {
            continue;
        }

        let values: Vec<(Metric, f64)> = Metric::ALL
            .iter()
            .filter_map(|&m| {
                let v = reduce(ds, &field.name, m.op())?.as_f64()?;
                Some((m, v))
            })
            .collect();
        // All-null columns reduce to nulls; emit all four metrics or none.
        if values.len() != Metric::ALL.len() {
            continue;
        }

        out.extend(values.into_iter().map(|(m, v)| ColumnStat::new(&field.name, m, v)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::normalize::{normalize, SyntheticColumnPattern};
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn table(fields: Vec<Field>, rows: Vec<Vec<Value>>) -> NormalizedTable {
        normalize(&DataSet::new(Schema::new(fields), rows), &SyntheticColumnPattern::default())
    }

    fn formatted(stats: &[ColumnStat]) -> Vec<(String, &'static str, String)> {
        stats
            .iter()
            .map(|s| (s.column.clone(), s.metric.label(), s.formatted.clone()))
            .collect()
    }

    #[test]
    fn emits_mean_max_min_sum_per_numeric_column() {
        let t = table(
            vec![Field::new("A", DataType::Int64), Field::new("B", DataType::Float64)],
            vec![
                vec![Value::Int64(1), Value::Float64(2.0)],
                vec![Value::Int64(3), Value::Float64(4.0)],
            ],
        );
        let stats = column_stats(&t, &StatsOptions::default());
        let expected: Vec<(String, &str, String)> = [
            ("A", "Mean", "2.00"),
            ("A", "Max", "3.00"),
            ("A", "Min", "1.00"),
            ("A", "Sum", "4.00"),
            ("B", "Mean", "3.00"),
            ("B", "Max", "4.00"),
            ("B", "Min", "2.00"),
            ("B", "Sum", "6.00"),
        ]
        .iter()
        .map(|(c, m, v)| (c.to_string(), *m, v.to_string()))
        .collect();
        assert_eq!(formatted(&stats), expected);
        assert_eq!(stats[0].title(), "Mean of A");
    }

    #[test]
    fn skips_excluded_text_and_empty_columns() {
        let t = table(
            vec![
                Field::new("ID", DataType::Int64),
                Field::new("name", DataType::Utf8),
                Field::new("empty", DataType::Float64),
                Field::new("flag", DataType::Bool),
                Field::new("id", DataType::Int64),
            ],
            vec![vec![
                Value::Int64(7),
                Value::Utf8("x".to_string()),
                Value::Null,
                Value::Bool(true),
                Value::Int64(9),
            ]],
        );
        let stats = column_stats(&t, &StatsOptions::default());
        // Exclusion is case-sensitive: "id" is summarized, "ID" is not.
        assert_eq!(stats.len(), 4);
        assert!(stats.iter().all(|s| s.column == "id"));
    }

    #[test]
    fn zero_row_tables_produce_no_stats() {
        let t = table(vec![Field::new("A", DataType::Int64)], vec![]);
        assert!(column_stats(&t, &StatsOptions::default()).is_empty());
    }

    #[test]
    fn custom_exclusions_apply() {
        let t = table(
            vec![Field::new("RowNum", DataType::Int64), Field::new("v", DataType::Int64)],
            vec![vec![Value::Int64(1), Value::Int64(2)]],
        );
        let opts = StatsOptions {
            excluded_columns: vec!["RowNum".to_string()],
        };
        let stats = column_stats(&t, &opts);
        assert!(stats.iter().all(|s| s.column == "v"));
        assert_eq!(stats.len(), 4);
    }

    #[test]
    fn values_round_to_two_decimals() {
        let t = table(
            vec![Field::new("x", DataType::Float64)],
            vec![vec![Value::Float64(1.0)], vec![Value::Float64(2.0)], vec![Value::Float64(2.0)]],
        );
        let stats = column_stats(&t, &StatsOptions::default());
        assert_eq!(stats[0].formatted, "1.67");
        assert!((stats[0].value - 5.0 / 3.0).abs() < 1e-12);
    }
}
