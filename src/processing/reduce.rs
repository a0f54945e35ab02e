//! Reduction operations for [`crate::types::DataSet`].

use crate::types::{DataSet, DataType, Value};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows (including nulls).
    Count,
    /// Sum numeric values, ignoring nulls.
    Sum,
    /// Minimum numeric value, ignoring nulls.
    Min,
    /// Maximum numeric value, ignoring nulls.
    Max,
    /// Arithmetic mean of numeric values, ignoring nulls. Always a float.
    Mean,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - Returns `None` if `column` does not exist in the schema.
/// - For `Sum`/`Min`/`Max`/`Mean`, returns `Some(Value::Null)` if there are no non-null values
///   or the column is not numeric.
/// - For `Count`, always returns `Some(Value::Int64(row_count))`.
pub fn reduce(dataset: &DataSet, column: &str, op: ReduceOp) -> Option<Value> {
    let idx = dataset.schema.index_of(column)?;
    let field = dataset.schema.fields.get(idx)?;

    if op == ReduceOp::Count {
        return Some(Value::Int64(dataset.row_count() as i64));
    }

    Some(match (field.data_type, op) {
        (DataType::Int64 | DataType::Float64, ReduceOp::Mean) => mean(dataset, idx),
        (DataType::Int64, _) => reduce_i64(dataset, idx, op),
        (DataType::Float64, _) => reduce_f64(dataset, idx, op),
        _ => Value::Null,
    })
}

fn reduce_i64(dataset: &DataSet, idx: usize, op: ReduceOp) -> Value {
    // Accumulate wide so sums of large columns cannot overflow mid-way.
    let step: fn(i128, i128) -> i128 = match op {
        ReduceOp::Sum => |a, v| a + v,
        ReduceOp::Min => i128::min,
        ReduceOp::Max => i128::max,
        ReduceOp::Count | ReduceOp::Mean => return Value::Null,
    };

    let acc = dataset
        .column_values(idx)
        .filter_map(|v| match v {
            Value::Int64(x) => Some(*x as i128),
            _ => None,
        })
        .reduce(step);

    match acc {
        None => Value::Null,
        Some(a) => i64::try_from(a).map(Value::Int64).unwrap_or(Value::Float64(a as f64)),
    }
}

fn reduce_f64(dataset: &DataSet, idx: usize, op: ReduceOp) -> Value {
    let step: fn(f64, f64) -> f64 = match op {
        ReduceOp::Sum => |a, v| a + v,
        ReduceOp::Min => f64::min,
        ReduceOp::Max => f64::max,
        ReduceOp::Count | ReduceOp::Mean => return Value::Null,
    };

    dataset
        .column_values(idx)
        .filter_map(Value::as_f64)
        .reduce(step)
        .map(Value::Float64)
        .unwrap_or(Value::Null)
}

fn mean(dataset: &DataSet, idx: usize) -> Value {
    let (sum, n) = dataset
        .column_values(idx)
        .filter_map(Value::as_f64)
        .fold((0.0_f64, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        Value::Null
    } else {
        Value::Float64(sum / n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::{reduce, ReduceOp};
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn numeric_dataset_with_nulls() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("score", DataType::Float64),
            Field::new("name", DataType::Utf8),
        ]);

        let rows = vec![
            vec![Value::Int64(1), Value::Float64(10.0), Value::Utf8("a".to_string())],
            vec![Value::Int64(2), Value::Null, Value::Utf8("b".to_string())],
            vec![Value::Int64(3), Value::Float64(5.5), Value::Null],
        ];

        DataSet::new(schema, rows)
    }

    #[test]
    fn reduce_count_counts_rows() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(reduce(&ds, "score", ReduceOp::Count), Some(Value::Int64(3)));
        assert_eq!(reduce(&ds, "name", ReduceOp::Count), Some(Value::Int64(3)));
    }

    #[test]
    fn reduce_sum_ignores_nulls_and_preserves_type() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(
            reduce(&ds, "score", ReduceOp::Sum),
            Some(Value::Float64(15.5))
        );
        assert_eq!(reduce(&ds, "id", ReduceOp::Sum), Some(Value::Int64(6)));
    }

    #[test]
    fn reduce_min_max_ignore_nulls() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(
            reduce(&ds, "score", ReduceOp::Min),
            Some(Value::Float64(5.5))
        );
        assert_eq!(
            reduce(&ds, "score", ReduceOp::Max),
            Some(Value::Float64(10.0))
        );
        assert_eq!(reduce(&ds, "id", ReduceOp::Min), Some(Value::Int64(1)));
        assert_eq!(reduce(&ds, "id", ReduceOp::Max), Some(Value::Int64(3)));
    }

    #[test]
    fn reduce_mean_divides_by_non_null_count() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(reduce(&ds, "score", ReduceOp::Mean), Some(Value::Float64(7.75)));
        assert_eq!(reduce(&ds, "id", ReduceOp::Mean), Some(Value::Float64(2.0)));
    }

    #[test]
    fn reduce_returns_none_for_missing_column() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(reduce(&ds, "missing", ReduceOp::Count), None);
        assert_eq!(reduce(&ds, "missing", ReduceOp::Sum), None);
    }

    #[test]
    fn reduce_non_numeric_column_is_null() {
        let ds = numeric_dataset_with_nulls();
        assert_eq!(reduce(&ds, "name", ReduceOp::Sum), Some(Value::Null));
        assert_eq!(reduce(&ds, "name", ReduceOp::Mean), Some(Value::Null));
    }

    #[test]
    fn reduce_int_sum_widens_instead_of_overflowing() {
        let schema = Schema::new(vec![Field::new("big", DataType::Int64)]);
        let ds = DataSet::new(schema, vec![vec![Value::Int64(i64::MAX)], vec![Value::Int64(1)]]);
        assert_eq!(
            reduce(&ds, "big", ReduceOp::Sum),
            Some(Value::Float64(i64::MAX as f64 + 1.0))
        );
    }

    #[test]
    fn reduce_numeric_returns_null_if_all_values_null() {
        let schema = Schema::new(vec![Field::new("score", DataType::Float64)]);
        let ds = DataSet::new(schema, vec![vec![Value::Null], vec![Value::Null]]);
        for op in [ReduceOp::Sum, ReduceOp::Min, ReduceOp::Max, ReduceOp::Mean] {
            assert_eq!(reduce(&ds, "score", op), Some(Value::Null));
        }
    }
}
