//! In-memory processing of extracted tables.
//!
//! The processing layer operates on [`crate::types::DataSet`] values produced by ingestion.
//!
//! Currently implemented:
//!
//! - [`normalize()`]: drops synthetic/index-only columns, producing a [`NormalizedTable`]
//! - [`reduce()`]: common reductions (count/sum/min/max/mean)
//! - [`column_stats()`]: the dashboard's per-column mean/max/min/sum
//!
//! ## Example: normalize → stats
//!
//! ```rust
//! use upload_insights::processing::{column_stats, normalize, StatsOptions, SyntheticColumnPattern};
//! use upload_insights::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("Unnamed: 0", DataType::Int64),
//!     Field::new("price", DataType::Float64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::Int64(0), Value::Float64(10.0)],
//!         vec![Value::Int64(1), Value::Float64(20.0)],
//!     ],
//! );
//!
//! let table = normalize(&ds, &SyntheticColumnPattern::default());
//! assert_eq!(table.column_names(), vec!["price"]);
//!
//! let stats = column_stats(&table, &StatsOptions::default());
//! assert_eq!(stats[0].title(), "Mean of price");
//! assert_eq!(stats[0].formatted, "15.00");
//! ```

pub mod normalize;
pub mod reduce;
pub mod stats;

pub use normalize::{normalize, NormalizedTable, SyntheticColumnPattern};
pub use reduce::{reduce, ReduceOp};
pub use stats::{column_stats, ColumnStat, Metric, StatsOptions};
