//! `upload-insights` turns an uploaded file into a table, summary statistics and chart
//! descriptions for an interactive dashboard.
//!
//! Uploads arrive as an [`UploadPayload`]: the original file name plus the browser's base64
//! data URL. The pipeline is:
//!
//! 1. [`ingestion::ingest_upload`] picks an extraction strategy from the file name and extracts
//!    a [`types::DataSet`] (or reports that no table could be produced).
//! 2. [`processing::normalize`] drops synthetic index columns (`Unnamed: 0`, ...).
//! 3. [`processing::column_stats`] computes mean/max/min/sum per numeric column.
//! 4. [`chart::build_chart`] describes a bar/line/scatter/histogram figure.
//!
//! [`dashboard::Dashboard`] wires these together and records parsed uploads through a
//! [`store::UploadSink`] such as [`store::SqliteUploadStore`].
//!
//! ## What you can upload
//!
//! The file name decides the strategy (first match wins, case-insensitive):
//!
//! - **Spreadsheets** (requires the Cargo feature `excel`, on by default): names containing
//!   `xls` or `ods` (`.xls`, `.xlsx`, `.xlsm`, `.xlsb`, `.ods`)
//! - **Delimited text**: names containing `csv`
//! - **Documents**: names containing `pdf`; all page text becomes a single `Content` cell
//!
//! Column types ([`types::DataType::Int64`], [`types::DataType::Float64`],
//! [`types::DataType::Bool`], [`types::DataType::Utf8`]) are inferred per column. Empty cells
//! and common null tokens (`NA`, `NaN`, `NULL`, ...) become [`types::Value::Null`].
//!
//! ## Quick example
//!
//! ```rust
//! use upload_insights::chart::ChartRequest;
//! use upload_insights::dashboard::{load_table, table_view};
//! use upload_insights::{DashboardConfig, UploadPayload};
//!
//! let config = DashboardConfig::default();
//! let upload = UploadPayload::from_bytes(
//!     "sales.csv",
//!     "text/csv",
//!     b",region,units\n0,north,3\n1,south,5\n",
//! );
//!
//! let table = load_table(Some(&upload), &config).unwrap();
//! assert_eq!(table.column_names(), vec!["region", "units"]);
//!
//! let view = table_view(Some(&table), &config);
//! let titles: Vec<String> = view.stats.iter().map(|s| s.title()).collect();
//! assert_eq!(titles, ["Mean of units", "Max of units", "Min of units", "Sum of units"]);
//!
//! let chart = upload_insights::chart::build_chart(
//!     Some(&table),
//!     &ChartRequest::new("bar", Some("region"), Some("units")),
//! );
//! assert_eq!(chart.figure().unwrap().traces.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`payload`]: upload payloads and data-URL decoding
//! - [`ingestion`]: strategy dispatch and the CSV/workbook/document extractors
//! - [`types`]: schema + in-memory dataset types
//! - [`processing`]: normalization, reductions and column statistics
//! - [`chart`]: renderer-neutral figure descriptions
//! - [`store`]: the append-only upload log
//! - [`dashboard`]: the upload and chart interactions
//! - [`config`]: pipeline configuration
//! - [`error`]: error types

pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod ingestion;
pub mod payload;
pub mod processing;
pub mod store;
pub mod types;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, TableView};
pub use error::{ConfigError, IngestionError, IngestionResult, StoreError};
pub use payload::UploadPayload;
