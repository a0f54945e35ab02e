//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_upload`] (from [`dispatch`]) which:
//!
//! - selects an extraction strategy from the upload's file name (or you can force one via
//!   [`IngestionOptions`])
//! - decodes the payload and extracts it into an in-memory [`crate::types::DataSet`]
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`excel`] (feature `excel`)
//! - [`document`]

pub mod csv;
pub mod dispatch;
pub mod document;
#[cfg(feature = "excel")]
pub mod excel;
pub mod infer;
pub mod observability;

pub use dispatch::{
    default_matchers, extract, ingest_upload, select_format, ExcelSheetSelection, FormatMatcher, IngestOutcome,
    IngestionOptions, UploadFormat,
};
pub use document::{DocumentLimits, CONTENT_COLUMN};
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    LogObserver,
};
