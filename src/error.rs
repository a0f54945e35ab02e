use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by decoding and extraction functions.
///
/// This is a single error enum shared across the spreadsheet, delimited-text and document
/// strategies. The dispatcher never lets it escape: see [`crate::ingestion::IngestOutcome`].
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Workbook error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Delimited-text error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// PDF document error.
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// The payload body is not valid base64.
    #[error("decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The encoded payload does not have the `<metadata>,<body>` shape.
    #[error("malformed payload: {message}")]
    MalformedPayload { message: String },

    /// The extracted data cannot form a rectangular table (no header, ragged rows, ...).
    #[error("malformed table: {message}")]
    MalformedTable { message: String },

    /// A value could not be parsed into its inferred [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// A document exceeds [`crate::ingestion::DocumentLimits::max_bytes`].
    #[error("document too large: {bytes} bytes (limit {limit})")]
    DocumentTooLarge { bytes: usize, limit: usize },

    /// A document page uses a font encoding whose text cannot be decoded.
    #[error("cannot decode text on page {page}: font encoding '{encoding}' is not supported")]
    UndecodableText { page: u32, encoding: String },

    /// The requested strategy is not available in this build.
    #[error("unsupported: {message}")]
    Unsupported { message: String },
}

/// Error type returned by the persistence sink.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Error type returned when loading a [`crate::config::DashboardConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The synthetic-column pattern is not a valid regular expression.
    #[error("invalid column pattern: {0}")]
    Pattern(#[from] regex::Error),
}
