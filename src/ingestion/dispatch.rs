//! Format dispatch for uploads.
//!
//! Most callers should use [`ingest_upload`], which turns an [`UploadPayload`] into an
//! [`IngestOutcome`]:
//!
//! - The strategy is chosen from the file name by an ordered list of [`FormatMatcher`]s
//!   (or forced via [`IngestionOptions::format`]).
//! - Extraction failures never escape: they are logged, reported to the configured
//!   [`IngestionObserver`], and returned as [`IngestOutcome::Failed`].

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, IngestionResult};
use crate::payload::UploadPayload;
use crate::types::DataSet;

use super::document::{self, DocumentLimits};
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::csv;

/// Extraction strategies an upload can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UploadFormat {
    /// Workbook formats (feature-gated behind `excel`).
    Spreadsheet,
    /// Comma-separated values.
    DelimitedText,
    /// Paginated documents (PDF).
    DocumentText,
}

impl UploadFormat {
    /// Select a format from a file name using `matchers` in order.
    ///
    /// Returns `None` (unrecognized) when no matcher applies.
    pub fn from_filename(filename: &str, matchers: &[FormatMatcher]) -> Option<Self> {
        matchers.iter().find(|m| m.matches(filename)).map(|m| m.format)
    }
}

/// Routes file names containing any of `tokens` to `format`.
///
/// Matching is a substring test, so `report.xlsx` and `sales.xls.backup` both match the
/// token `xls`. It ignores ASCII case unless `case_sensitive` is set; with it set,
/// `DATA.CSV` does not match `csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatMatcher {
    pub format: UploadFormat,
    pub tokens: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl FormatMatcher {
    pub fn new(format: UploadFormat, tokens: &[&str]) -> Self {
        Self {
            format,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    fn matches(&self, filename: &str) -> bool {
        let mut tokens = self.tokens.iter().filter(|t| !t.is_empty());
        if self.case_sensitive {
            return tokens.any(|t| filename.contains(t.as_str()));
        }
        let lower = filename.to_ascii_lowercase();
        tokens.any(|t| lower.contains(&t.to_ascii_lowercase()))
    }
}

/// Default matcher order: spreadsheet, then delimited text, then document text.
pub fn default_matchers() -> Vec<FormatMatcher> {
    vec![
        FormatMatcher::new(UploadFormat::Spreadsheet, &["xls", "ods"]),
        FormatMatcher::new(UploadFormat::DelimitedText, &["csv"]),
        FormatMatcher::new(UploadFormat::DocumentText, &["pdf"]),
    ]
}

/// How to choose the sheet when ingesting a workbook.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExcelSheetSelection {
    /// Ingest the first sheet (default).
    #[default]
    First,
    /// Ingest a single named sheet.
    Sheet(String),
}

/// Options controlling extraction.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, select the format from the file name.
    pub format: Option<UploadFormat>,
    /// Ordered file-name matchers; the first match wins.
    pub matchers: Vec<FormatMatcher>,
    /// Workbook-specific options.
    pub excel_sheet_selection: ExcelSheetSelection,
    /// Bounds for document-text extraction.
    pub document_limits: DocumentLimits,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("matchers", &self.matchers)
            .field("excel_sheet_selection", &self.excel_sheet_selection)
            .field("document_limits", &self.document_limits)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            matchers: default_matchers(),
            excel_sheet_selection: ExcelSheetSelection::default(),
            document_limits: DocumentLimits::default(),
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Result of running one upload through the dispatcher.
#[derive(Debug)]
pub enum IngestOutcome {
    /// Extraction succeeded.
    Table(DataSet),
    /// The file name matches no strategy.
    Unrecognized,
    /// The chosen strategy failed; the error has already been logged.
    Failed(IngestionError),
}

impl IngestOutcome {
    /// Collapse the outcome to "table or no table".
    pub fn into_table(self) -> Option<DataSet> {
        match self {
            IngestOutcome::Table(ds) => Some(ds),
            IngestOutcome::Unrecognized | IngestOutcome::Failed(_) => None,
        }
    }

    pub fn table(&self) -> Option<&DataSet> {
        match self {
            IngestOutcome::Table(ds) => Some(ds),
            _ => None,
        }
    }
}

/// Select the strategy for `filename`, honoring a forced format.
pub fn select_format(filename: &str, options: &IngestionOptions) -> Option<UploadFormat> {
    options
        .format
        .or_else(|| UploadFormat::from_filename(filename, &options.matchers))
}

/// Run one strategy over decoded bytes.
pub fn extract(format: UploadFormat, bytes: &[u8], options: &IngestionOptions) -> IngestionResult<DataSet> {
    match format {
        UploadFormat::Spreadsheet => extract_spreadsheet(bytes, &options.excel_sheet_selection),
        UploadFormat::DelimitedText => csv::ingest_csv_from_bytes(bytes),
        UploadFormat::DocumentText => document::ingest_document_from_bytes(bytes, &options.document_limits),
    }
}

/// Decode and extract an upload.
///
/// When an observer is configured, this function reports:
///
/// - `on_unrecognized` when no strategy matches
/// - `on_success` on success, with row/column stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```rust
/// use upload_insights::ingestion::{ingest_upload, IngestionOptions};
/// use upload_insights::UploadPayload;
///
/// let upload = UploadPayload::from_bytes("data.csv", "text/csv", b"A,B\n1,2\n3,4\n");
/// let ds = ingest_upload(&upload, &IngestionOptions::default()).into_table().unwrap();
/// assert_eq!(ds.row_count(), 2);
///
/// let other = UploadPayload::from_bytes("notes.txt.bak", "text/plain", b"hello");
/// assert!(ingest_upload(&other, &IngestionOptions::default()).into_table().is_none());
/// ```
pub fn ingest_upload(payload: &UploadPayload, options: &IngestionOptions) -> IngestOutcome {
    let Some(format) = select_format(&payload.filename, options) else {
        log::debug!("no format matches '{}'", payload.filename);
        if let Some(obs) = options.observer.as_ref() {
            obs.on_unrecognized(&payload.filename);
        }
        return IngestOutcome::Unrecognized;
    };
    log::debug!("'{}' dispatched as {format:?}", payload.filename);

    let ctx = IngestionContext {
        filename: payload.filename.clone(),
        format,
    };

    let result = payload
        .decode()
        .and_then(|decoded| extract(format, &decoded.bytes, options));

    match result {
        Ok(ds) => {
            if let Some(obs) = options.observer.as_ref() {
                obs.on_success(
                    &ctx,
                    IngestionStats {
                        rows: ds.row_count(),
                        columns: ds.column_count(),
                    },
                );
            }
            IngestOutcome::Table(ds)
        }
        Err(e) => {
            log::warn!("failed to extract '{}' as {format:?}: {e}", payload.filename);
            if let Some(obs) = options.observer.as_ref() {
                let sev = severity_for_error(&e);
                obs.on_failure(&ctx, sev, &e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, &e);
                }
            }
            IngestOutcome::Failed(e)
        }
    }
}

fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::Io(_) => IngestionSeverity::Critical,
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        IngestionError::Pdf(err) => {
            if error_chain_contains_io(err) {
                IngestionSeverity::Critical
            } else {
                IngestionSeverity::Error
            }
        }
        #[cfg(feature = "excel")]
        IngestionError::Excel(_) => IngestionSeverity::Error,
        IngestionError::DocumentTooLarge { .. } => IngestionSeverity::Warning,
        IngestionError::Decode(_)
        | IngestionError::MalformedPayload { .. }
        | IngestionError::MalformedTable { .. }
        | IngestionError::ParseError { .. }
        | IngestionError::UndecodableText { .. }
        | IngestionError::Unsupported { .. } => IngestionSeverity::Error,
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

fn extract_spreadsheet(bytes: &[u8], sel: &ExcelSheetSelection) -> IngestionResult<DataSet> {
    // Avoid unused warnings when the feature is off.
    let _ = (bytes, sel);

    #[cfg(feature = "excel")]
    {
        use super::excel;

        match sel {
            ExcelSheetSelection::First => excel::ingest_excel_from_bytes(bytes, None),
            ExcelSheetSelection::Sheet(name) => excel::ingest_excel_from_bytes(bytes, Some(name.as_str())),
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(IngestionError::Unsupported {
            message: "spreadsheet ingestion not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matchers_are_tried_in_order() {
        let m = default_matchers();
        assert_eq!(UploadFormat::from_filename("report.xlsx", &m), Some(UploadFormat::Spreadsheet));
        assert_eq!(UploadFormat::from_filename("old.XLS", &m), Some(UploadFormat::Spreadsheet));
        assert_eq!(UploadFormat::from_filename("data.csv", &m), Some(UploadFormat::DelimitedText));
        assert_eq!(UploadFormat::from_filename("paper.pdf", &m), Some(UploadFormat::DocumentText));
        // Spreadsheet is checked before delimited text.
        assert_eq!(
            UploadFormat::from_filename("xls_export.csv", &m),
            Some(UploadFormat::Spreadsheet)
        );
    }

    #[test]
    fn unmatched_names_are_unrecognized() {
        let m = default_matchers();
        assert_eq!(UploadFormat::from_filename("notes.txt.bak", &m), None);
        assert_eq!(UploadFormat::from_filename("", &m), None);
    }

    #[test]
    fn case_sensitive_matchers_require_exact_case() {
        let m: Vec<FormatMatcher> = default_matchers()
            .into_iter()
            .map(|m| m.case_sensitive(true))
            .collect();
        assert_eq!(UploadFormat::from_filename("DATA.CSV", &m), None);
        assert_eq!(UploadFormat::from_filename("data.csv", &m), Some(UploadFormat::DelimitedText));

        let upper = vec![FormatMatcher::new(UploadFormat::DocumentText, &["PDF"])];
        assert_eq!(UploadFormat::from_filename("scan.pdf", &upper), Some(UploadFormat::DocumentText));
    }

    #[test]
    fn empty_tokens_never_match() {
        let m = vec![FormatMatcher::new(UploadFormat::DelimitedText, &[""])];
        assert_eq!(UploadFormat::from_filename("anything", &m), None);
    }

    #[test]
    fn forced_format_overrides_the_name() {
        let opts = IngestionOptions {
            format: Some(UploadFormat::DelimitedText),
            ..Default::default()
        };
        assert_eq!(select_format("export.dat", &opts), Some(UploadFormat::DelimitedText));
    }

    #[test]
    fn malformed_payload_is_a_failed_outcome() {
        let upload = UploadPayload::new("data.csv", "no delimiter here");
        let outcome = ingest_upload(&upload, &IngestionOptions::default());
        assert!(matches!(outcome, IngestOutcome::Failed(IngestionError::MalformedPayload { .. })));
        assert!(outcome.into_table().is_none());
    }

    #[test]
    fn severity_is_warning_for_oversized_documents() {
        let e = IngestionError::DocumentTooLarge { bytes: 10, limit: 1 };
        assert_eq!(severity_for_error(&e), IngestionSeverity::Warning);
    }
}
