use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::IngestionError;

use super::dispatch::UploadFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (extraction failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

/// Context about an extraction attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Client-side file name of the upload.
    pub filename: String,
    /// Strategy used for extraction.
    pub format: UploadFormat,
}

/// Minimal stats reported on successful extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of extracted rows.
    pub rows: usize,
    /// Number of extracted columns.
    pub columns: usize,
}

/// Observer interface for extraction outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called when extraction succeeds.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when extraction fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called when an extraction failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }

    /// Called when no strategy matches the file name.
    fn on_unrecognized(&self, _filename: &str) {}
}

/// Fans every event out to its members, in insertion order.
#[derive(Default)]
pub struct CompositeObserver {
    members: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    pub fn new(members: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { members }
    }

    /// Append one more observer.
    pub fn with(mut self, observer: Arc<dyn IngestionObserver>) -> Self {
        self.members.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn each(&self, f: impl Fn(&dyn IngestionObserver)) {
        self.members.iter().for_each(|m| f(m.as_ref()));
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeObserver({} members)", self.members.len())
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.each(|m| m.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.each(|m| m.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.each(|m| m.on_alert(ctx, severity, error));
    }

    fn on_unrecognized(&self, filename: &str) {
        self.each(|m| m.on_unrecognized(filename));
    }
}

/// Forwards extraction events to the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl IngestionObserver for LogObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        log::info!(
            "[ingest][ok] format={:?} file={} rows={} columns={}",
            ctx.format,
            ctx.filename,
            stats.rows,
            stats.columns
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        log::warn!(
            "[ingest][{:?}] format={:?} file={} err={}",
            severity,
            ctx.format,
            ctx.filename,
            error
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        log::error!(
            "[ALERT][ingest][{:?}] format={:?} file={} err={}",
            severity,
            ctx.format,
            ctx.filename,
            error
        );
    }

    fn on_unrecognized(&self, filename: &str) {
        log::info!("[ingest][skip] file={filename} matches no format");
    }
}

/// One line of the upload journal written by [`FileObserver`].
#[derive(Serialize)]
struct JournalEntry<'a> {
    ts: u64,
    event: &'static str,
    file: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<UploadFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<IngestionSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> JournalEntry<'a> {
    fn new(event: &'static str, file: &'a str) -> Self {
        Self {
            ts: unix_ts(),
            event,
            file,
            format: None,
            rows: None,
            columns: None,
            severity: None,
            error: None,
        }
    }

    fn failed(event: &'static str, ctx: &'a IngestionContext, severity: IngestionSeverity, error: &IngestionError) -> Self {
        Self {
            format: Some(ctx.format),
            severity: Some(severity),
            error: Some(error.to_string()),
            ..Self::new(event, &ctx.filename)
        }
    }
}

/// Keeps a journal of uploads as JSON lines, one object per extraction event:
///
/// ```text
/// {"ts":1767225600,"event":"extracted","file":"sales.csv","format":"DelimitedText","rows":12,"columns":4}
/// {"ts":1767225601,"event":"failed","file":"scan.pdf","format":"DocumentText","severity":"Error","error":"..."}
/// {"ts":1767225602,"event":"unrecognized","file":"photo.png"}
/// ```
///
/// A failure at or above the alert threshold gets a second `"alert"` entry. The journal is
/// best effort: if the file cannot be opened, events are only logged.
#[derive(Debug)]
pub struct FileObserver {
    journal: Mutex<Option<File>>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let journal = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => Some(f),
            Err(e) => {
                log::warn!("upload journal '{}' is unavailable: {e}", path.display());
                None
            }
        };
        Self {
            journal: Mutex::new(journal),
        }
    }

    fn record(&self, entry: &JournalEntry<'_>) {
        let Ok(mut journal) = self.journal.lock() else {
            return;
        };
        let Some(file) = journal.as_mut() else {
            return;
        };
        let written = serde_json::to_writer(&mut *file, entry)
            .map_err(std::io::Error::from)
            .and_then(|()| file.write_all(b"\n"));
        if let Err(e) = written {
            log::warn!("failed to journal upload '{}': {e}", entry.file);
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.record(&JournalEntry {
            format: Some(ctx.format),
            rows: Some(stats.rows),
            columns: Some(stats.columns),
            ..JournalEntry::new("extracted", &ctx.filename)
        });
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.record(&JournalEntry::failed("failed", ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.record(&JournalEntry::failed("alert", ctx, severity, error));
    }

    fn on_unrecognized(&self, filename: &str) {
        self.record(&JournalEntry::new("unrecognized", filename));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
