//! The dashboard's two interactions, wired end to end.
//!
//! - A file is uploaded: [`Dashboard::update_table`] extracts and normalizes it, records it
//!   in the [`UploadSink`], and returns the [`TableView`] (data table, axis options, stats).
//! - Chart parameters change: [`Dashboard::update_chart`] re-derives the table for the
//!   current upload and builds the [`Chart`].
//!
//! The current upload is always passed in explicitly. The stateless building blocks are
//! available as [`load_table`] and [`table_view`].
//!
//! ```rust
//! use upload_insights::chart::ChartRequest;
//! use upload_insights::config::DashboardConfig;
//! use upload_insights::dashboard::Dashboard;
//! use upload_insights::store::DiscardSink;
//! use upload_insights::UploadPayload;
//!
//! let mut dashboard = Dashboard::new(DashboardConfig::default(), DiscardSink);
//! let upload = UploadPayload::from_bytes("data.csv", "text/csv", b"A,B\n1,2\n3,4\n");
//!
//! let view = dashboard.update_table(Some(&upload));
//! assert_eq!(view.records.len(), 2);
//! assert_eq!(view.stats[0].formatted, "2.00");
//!
//! let chart = dashboard.update_chart(Some(&upload), &ChartRequest::new("histogram", Some("A"), None));
//! assert!(!chart.is_empty());
//! ```

use serde::Serialize;

use crate::chart::{build_chart, Chart, ChartRequest};
use crate::config::DashboardConfig;
use crate::ingestion::ingest_upload;
use crate::payload::UploadPayload;
use crate::processing::{column_stats, normalize, ColumnStat, NormalizedTable};
use crate::store::UploadSink;
use crate::types::Value;

/// A data-table column header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub id: String,
}

/// An entry of the x/y axis dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnOption {
    pub label: String,
    pub value: String,
}

/// Everything the page shows after an upload.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableView {
    pub columns: Vec<ColumnSpec>,
    /// One JSON object per row, keyed by column name.
    pub records: Vec<serde_json::Map<String, serde_json::Value>>,
    pub options: Vec<ColumnOption>,
    pub stats: Vec<ColumnStat>,
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.records.is_empty() && self.options.is_empty() && self.stats.is_empty()
    }
}

/// Decode, extract and normalize `upload`. `None` for no upload or no table.
pub fn load_table(upload: Option<&UploadPayload>, config: &DashboardConfig) -> Option<NormalizedTable> {
    let upload = upload?;
    let ds = ingest_upload(upload, &config.ingestion).into_table()?;
    Some(normalize(&ds, &config.synthetic_columns))
}

/// Build the page state for `table`; empty when there is no table.
pub fn table_view(table: Option<&NormalizedTable>, config: &DashboardConfig) -> TableView {
    let Some(table) = table else {
        return TableView::default();
    };
    let names = table.column_names();

    let columns = names
        .iter()
        .map(|n| ColumnSpec {
            name: n.clone(),
            id: n.clone(),
        })
        .collect();
    let options = names
        .iter()
        .map(|n| ColumnOption {
            label: n.clone(),
            value: n.clone(),
        })
        .collect();
    let records = table
        .dataset()
        .rows
        .iter()
        .map(|row| {
            names
                .iter()
                .cloned()
                .zip(row.iter().map(to_json))
                .collect::<serde_json::Map<_, _>>()
        })
        .collect();

    TableView {
        columns,
        records,
        options,
        stats: column_stats(table, &config.stats),
    }
}

fn to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Int64(i) => serde_json::Value::from(*i),
        Value::Float64(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Utf8(s) => serde_json::Value::String(s.clone()),
    }
}

struct CachedTable {
    fingerprint: String,
    table: Option<NormalizedTable>,
}

/// Stateful front for the upload/chart interactions.
///
/// Holds only configuration, the sink, and (when [`DashboardConfig::cache_tables`] is set)
/// the table derived from the most recent upload.
pub struct Dashboard<S: UploadSink> {
    config: DashboardConfig,
    sink: S,
    cache: Option<CachedTable>,
}

impl<S: UploadSink> Dashboard<S> {
    pub fn new(config: DashboardConfig, sink: S) -> Self {
        Self {
            config,
            sink,
            cache: None,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Handle a file upload. `None` (nothing uploaded yet) resets every panel.
    ///
    /// Successfully parsed uploads are recorded in the sink; a sink failure is logged and
    /// does not change the returned view.
    pub fn update_table(&mut self, upload: Option<&UploadPayload>) -> TableView {
        let Some(upload) = upload else {
            return TableView::default();
        };
        self.refresh(upload);
        let view = match self.cached_table() {
            Some(table) => table_view(Some(table), &self.config),
            None => return TableView::default(),
        };

        match self.sink.record(&upload.filename, &upload.contents) {
            Ok(id) => log::debug!("recorded upload '{}' as #{id}", upload.filename),
            Err(e) => log::warn!("failed to record upload '{}': {e}", upload.filename),
        }
        view
    }

    /// Handle a chart-parameter change for the current upload.
    pub fn update_chart(&mut self, upload: Option<&UploadPayload>, request: &ChartRequest) -> Chart {
        let Some(upload) = upload else {
            return Chart::Empty;
        };
        self.refresh(upload);
        build_chart(self.cached_table(), request)
    }

    fn refresh(&mut self, upload: &UploadPayload) {
        let fingerprint = upload.fingerprint();
        let hit = self.config.cache_tables
            && self
                .cache
                .as_ref()
                .is_some_and(|c| c.fingerprint == fingerprint);

        if !hit {
            let table = load_table(Some(upload), &self.config);
            self.cache = Some(CachedTable { fingerprint, table });
        }
    }

    fn cached_table(&self) -> Option<&NormalizedTable> {
        self.cache.as_ref().and_then(|c| c.table.as_ref())
    }
}
