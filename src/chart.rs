//! Chart descriptions built from a normalized table.
//!
//! The crate does not render charts. [`build_chart`] produces a renderer-neutral [`Figure`]
//! (serializable with serde) or [`Chart::Empty`] when the request cannot be satisfied.

use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::processing::NormalizedTable;
use crate::types::Value;

/// Supported chart kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Scatter,
    Histogram,
}

impl ChartKind {
    /// Parse the widget value (`"bar"`, `"line"`, `"scatter"`, `"histogram"`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bar" => Some(Self::Bar),
            "line" => Some(Self::Line),
            "scatter" => Some(Self::Scatter),
            "histogram" => Some(Self::Histogram),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Scatter => "scatter",
            Self::Histogram => "histogram",
        }
    }

    /// Whether the kind needs a y column (everything but histograms).
    pub fn needs_y(self) -> bool {
        !matches!(self, Self::Histogram)
    }
}

/// Chart parameters selected in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChartRequest {
    /// `None` when the selected kind is not supported.
    pub kind: Option<ChartKind>,
    pub x: Option<String>,
    pub y: Option<String>,
}

impl ChartRequest {
    /// Build a request from raw widget values.
    pub fn new(kind: &str, x: Option<&str>, y: Option<&str>) -> Self {
        Self {
            kind: ChartKind::parse(kind),
            x: x.map(str::to_owned),
            y: y.map(str::to_owned),
        }
    }
}

/// One series of a figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub x: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<Value>>,
}

/// A renderer-neutral chart description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub kind: ChartKind,
    pub x: String,
    pub y: Option<String>,
    /// Column used to color (and split) traces.
    pub color: Option<String>,
    pub traces: Vec<Trace>,
}

/// Result of a chart request. `Empty` serializes as `{}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Chart {
    #[default]
    Empty,
    Figure(Figure),
}

impl Chart {
    pub fn is_empty(&self) -> bool {
        matches!(self, Chart::Empty)
    }

    pub fn figure(&self) -> Option<&Figure> {
        match self {
            Chart::Figure(f) => Some(f),
            Chart::Empty => None,
        }
    }
}

impl Serialize for Chart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Chart::Empty => serializer.serialize_map(Some(0))?.end(),
            Chart::Figure(figure) => figure.serialize(serializer),
        }
    }
}

/// Build the chart for `request` over `table`.
///
/// Returns [`Chart::Empty`] when there is no table, the kind is unsupported, or a required
/// column is missing from the request or the table.
pub fn build_chart(table: Option<&NormalizedTable>, request: &ChartRequest) -> Chart {
    let (Some(table), Some(kind), Some(x)) = (table, request.kind, request.x.as_deref()) else {
        return Chart::Empty;
    };
    let Some(x_values) = table.column(x) else {
        return Chart::Empty;
    };

    if !kind.needs_y() {
        return Chart::Figure(Figure {
            kind,
            x: x.to_string(),
            y: None,
            color: None,
            traces: vec![Trace {
                name: x.to_string(),
                x: x_values.into_iter().cloned().collect(),
                y: None,
            }],
        });
    }

    let Some(y) = request.y.as_deref() else {
        return Chart::Empty;
    };
    let Some(y_values) = table.column(y) else {
        return Chart::Empty;
    };

    Chart::Figure(Figure {
        kind,
        x: x.to_string(),
        y: Some(y.to_string()),
        color: Some(x.to_string()),
        traces: group_by_x(&x_values, &y_values),
    })
}

/// One trace per distinct x value, in first-seen order.
fn group_by_x(x_values: &[&Value], y_values: &[&Value]) -> Vec<Trace> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut traces: Vec<Trace> = Vec::new();

    for (x, y) in x_values.iter().zip(y_values) {
        let name = x.to_string();
        let slot = *index.entry(name.clone()).or_insert_with(|| {
            traces.push(Trace {
                name,
                x: Vec::new(),
                y: Some(Vec::new()),
            });
            traces.len() - 1
        });
        let trace = &mut traces[slot];
        trace.x.push((*x).clone());
        if let Some(ys) = trace.y.as_mut() {
            ys.push((*y).clone());
        }
    }
    traces
}
