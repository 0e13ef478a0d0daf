//! Document tree produced by the assembler: dashboard -> rows -> panels ->
//! targets, plus the dashboard's template variables.
//!
//! These are plain owned structures. Wire naming (camelCase keys, numeric
//! codes) lives in `render`; only the small display enums carry serde names
//! because table files spell them the same way Grafana does.

use crate::ids::RefId;
use serde::{Deserialize, Serialize};

/// Width of the Grafana layout grid.
pub const GRID_COLUMNS: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridPos {
    pub h: u32,
    pub w: u32,
    pub x: u32,
    pub y: u32,
}

impl GridPos {
    /// A size with no placement yet; `layout` fills in `x`/`y`.
    pub fn sized(h: u32, w: u32) -> Self {
        Self { h, w, x: 0, y: 0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryTarget {
    /// Opaque query text; `$name` placeholders are resolved by the backend.
    pub expr: String,
    pub legend_format: String,
    pub ref_id: RefId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    #[default]
    TimeSeries,
    Gauge,
    Stat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LegendMode {
    List,
    Table,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LegendPlacement {
    Bottom,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TooltipMode {
    Single,
    Multi,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineInterpolation {
    Linear,
    Smooth,
    StepBefore,
    StepAfter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShowPoints {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GradientMode {
    None,
    Opacity,
    Hue,
    Scheme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScaleDistribution {
    Linear,
    Log,
}

/// How a panel draws its series, legend and axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayOptions {
    pub legend_mode: LegendMode,
    pub legend_placement: LegendPlacement,
    /// Reducer names shown in the legend table (`lastNotNull`, `max`, ...).
    pub legend_calcs: Vec<String>,
    pub tooltip_mode: TooltipMode,
    pub unit: String,
    pub scale: ScaleDistribution,
    pub line_interpolation: LineInterpolation,
    pub show_points: ShowPoints,
    pub gradient_mode: GradientMode,
    pub fill_opacity: u8,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    /// 0 until the assembler's id pass runs.
    pub id: u32,
    pub title: String,
    pub description: Option<String>,
    pub datasource: String,
    pub kind: PanelKind,
    pub display: DisplayOptions,
    pub grid_pos: GridPos,
    pub targets: Vec<QueryTarget>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Only meaningful when rows are rendered as `row` panels.
    pub id: u32,
    pub title: String,
    pub show_title: bool,
    pub collapsed: bool,
    pub grid_pos: GridPos,
    pub panels: Vec<Panel>,
}

impl Row {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            show_title: true,
            collapsed: false,
            grid_pos: GridPos::sized(1, GRID_COLUMNS),
            panels: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Datasource,
    Query,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Datasource => "datasource",
            VariableKind::Query => "query",
        }
    }
}

/// When Grafana re-runs a variable's query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableRefresh {
    Never,
    OnLoad,
    OnTimeRangeChange,
}

impl VariableRefresh {
    pub fn code(self) -> u8 {
        match self {
            VariableRefresh::Never => 0,
            VariableRefresh::OnLoad => 1,
            VariableRefresh::OnTimeRangeChange => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateVariable {
    pub name: String,
    pub label: Option<String>,
    pub kind: VariableKind,
    pub query: String,
    pub datasource: Option<String>,
    pub include_all: bool,
    pub multi: bool,
    pub options: Vec<String>,
    pub refresh: VariableRefresh,
    pub regex: String,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self {
            from: "now-1h".to_string(),
            to: "now".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub title: String,
    pub description: Option<String>,
    pub uid: Option<String>,
    pub tags: Vec<String>,
    pub timezone: String,
    pub time: TimeRange,
    pub refresh: String,
    pub editable: bool,
    pub templating: Vec<TemplateVariable>,
    pub rows: Vec<Row>,
}

impl Dashboard {
    /// Content panels in row order, then panel order within each row.
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.rows.iter().flat_map(|row| row.panels.iter())
    }

    pub fn panel_count(&self) -> usize {
        self.panels().count()
    }
}
