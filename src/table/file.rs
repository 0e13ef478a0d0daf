//! Table files: a dashboard definition as TOML (or JSON).
//!
//! TOML shape:
//!
//! ```toml
//! [dashboard]
//! title = "EMQX Message"
//! tags = ["emqx"]
//! time_from = "now-5m"        # optional, default now-1h
//! refresh = "5s"              # optional, default 10s
//!
//! [templating]
//! node = "auto"               # auto | always | never
//! refresh = "onLoad"          # never | onLoad | onTimeRangeChange
//!
//! [panel_defaults]
//! unit = "ops"
//! width = 8
//! height = 8
//!
//! [[entries]]
//! section = "Messages"
//!
//! [[entries]]
//! title = "Message Sent Rate"
//! exprs = ['sum by(instance) (irate(emqx_messages_sent{cluster="$cluster"}[$__rate_interval]))']
//!
//! [[entries]]
//! title = "Nodes Running"
//! targets = [{ expr = "max(emqx_cluster_nodes_running)", legend = "Running" }]
//! ```
//!
//! Raw entries carry every field as optional; `validate_and_build` decides
//! for each whether it is a section or a metric and rejects anything else.

use crate::assemble::DashboardSettings;
use crate::error::BuildError;
use crate::model::{
    GRID_COLUMNS, GradientMode, LegendMode, LegendPlacement, LineInterpolation, PanelKind,
    ScaleDistribution, ShowPoints, TooltipMode, VariableRefresh,
};
use crate::table::entry::{
    DEFAULT_LEGEND, Entry, MetricDescriptor, MetricTable, PanelOverrides, Query,
};
use crate::templating::NodeVariable;
use anyhow::{Context, bail};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableFile {
    #[serde(default)]
    pub dashboard: RawDashboard,

    #[serde(default)]
    pub templating: RawTemplating,

    #[serde(default)]
    pub panel_defaults: RawPanelDefaults,

    #[serde(default)]
    pub entries: Vec<RawEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDashboard {
    pub title: Option<String>,
    pub description: Option<String>,
    pub uid: Option<String>,
    pub tags: Option<Vec<String>>,
    pub timezone: Option<String>,
    pub time_from: Option<String>,
    pub time_to: Option<String>,
    pub refresh: Option<String>,
    pub editable: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTemplating {
    pub datasource_type: Option<String>,
    pub cluster_query: Option<String>,
    pub node_query: Option<String>,
    pub node: Option<NodeVariable>,
    pub refresh: Option<VariableRefresh>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPanelDefaults {
    pub datasource: Option<String>,
    pub kind: Option<PanelKind>,
    pub legend_mode: Option<LegendMode>,
    pub legend_placement: Option<LegendPlacement>,
    pub legend_calcs: Option<Vec<String>>,
    pub tooltip_mode: Option<TooltipMode>,
    pub unit: Option<String>,
    pub scale: Option<ScaleDistribution>,
    pub line_interpolation: Option<LineInterpolation>,
    pub show_points: Option<ShowPoints>,
    pub gradient_mode: Option<GradientMode>,
    pub fill_opacity: Option<u8>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl RawPanelDefaults {
    fn check_ranges(&self) -> Result<(), BuildError> {
        let checks = [
            ("width", self.width, 1..=GRID_COLUMNS, "1..=24"),
            ("height", self.height, 1..=u32::MAX, "1.."),
            ("fill_opacity", self.fill_opacity.map(u32::from), 0..=100, "0..=100"),
        ];
        for (key, value, allowed, range) in checks {
            match value {
                Some(value) if !allowed.contains(&value) => {
                    return Err(BuildError::DefaultOutOfRange { key, value, range });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Raw entry shape: either `section`, or `title` plus targets/exprs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawEntry {
    pub section: Option<String>,

    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub targets: Vec<RawTarget>,

    /// Shorthand: expressions that all use the default legend. Also read
    /// from `expr`, the key older table scripts used for the same list.
    #[serde(default, alias = "expr")]
    pub exprs: Vec<String>,

    #[serde(default)]
    pub kind: Option<PanelKind>,

    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub height: Option<u32>,

    #[serde(default)]
    pub min: Option<f64>,

    #[serde(default)]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTarget {
    #[serde(alias = "exp")]
    pub expr: String,

    #[serde(default, alias = "legendFormat")]
    pub legend: Option<String>,
}

impl RawEntry {
    fn has_metric_fields(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || !self.targets.is_empty()
            || !self.exprs.is_empty()
            || self.kind.is_some()
            || self.unit.is_some()
            || self.width.is_some()
            || self.height.is_some()
            || self.min.is_some()
            || self.max.is_some()
    }

    fn into_entry(self, index: usize) -> Result<Entry, BuildError> {
        let has_metric_fields = self.has_metric_fields();
        match (self.section, has_metric_fields) {
            (Some(_), true) => Err(BuildError::AmbiguousEntry { index }),
            (Some(label), false) => Ok(Entry::section(label)),
            (None, false) => Err(BuildError::EmptyEntry { index }),
            (None, true) => {
                let title = self.title.ok_or(BuildError::MissingTitle { index })?;
                if self.width == Some(0) {
                    return Err(BuildError::ZeroSize { index, key: "width" });
                }
                if self.height == Some(0) {
                    return Err(BuildError::ZeroSize { index, key: "height" });
                }
                let queries = self
                    .targets
                    .into_iter()
                    .map(|t| {
                        Query::new(t.expr, t.legend.unwrap_or_else(|| DEFAULT_LEGEND.to_string()))
                    })
                    .chain(self.exprs.into_iter().map(|e| Query::new(e, DEFAULT_LEGEND)))
                    .collect();
                Ok(Entry::Metric(MetricDescriptor {
                    title,
                    description: self.description,
                    queries,
                    overrides: PanelOverrides {
                        kind: self.kind,
                        unit: self.unit,
                        width: self.width,
                        height: self.height,
                        min: self.min,
                        max: self.max,
                    },
                }))
            }
        }
    }
}

/// A fully validated table file, ready for `assemble`.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub settings: DashboardSettings,
    pub table: MetricTable,
}

impl TableFile {
    /// Decide every entry's variant, validate the table, and fold the
    /// optional settings over the defaults.
    pub fn validate_and_build(self) -> Result<DashboardConfig, BuildError> {
        let entries = self
            .entries
            .into_iter()
            .enumerate()
            .map(|(index, raw)| raw.into_entry(index))
            .collect::<Result<Vec<_>, _>>()?;
        let table = MetricTable::new(entries)?;

        let mut settings = DashboardSettings::default();

        let d = self.dashboard;
        if let Some(title) = d.title {
            settings.title = title;
        }
        settings.description = d.description;
        settings.uid = d.uid;
        if let Some(tags) = d.tags {
            settings.tags = tags;
        }
        if let Some(timezone) = d.timezone {
            settings.timezone = timezone;
        }
        if let Some(from) = d.time_from {
            settings.time.from = from;
        }
        if let Some(to) = d.time_to {
            settings.time.to = to;
        }
        if let Some(refresh) = d.refresh {
            settings.refresh = refresh;
        }
        if let Some(editable) = d.editable {
            settings.editable = editable;
        }

        let t = self.templating;
        let templating = &mut settings.templating;
        if let Some(v) = t.datasource_type {
            templating.datasource_type = v;
        }
        if let Some(v) = t.cluster_query {
            templating.cluster_query = v;
        }
        if let Some(v) = t.node_query {
            templating.node_query = v;
        }
        if let Some(v) = t.node {
            templating.node = v;
        }
        if let Some(v) = t.refresh {
            templating.refresh = v;
        }

        let p = self.panel_defaults;
        p.check_ranges()?;
        let defaults = &mut settings.panel_defaults;
        if let Some(v) = p.datasource {
            defaults.datasource = v;
        }
        if let Some(v) = p.kind {
            defaults.kind = v;
        }
        if let Some(v) = p.width {
            defaults.width = v;
        }
        if let Some(v) = p.height {
            defaults.height = v;
        }
        let display = &mut defaults.display;
        if let Some(v) = p.legend_mode {
            display.legend_mode = v;
        }
        if let Some(v) = p.legend_placement {
            display.legend_placement = v;
        }
        if let Some(v) = p.legend_calcs {
            display.legend_calcs = v;
        }
        if let Some(v) = p.tooltip_mode {
            display.tooltip_mode = v;
        }
        if let Some(v) = p.unit {
            display.unit = v;
        }
        if let Some(v) = p.scale {
            display.scale = v;
        }
        if let Some(v) = p.line_interpolation {
            display.line_interpolation = v;
        }
        if let Some(v) = p.show_points {
            display.show_points = v;
        }
        if let Some(v) = p.gradient_mode {
            display.gradient_mode = v;
        }
        if let Some(v) = p.fill_opacity {
            display.fill_opacity = v;
        }

        Ok(DashboardConfig { settings, table })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Toml,
    Json,
}

impl TableFormat {
    /// `.json` files are JSON; anything else is read as TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TableFormat::Json,
            _ => TableFormat::Toml,
        }
    }
}

/// Parse and validate table text. `origin` names the source in errors.
pub fn parse_table(text: &str, format: TableFormat, origin: &str) -> crate::Result<DashboardConfig> {
    let file: TableFile = match format {
        TableFormat::Toml => {
            toml::from_str(text).with_context(|| format!("parse table file {}", origin))?
        }
        TableFormat::Json => {
            serde_json::from_str(text).with_context(|| format!("parse table file {}", origin))?
        }
    };
    if file.entries.is_empty() {
        bail!("table file {} contained no entries", origin);
    }
    let config = file
        .validate_and_build()
        .with_context(|| format!("invalid table file {}", origin))?;
    Ok(config)
}

pub fn load_table_file(path: &Path) -> crate::Result<DashboardConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read table file {}", path.display()))?;
    parse_table(&text, TableFormat::from_path(path), &path.display().to_string())
}
