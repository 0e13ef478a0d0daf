use crate::ids::RefId;
use crate::model::{Dashboard, GridPos, Panel, PanelKind, Row, TemplateVariable};
use serde::Serialize;
use serde_json::{Map, Value, json};

/// Grafana dashboard schema version the output is written against.
const SCHEMA_VERSION: u32 = 38;

/// How sections appear in the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RowLayout {
    /// One top-level `panels` list with a `row` panel heading each section.
    #[default]
    Flat,
    /// Legacy `rows` list, each row holding its own panels.
    Nested,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardJson<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    uid: Option<&'a str>,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    tags: &'a [String],
    timezone: &'a str,
    editable: bool,
    schema_version: u32,
    time: TimeJson<'a>,
    refresh: &'a str,
    templating: TemplatingJson<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    panels: Option<Vec<PanelEntry<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<Vec<RowJson<'a>>>,
}

#[derive(Serialize)]
struct TimeJson<'a> {
    from: &'a str,
    to: &'a str,
}

#[derive(Serialize)]
struct TemplatingJson<'a> {
    list: Vec<VariableJson<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VariableJson<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(rename = "type")]
    kind: &'static str,
    query: &'a str,
    datasource: Option<&'a str>,
    include_all: bool,
    multi: bool,
    options: &'a [String],
    refresh: u8,
    regex: &'a str,
    hide: u8,
}

#[derive(Serialize)]
#[serde(untagged)]
enum PanelEntry<'a> {
    Row(RowPanelJson<'a>),
    Panel(PanelJson<'a>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RowPanelJson<'a> {
    id: u32,
    title: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    collapsed: bool,
    grid_pos: GridPosJson,
    /// Always empty: only collapsed rows nest their panels.
    panels: Vec<PanelJson<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RowJson<'a> {
    title: &'a str,
    show_title: bool,
    collapse: bool,
    panels: Vec<PanelJson<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PanelJson<'a> {
    id: u32,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    datasource: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    grid_pos: GridPosJson,
    field_config: Value,
    options: Value,
    targets: Vec<TargetJson<'a>>,
}

#[derive(Serialize)]
struct GridPosJson {
    h: u32,
    w: u32,
    x: u32,
    y: u32,
}

impl From<GridPos> for GridPosJson {
    fn from(g: GridPos) -> Self {
        Self {
            h: g.h,
            w: g.w,
            x: g.x,
            y: g.y,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetJson<'a> {
    expr: &'a str,
    format: &'static str,
    instant: bool,
    legend_format: &'a str,
    ref_id: RefId,
}

fn panel_type(kind: PanelKind) -> &'static str {
    match kind {
        PanelKind::TimeSeries => "timeseries",
        PanelKind::Gauge => "gauge",
        PanelKind::Stat => "stat",
    }
}

fn field_config(panel: &Panel) -> Value {
    let d = &panel.display;
    let mut defaults = Map::new();
    defaults.insert("unit".into(), json!(d.unit));
    if let Some(min) = d.min {
        defaults.insert("min".into(), json!(min));
    }
    if let Some(max) = d.max {
        defaults.insert("max".into(), json!(max));
    }
    defaults.insert("color".into(), json!({ "mode": "palette-classic" }));
    defaults.insert(
        "thresholds".into(),
        json!({
            "mode": "absolute",
            "steps": [
                { "color": "green", "value": null },
                { "color": "red", "value": 80 }
            ]
        }),
    );
    if panel.kind == PanelKind::TimeSeries {
        defaults.insert(
            "custom".into(),
            json!({
                "drawStyle": "line",
                "lineInterpolation": d.line_interpolation,
                "lineWidth": 1,
                "fillOpacity": d.fill_opacity,
                "gradientMode": d.gradient_mode,
                "showPoints": d.show_points,
                "pointSize": 5,
                "spanNulls": false,
                "scaleDistribution": { "type": d.scale }
            }),
        );
    }
    json!({ "defaults": defaults, "overrides": [] })
}

fn options(panel: &Panel) -> Value {
    let d = &panel.display;
    match panel.kind {
        PanelKind::TimeSeries => json!({
            "legend": {
                "displayMode": d.legend_mode,
                "placement": d.legend_placement,
                "calcs": d.legend_calcs
            },
            "tooltip": { "mode": d.tooltip_mode }
        }),
        PanelKind::Gauge => json!({
            "reduceOptions": { "calcs": ["lastNotNull"], "fields": "", "values": false },
            "orientation": "auto",
            "showThresholdLabels": false,
            "showThresholdMarkers": true
        }),
        PanelKind::Stat => json!({
            "reduceOptions": { "calcs": ["lastNotNull"], "fields": "", "values": false },
            "orientation": "auto",
            "colorMode": "value",
            "graphMode": "area",
            "justifyMode": "auto",
            "textMode": "auto"
        }),
    }
}

fn panel_json(panel: &Panel) -> PanelJson<'_> {
    PanelJson {
        id: panel.id,
        title: &panel.title,
        description: panel.description.as_deref(),
        datasource: &panel.datasource,
        kind: panel_type(panel.kind),
        grid_pos: panel.grid_pos.into(),
        field_config: field_config(panel),
        options: options(panel),
        targets: panel
            .targets
            .iter()
            .map(|t| TargetJson {
                expr: &t.expr,
                format: "time_series",
                instant: false,
                legend_format: &t.legend_format,
                ref_id: t.ref_id,
            })
            .collect(),
    }
}

fn row_panel_json(row: &Row) -> RowPanelJson<'_> {
    RowPanelJson {
        id: row.id,
        title: &row.title,
        kind: "row",
        collapsed: row.collapsed,
        grid_pos: row.grid_pos.into(),
        panels: Vec::new(),
    }
}

fn variable_json(var: &TemplateVariable) -> VariableJson<'_> {
    VariableJson {
        name: &var.name,
        label: var.label.as_deref(),
        kind: var.kind.as_str(),
        query: &var.query,
        datasource: var.datasource.as_deref(),
        include_all: var.include_all,
        multi: var.multi,
        options: &var.options,
        refresh: var.refresh.code(),
        regex: &var.regex,
        hide: if var.hidden { 2 } else { 0 },
    }
}

/// Render `dashboard` as pretty-printed Grafana JSON.
pub fn render_dashboard(dashboard: &Dashboard, layout: RowLayout) -> crate::Result<String> {
    let (panels, rows) = match layout {
        RowLayout::Flat => {
            let mut panels = Vec::with_capacity(dashboard.panel_count() + dashboard.rows.len());
            for row in &dashboard.rows {
                panels.push(PanelEntry::Row(row_panel_json(row)));
                panels.extend(row.panels.iter().map(|p| PanelEntry::Panel(panel_json(p))));
            }
            (Some(panels), None)
        }
        RowLayout::Nested => {
            let rows = dashboard
                .rows
                .iter()
                .map(|row| RowJson {
                    title: &row.title,
                    show_title: row.show_title,
                    collapse: row.collapsed,
                    panels: row.panels.iter().map(panel_json).collect(),
                })
                .collect();
            (None, Some(rows))
        }
    };

    let doc = DashboardJson {
        uid: dashboard.uid.as_deref(),
        title: &dashboard.title,
        description: dashboard.description.as_deref(),
        tags: &dashboard.tags,
        timezone: &dashboard.timezone,
        editable: dashboard.editable,
        schema_version: SCHEMA_VERSION,
        time: TimeJson {
            from: &dashboard.time.from,
            to: &dashboard.time.to,
        },
        refresh: &dashboard.refresh,
        templating: TemplatingJson {
            list: dashboard.templating.iter().map(variable_json).collect(),
        },
        panels,
        rows,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}
