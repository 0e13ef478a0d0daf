//! Dashboard assembler: variables + rows + settings -> finished dashboard.

use crate::error::BuildError;
use crate::ids::assign_panel_ids;
use crate::layout::place_panels;
use crate::model::{Dashboard, TimeRange};
use crate::panel::PanelDefaults;
use crate::rows::build_rows;
use crate::table::MetricTable;
use crate::templating::{
    PlaceholderScanner, TemplatingConfig, build_variables, check_declaration_order,
    undeclared_references,
};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Top-level settings of one dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    pub title: String,
    pub description: Option<String>,
    pub uid: Option<String>,
    pub tags: Vec<String>,
    pub timezone: String,
    pub time: TimeRange,
    pub refresh: String,
    pub editable: bool,
    pub templating: TemplatingConfig,
    pub panel_defaults: PanelDefaults,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            title: "New dashboard".to_string(),
            description: None,
            uid: None,
            tags: Vec::new(),
            timezone: "utc".to_string(),
            time: TimeRange::default(),
            refresh: "10s".to_string(),
            editable: true,
            templating: TemplatingConfig::default(),
            panel_defaults: PanelDefaults::default(),
        }
    }
}

/// Build the whole dashboard tree for `table`.
///
/// Pure: the same settings and table always give the same tree, ids
/// included. Any error aborts the assembly.
pub fn assemble(settings: &DashboardSettings, table: &MetricTable) -> Result<Dashboard, BuildError> {
    let scanner = PlaceholderScanner::new()?;

    // 1) Variables, in the order Grafana resolves them.
    let templating = build_variables(&settings.templating, table, &scanner);
    check_declaration_order(&templating, &scanner)?;
    for name in undeclared_references(&templating, table, &scanner) {
        warn!(variable = %name, "expression references an undeclared template variable");
    }

    // 2) Rows and panels.
    let mut rows = build_rows(table, &settings.panel_defaults)?;

    // 3) Global passes over the finished tree.
    let panels = assign_panel_ids(&mut rows);
    place_panels(&mut rows);
    debug!(
        title = %settings.title,
        rows = rows.len(),
        panels,
        variables = templating.len(),
        "assembled dashboard"
    );

    Ok(Dashboard {
        title: settings.title.clone(),
        description: settings.description.clone(),
        uid: settings.uid.clone(),
        tags: unique_tags(&settings.tags),
        timezone: settings.timezone.clone(),
        time: settings.time.clone(),
        refresh: settings.refresh.clone(),
        editable: settings.editable,
        templating,
        rows,
    })
}

/// Tags form a set; repeats are dropped, first occurrence wins.
fn unique_tags(tags: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    tags.iter()
        .filter(|tag| seen.insert(tag.as_str()))
        .cloned()
        .collect()
}
