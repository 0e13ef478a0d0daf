//! Panel builder: one metric descriptor in, one configured panel out.

use crate::error::BuildError;
use crate::ids::ref_ids;
use crate::model::{
    DisplayOptions, GradientMode, GridPos, LegendMode, LegendPlacement, LineInterpolation, Panel,
    PanelKind, QueryTarget, ScaleDistribution, ShowPoints, TooltipMode,
};
use crate::table::MetricDescriptor;

/// Display settings shared by every panel of a dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelDefaults {
    pub datasource: String,
    pub kind: PanelKind,
    pub display: DisplayOptions,
    pub width: u32,
    pub height: u32,
}

impl Default for PanelDefaults {
    fn default() -> Self {
        Self {
            datasource: "prometheus".to_string(),
            kind: PanelKind::TimeSeries,
            display: DisplayOptions {
                legend_mode: LegendMode::Table,
                legend_placement: LegendPlacement::Bottom,
                legend_calcs: ["lastNotNull", "min", "max", "mean", "sum"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
                tooltip_mode: TooltipMode::Multi,
                unit: "short".to_string(),
                scale: ScaleDistribution::Linear,
                line_interpolation: LineInterpolation::Smooth,
                show_points: ShowPoints::Never,
                gradient_mode: GradientMode::Opacity,
                fill_opacity: 0,
                min: None,
                max: None,
            },
            width: 8,
            height: 8,
        }
    }
}

/// Build the panel for `descriptor`. Its id stays 0 and its grid position
/// unplaced until the assembler's global passes run.
pub fn build_panel(
    descriptor: &MetricDescriptor,
    defaults: &PanelDefaults,
) -> Result<Panel, BuildError> {
    if descriptor.queries.is_empty() {
        return Err(BuildError::NoQueries {
            title: descriptor.title.clone(),
        });
    }

    let ids = ref_ids(&descriptor.title, descriptor.queries.len())?;
    let targets = descriptor
        .queries
        .iter()
        .zip(ids)
        .map(|(query, ref_id)| QueryTarget {
            expr: query.expr.clone(),
            legend_format: query.legend.clone(),
            ref_id,
        })
        .collect();

    let overrides = &descriptor.overrides;
    let mut display = defaults.display.clone();
    if let Some(unit) = &overrides.unit {
        display.unit = unit.clone();
    }
    if overrides.min.is_some() {
        display.min = overrides.min;
    }
    if overrides.max.is_some() {
        display.max = overrides.max;
    }

    Ok(Panel {
        id: 0,
        title: descriptor.title.clone(),
        description: descriptor.description.clone(),
        datasource: defaults.datasource.clone(),
        kind: overrides.kind.unwrap_or(defaults.kind),
        display,
        grid_pos: GridPos::sized(
            overrides.height.unwrap_or(defaults.height),
            overrides.width.unwrap_or(defaults.width),
        ),
        targets,
    })
}
