//! Built-in dashboard tables, embedded at compile time.

use crate::table::{DashboardConfig, TableFormat, parse_table};
use anyhow::bail;

pub struct Preset {
    pub name: &'static str,
    pub summary: &'static str,
    source: &'static str,
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "emqx5-ee",
        summary: "EMQX 5 Enterprise cluster overview",
        source: include_str!("emqx5-ee.toml"),
    },
    Preset {
        name: "emqx-message",
        summary: "EMQX per-node message rates",
        source: include_str!("emqx-message.toml"),
    },
    Preset {
        name: "emqx-message-rates",
        summary: "EMQX Enterprise 5 message rates (ops)",
        source: include_str!("emqx-message-rates.toml"),
    },
];

impl Preset {
    pub fn load(&self) -> crate::Result<DashboardConfig> {
        parse_table(self.source, TableFormat::Toml, &format!("preset {}", self.name))
    }
}

pub fn find(name: &str) -> crate::Result<&'static Preset> {
    match PRESETS.iter().find(|p| p.name == name) {
        Some(preset) => Ok(preset),
        None => {
            let known: Vec<&str> = PRESETS.iter().map(|p| p.name).collect();
            bail!("unknown preset '{}' (known: {})", name, known.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble;
    use crate::model::{
        Dashboard, GradientMode, LegendMode, LegendPlacement, LineInterpolation, ShowPoints,
        TemplateVariable, TooltipMode,
    };
    use pretty_assertions::assert_eq;

    fn variable<'a>(dashboard: &'a Dashboard, name: &str) -> Option<&'a TemplateVariable> {
        dashboard.templating.iter().find(|v| v.name == name)
    }

    #[test]
    fn every_preset_assembles() {
        for preset in PRESETS {
            let config = preset.load().unwrap();
            let dashboard = assemble(&config.settings, &config.table).unwrap();
            assert!(dashboard.panel_count() > 0, "{} has no panels", preset.name);
        }
    }

    #[test]
    fn emqx5_enterprise_matches_its_table() {
        let config = find("emqx5-ee").unwrap().load().unwrap();
        let dashboard = assemble(&config.settings, &config.table).unwrap();

        assert_eq!(dashboard.title, "EMQX5 Enterprise");
        assert_eq!(dashboard.refresh, "5s");
        assert_eq!(dashboard.time.from, "now-5m");
        assert_eq!(dashboard.tags, vec!["test".to_string()]);
        assert_eq!(dashboard.rows.len(), 1);
        assert_eq!(dashboard.rows[0].title, "General");

        let panels: Vec<(u32, &str, usize)> = dashboard
            .panels()
            .map(|p| (p.id, p.title.as_str(), p.targets.len()))
            .collect();
        assert_eq!(
            panels,
            vec![(1, "Cluster Message Rate", 2), (2, "Nodes Running", 2)]
        );
        assert!(dashboard.panels().all(|p| p.grid_pos.w == 5 && p.grid_pos.h == 6));
        assert!(variable(&dashboard, "node").is_none());
    }

    #[test]
    fn message_presets_offer_the_node_selector() {
        for name in ["emqx-message", "emqx-message-rates"] {
            let config = find(name).unwrap().load().unwrap();
            let dashboard = assemble(&config.settings, &config.table).unwrap();
            let node = variable(&dashboard, "node").unwrap();
            assert!(node.multi && node.include_all, "{name}");
            assert!(
                dashboard
                    .panels()
                    .flat_map(|p| &p.targets)
                    .all(|t| t.legend_format == "{{ instance }}"),
                "{name}"
            );
        }
    }

    #[test]
    fn message_rates_keeps_plain_timeseries_styling() {
        let config = find("emqx-message-rates").unwrap().load().unwrap();
        let dashboard = assemble(&config.settings, &config.table).unwrap();

        for panel in dashboard.panels() {
            let d = &panel.display;
            assert_eq!(d.unit, "ops");
            assert_eq!(d.tooltip_mode, TooltipMode::Single);
            assert_eq!(d.line_interpolation, LineInterpolation::Linear);
            assert_eq!(d.show_points, ShowPoints::Auto);
            assert_eq!(d.gradient_mode, GradientMode::None);
            assert_eq!(d.fill_opacity, 0);
            assert_eq!(d.legend_mode, LegendMode::Table);
            assert_eq!(d.legend_placement, LegendPlacement::Bottom);
            assert_eq!(panel.grid_pos.w, 8);
            assert_eq!(panel.grid_pos.h, 8);
        }
    }

    #[test]
    fn message_table_uses_smooth_filled_lines() {
        let config = find("emqx-message").unwrap().load().unwrap();
        let dashboard = assemble(&config.settings, &config.table).unwrap();

        for panel in dashboard.panels() {
            let d = &panel.display;
            assert_eq!(d.tooltip_mode, TooltipMode::Multi);
            assert_eq!(d.line_interpolation, LineInterpolation::Smooth);
            assert_eq!(d.show_points, ShowPoints::Never);
            assert_eq!(d.gradient_mode, GradientMode::Opacity);
            assert_eq!(d.fill_opacity, 18);
        }
    }

    #[test]
    fn unknown_preset_lists_known_names() {
        let err = find("nope").err().unwrap().to_string();
        assert!(err.contains("emqx5-ee"), "{err}");
    }
}
