//! Grid placement: row headers span the grid, panels flow left to right and
//! wrap when the next one would not fit.

use crate::model::{GRID_COLUMNS, Row};

pub fn place_panels(rows: &mut [Row]) {
    let mut y = 0u32;
    for row in rows.iter_mut() {
        row.grid_pos.x = 0;
        row.grid_pos.y = y;
        y += row.grid_pos.h;

        let mut x = 0u32;
        // Tallest panel on the current line decides where the next line starts.
        let mut line_height = 0u32;
        for panel in row.panels.iter_mut() {
            let w = panel.grid_pos.w.min(GRID_COLUMNS);
            if x + w > GRID_COLUMNS {
                y += line_height;
                x = 0;
                line_height = 0;
            }
            panel.grid_pos.w = w;
            panel.grid_pos.x = x;
            panel.grid_pos.y = y;
            x += w;
            line_height = line_height.max(panel.grid_pos.h);
        }
        y += line_height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GridPos;
    use crate::panel::{PanelDefaults, build_panel};
    use crate::table::MetricDescriptor;
    use crate::table::entry::{PanelOverrides, Query};
    use pretty_assertions::assert_eq;

    fn sized_panel(w: u32, h: u32) -> crate::model::Panel {
        let mut descriptor = MetricDescriptor::new("p", vec![Query::new("up", "up")]);
        descriptor.overrides = PanelOverrides {
            width: Some(w),
            height: Some(h),
            ..PanelOverrides::default()
        };
        build_panel(&descriptor, &PanelDefaults::default()).unwrap()
    }

    fn positions(row: &Row) -> Vec<GridPos> {
        row.panels.iter().map(|p| p.grid_pos).collect()
    }

    #[test]
    fn panels_wrap_at_grid_width() {
        let mut row = Row::new("A");
        for _ in 0..4 {
            row.panels.push(sized_panel(8, 8));
        }
        let mut rows = vec![row];
        place_panels(&mut rows);

        assert_eq!(rows[0].grid_pos, GridPos { h: 1, w: 24, x: 0, y: 0 });
        assert_eq!(
            positions(&rows[0]),
            vec![
                GridPos { h: 8, w: 8, x: 0, y: 1 },
                GridPos { h: 8, w: 8, x: 8, y: 1 },
                GridPos { h: 8, w: 8, x: 16, y: 1 },
                GridPos { h: 8, w: 8, x: 0, y: 9 },
            ]
        );
    }

    #[test]
    fn next_row_starts_below_the_tallest_panel() {
        let mut a = Row::new("A");
        a.panels.push(sized_panel(12, 4));
        a.panels.push(sized_panel(12, 6));
        let b = Row::new("B");
        let mut rows = vec![a, b];
        place_panels(&mut rows);

        assert_eq!(rows[1].grid_pos.y, 7);
    }

    #[test]
    fn oversized_panels_are_clamped() {
        let mut row = Row::new("A");
        row.panels.push(sized_panel(30, 5));
        let mut rows = vec![row];
        place_panels(&mut rows);

        assert_eq!(rows[0].panels[0].grid_pos, GridPos { h: 5, w: 24, x: 0, y: 1 });
    }
}
