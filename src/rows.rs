//! Row/section builder: walks the metric table and groups panels under the
//! most recent section.

use crate::error::BuildError;
use crate::model::Row;
use crate::panel::{PanelDefaults, build_panel};
use crate::table::{Entry, MetricTable};

/// Accumulates rows for a single traversal of a table.
struct RowBuilder<'a> {
    defaults: &'a PanelDefaults,
    rows: Vec<Row>,
    /// Index into `rows` of the row new panels go to.
    current: Option<usize>,
}

impl<'a> RowBuilder<'a> {
    fn new(defaults: &'a PanelDefaults) -> Self {
        Self {
            defaults,
            rows: Vec::new(),
            current: None,
        }
    }

    fn push(&mut self, entry: &Entry) -> Result<(), BuildError> {
        match entry {
            Entry::Section(marker) => {
                self.rows.push(Row::new(marker.label.clone()));
                self.current = Some(self.rows.len() - 1);
            }
            Entry::Metric(descriptor) => {
                let Some(current) = self.current else {
                    return Err(BuildError::NoActiveSection {
                        title: descriptor.title.clone(),
                    });
                };
                let panel = build_panel(descriptor, self.defaults)?;
                self.rows[current].panels.push(panel);
            }
        }
        Ok(())
    }

    fn finish(self) -> Vec<Row> {
        self.rows
    }
}

/// Turn `table` into titled rows of panels, in table order.
pub fn build_rows(table: &MetricTable, defaults: &PanelDefaults) -> Result<Vec<Row>, BuildError> {
    let mut builder = RowBuilder::new(defaults);
    for entry in table.entries() {
        builder.push(entry)?;
    }
    Ok(builder.finish())
}
