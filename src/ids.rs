//! Identifier allocation: per-panel target refIds and dashboard-wide panel ids.

use crate::error::BuildError;
use crate::model::Row;
use serde::{Serialize, Serializer};
use std::fmt;

/// RefIds come from this table, in order. There is no wraparound past `Z`.
const REF_ID_ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Single-letter identifier of a query target within its panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefId(u8);

impl RefId {
    pub fn as_char(self) -> char {
        self.0 as char
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Serialize for RefId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Allocate `count` refIds `A, B, C, ...` for the panel titled `panel`.
pub fn ref_ids(panel: &str, count: usize) -> Result<Vec<RefId>, BuildError> {
    if count > REF_ID_ALPHABET.len() {
        return Err(BuildError::RefIdsExhausted {
            panel: panel.to_string(),
            count,
        });
    }
    Ok(REF_ID_ALPHABET[..count].iter().copied().map(RefId).collect())
}

/// Number every content panel `1..=N` in row order, then panel order, and
/// give row headers the ids after that. Returns `N`.
///
/// Prior ids are overwritten, so running this twice yields the same result.
pub fn assign_panel_ids(rows: &mut [Row]) -> u32 {
    let mut next = 1u32;
    for panel in rows.iter_mut().flat_map(|row| row.panels.iter_mut()) {
        panel.id = next;
        next += 1;
    }
    let content = next - 1;

    for row in rows.iter_mut() {
        row.id = next;
        next += 1;
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Panel, Row};
    use crate::panel::{PanelDefaults, build_panel};
    use crate::table::MetricDescriptor;
    use crate::table::entry::Query;
    use pretty_assertions::assert_eq;

    fn letters(ids: &[RefId]) -> String {
        ids.iter().map(|id| id.as_char()).collect()
    }

    fn panel(title: &str) -> Panel {
        let descriptor = MetricDescriptor::new(title, vec![Query::new("up", "{{ instance }}")]);
        build_panel(&descriptor, &PanelDefaults::default()).unwrap()
    }

    #[test]
    fn ref_ids_follow_the_alphabet() {
        assert_eq!(letters(&ref_ids("p", 0).unwrap()), "");
        assert_eq!(letters(&ref_ids("p", 3).unwrap()), "ABC");
        assert_eq!(
            letters(&ref_ids("p", 26).unwrap()),
            "ABCDEFGHIJKLMNOPQRSTUVWXYZ"
        );
    }

    #[test]
    fn ref_ids_refuse_a_27th_target() {
        let err = ref_ids("busy", 27).unwrap_err();
        assert_eq!(
            err,
            BuildError::RefIdsExhausted {
                panel: "busy".to_string(),
                count: 27
            }
        );
    }

    #[test]
    fn ref_id_serializes_as_a_one_letter_string() {
        let ids = ref_ids("p", 2).unwrap();
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"["A","B"]"#);
    }

    #[test]
    fn panel_ids_run_across_rows_and_rows_come_after() {
        let mut a = Row::new("A");
        a.panels.push(panel("m1"));
        let mut b = Row::new("B");
        b.panels.push(panel("m2"));
        b.panels.push(panel("m3"));
        let mut rows = vec![a, b];

        assert_eq!(assign_panel_ids(&mut rows), 3);

        let ids: Vec<u32> = rows
            .iter()
            .flat_map(|r| r.panels.iter().map(|p| p.id))
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(rows[0].id, 4);
        assert_eq!(rows[1].id, 5);
    }

    #[test]
    fn panel_id_pass_is_idempotent() {
        let mut row = Row::new("A");
        row.panels.push(panel("m1"));
        row.panels.push(panel("m2"));
        row.panels[1].id = 42;
        let mut rows = vec![row];

        assign_panel_ids(&mut rows);
        let first = rows.clone();
        assign_panel_ids(&mut rows);
        assert_eq!(rows, first);
        assert_eq!(rows[0].panels[1].id, 2);
    }
}
