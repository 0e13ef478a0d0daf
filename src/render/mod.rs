//! Serialization of the assembled tree into Grafana's dashboard JSON.

pub mod json;

pub use json::{RowLayout, render_dashboard};
