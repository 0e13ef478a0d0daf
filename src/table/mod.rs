//! Metric table: the ordered section/metric entries a dashboard is built from.
//!
//! It owns:
//! - typed entries (`Entry`, `MetricDescriptor`, `Query`) and `MetricTable`
//! - the table file schema and its validation into those types

pub mod entry;
pub mod file;

pub use entry::{Entry, MetricDescriptor, MetricTable};
pub use file::{DashboardConfig, TableFormat, load_table_file, parse_table};
