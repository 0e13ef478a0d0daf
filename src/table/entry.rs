use crate::error::BuildError;
use crate::model::PanelKind;

/// Legend used when a table target does not name one.
pub const DEFAULT_LEGEND: &str = "{{ instance }}";

/// One expression of a metric, with the legend label Grafana shows for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub expr: String,
    pub legend: String,
}

impl Query {
    pub fn new(expr: impl Into<String>, legend: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            legend: legend.into(),
        }
    }
}

/// Starts a new row; every following metric lands in it.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionMarker {
    pub label: String,
}

/// Per-metric tweaks on top of the dashboard's panel defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelOverrides {
    pub kind: Option<PanelKind>,
    pub unit: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Describes one panel: a title and the queries it plots.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    pub title: String,
    pub description: Option<String>,
    pub queries: Vec<Query>,
    pub overrides: PanelOverrides,
}

impl MetricDescriptor {
    pub fn new(title: impl Into<String>, queries: Vec<Query>) -> Self {
        Self {
            title: title.into(),
            description: None,
            queries,
            overrides: PanelOverrides::default(),
        }
    }

    fn validate(&self, index: usize) -> Result<(), BuildError> {
        if self.title.trim().is_empty() {
            return Err(BuildError::MissingTitle { index });
        }
        if self.queries.is_empty() {
            return Err(BuildError::NoQueries {
                title: self.title.clone(),
            });
        }
        for (position, query) in self.queries.iter().enumerate() {
            if query.expr.trim().is_empty() {
                return Err(BuildError::EmptyExpression {
                    title: self.title.clone(),
                    position: position + 1,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Section(SectionMarker),
    Metric(MetricDescriptor),
}

impl Entry {
    pub fn section(label: impl Into<String>) -> Self {
        Entry::Section(SectionMarker {
            label: label.into(),
        })
    }

    pub fn metric(title: impl Into<String>, queries: Vec<Query>) -> Self {
        Entry::Metric(MetricDescriptor::new(title, queries))
    }
}

/// Ordered, validated list of table entries.
///
/// Construction rejects malformed entries. Entry order is not checked here:
/// a metric ahead of the first section is caught by the row builder.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTable {
    entries: Vec<Entry>,
}

impl MetricTable {
    pub fn new(entries: Vec<Entry>) -> Result<Self, BuildError> {
        for (index, entry) in entries.iter().enumerate() {
            match entry {
                Entry::Section(marker) => {
                    if marker.label.trim().is_empty() {
                        return Err(BuildError::EmptySectionLabel { index });
                    }
                }
                Entry::Metric(descriptor) => descriptor.validate(index)?,
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn metrics(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Metric(descriptor) => Some(descriptor),
            Entry::Section(_) => None,
        })
    }

    /// Every query expression in table order.
    pub fn expressions(&self) -> impl Iterator<Item = &str> {
        self.metrics()
            .flat_map(|m| m.queries.iter().map(|q| q.expr.as_str()))
    }
}
