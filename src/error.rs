//! Errors raised while building a dashboard from a metric table.

use thiserror::Error;

/// Anything that stops a table from turning into a dashboard.
///
/// Every variant aborts the whole assembly; no partial document is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("entry {index}: metric has no title")]
    MissingTitle { index: usize },

    #[error("entry {index}: section label is empty")]
    EmptySectionLabel { index: usize },

    #[error("entry {index}: has both a section label and metric fields")]
    AmbiguousEntry { index: usize },

    #[error("entry {index}: is neither a section nor a metric")]
    EmptyEntry { index: usize },

    #[error("entry {index}: {key} must be at least 1")]
    ZeroSize { index: usize, key: &'static str },

    #[error("panel_defaults: {key} = {value} is outside {range}")]
    DefaultOutOfRange {
        key: &'static str,
        value: u32,
        range: &'static str,
    },

    #[error("metric '{title}' has no queries")]
    NoQueries { title: String },

    #[error("metric '{title}': query {position} has an empty expression")]
    EmptyExpression { title: String, position: usize },

    #[error("metric '{title}' appears before any section; no active section to attach it to")]
    NoActiveSection { title: String },

    #[error("panel '{panel}' has {count} targets; refId space A-Z is exhausted")]
    RefIdsExhausted { panel: String, count: usize },

    #[error("placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("template variable '{variable}' references '${referenced}' which is not declared before it")]
    ForwardReference { variable: String, referenced: String },
}
