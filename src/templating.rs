//! Template variables: the datasource, cluster and node selectors every
//! query expression is parameterised by.

use crate::error::BuildError;
use crate::model::{TemplateVariable, VariableKind, VariableRefresh};
use crate::table::MetricTable;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;

pub const DATASOURCE_VAR: &str = "datasource";
pub const CLUSTER_VAR: &str = "cluster";
pub const NODE_VAR: &str = "node";

/// Whether the per-instance `node` selector is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeVariable {
    /// Only when some expression references `$node`.
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplatingConfig {
    /// Datasource plugin type offered by the datasource selector.
    pub datasource_type: String,
    pub cluster_query: String,
    pub node_query: String,
    pub node: NodeVariable,
    /// Refresh policy of the cluster and node selectors.
    pub refresh: VariableRefresh,
}

impl Default for TemplatingConfig {
    fn default() -> Self {
        Self {
            datasource_type: "prometheus".to_string(),
            cluster_query: "label_values(up, cluster)".to_string(),
            node_query: r#"label_values(up{from="emqx",cluster="$cluster"}, instance)"#
                .to_string(),
            node: NodeVariable::Auto,
            refresh: VariableRefresh::OnLoad,
        }
    }
}

/// Finds `$name`, `${name}`, `${name:format}` and `[[name]]` references.
///
/// Grafana's built-ins (`$__rate_interval`, `$__range`, ...) are skipped.
pub struct PlaceholderScanner {
    re: Regex,
}

impl PlaceholderScanner {
    pub fn new() -> Result<Self, BuildError> {
        // Names start with a letter or underscore; `$1` is a PromQL capture group.
        let re = Regex::new(
            r"\$\{([A-Za-z_]\w*)(?::[^}]*)?\}|\$([A-Za-z_]\w*)|\[\[([A-Za-z_]\w*)(?::[^\]]*)?\]\]",
        )?;
        Ok(Self { re })
    }

    pub fn scan<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.re
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
            .map(|m| m.as_str())
            .filter(|name| !name.starts_with("__"))
            .collect()
    }
}

fn selector(
    name: &str,
    query: &str,
    datasource: &str,
    refresh: VariableRefresh,
) -> TemplateVariable {
    TemplateVariable {
        name: name.to_string(),
        label: None,
        kind: VariableKind::Query,
        query: query.to_string(),
        datasource: Some(datasource.to_string()),
        include_all: false,
        multi: false,
        options: Vec::new(),
        refresh,
        regex: String::new(),
        hidden: false,
    }
}

/// Build the dashboard's variables in dependency order:
/// datasource, then cluster, then (optionally) node.
pub fn build_variables(
    config: &TemplatingConfig,
    table: &MetricTable,
    scanner: &PlaceholderScanner,
) -> Vec<TemplateVariable> {
    let datasource_ref = format!("${}", DATASOURCE_VAR);
    let mut vars = vec![
        TemplateVariable {
            name: DATASOURCE_VAR.to_string(),
            label: Some(DATASOURCE_VAR.to_string()),
            kind: VariableKind::Datasource,
            query: config.datasource_type.clone(),
            datasource: None,
            include_all: false,
            multi: false,
            options: Vec::new(),
            refresh: VariableRefresh::OnLoad,
            regex: String::new(),
            hidden: false,
        },
        selector(CLUSTER_VAR, &config.cluster_query, &datasource_ref, config.refresh),
    ];

    let wants_node = match config.node {
        NodeVariable::Always => true,
        NodeVariable::Never => false,
        NodeVariable::Auto => table
            .expressions()
            .any(|expr| scanner.scan(expr).contains(&NODE_VAR)),
    };
    if wants_node {
        let mut node = selector(NODE_VAR, &config.node_query, &datasource_ref, config.refresh);
        node.include_all = true;
        node.multi = true;
        vars.push(node);
    }
    vars
}

/// Each variable may only reference variables declared before it, since
/// Grafana resolves them in declaration order.
pub fn check_declaration_order(
    vars: &[TemplateVariable],
    scanner: &PlaceholderScanner,
) -> Result<(), BuildError> {
    let mut declared: BTreeSet<&str> = BTreeSet::new();
    for var in vars {
        let sources = std::iter::once(var.query.as_str()).chain(var.datasource.as_deref());
        for text in sources {
            if let Some(referenced) = scanner
                .scan(text)
                .into_iter()
                .find(|name| !declared.contains(name))
            {
                return Err(BuildError::ForwardReference {
                    variable: var.name.clone(),
                    referenced: referenced.to_string(),
                });
            }
        }
        declared.insert(var.name.as_str());
    }
    Ok(())
}

/// Names referenced by table expressions that no variable declares.
pub fn undeclared_references(
    vars: &[TemplateVariable],
    table: &MetricTable,
    scanner: &PlaceholderScanner,
) -> BTreeSet<String> {
    let declared: BTreeSet<&str> = vars.iter().map(|v| v.name.as_str()).collect();
    table
        .expressions()
        .flat_map(|expr| scanner.scan(expr))
        .filter(|name| !declared.contains(name))
        .map(String::from)
        .collect()
}
