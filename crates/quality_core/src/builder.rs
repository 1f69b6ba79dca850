//! Builders for catalogs and tables.
//!
//! Fluent helpers for assembling catalog definitions and in-memory tables,
//! mostly used by tests and embedding applications.

use crate::{CatalogDefinition, CheckSpec, Layer, Record, RuleDefinition, Table, Value};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Builder for creating a `CatalogDefinition`.
///
/// # Example
///
/// ```rust
/// use quality_core::{CatalogBuilder, CheckSpec, Layer};
///
/// let catalog = CatalogBuilder::new("silver_checks")
///     .layer(Layer::Silver)
///     .rule(
///         "prd_cost_non_negative",
///         "crm_prd_info",
///         CheckSpec::NonNegative { column: "prd_cost".to_string() },
///     )
///     .build();
/// assert_eq!(catalog.rules.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    name: String,
    description: Option<String>,
    layer: Layer,
    as_of: Option<NaiveDate>,
    include_standard: bool,
    sources: BTreeMap<String, String>,
    rules: Vec<RuleDefinition>,
}

impl CatalogBuilder {
    /// Creates a new catalog builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the catalog description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the layer.
    pub fn layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    /// Sets the reference date.
    pub fn as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// Prepends the standard catalog.
    pub fn include_standard(mut self, include: bool) -> Self {
        self.include_standard = include;
        self
    }

    /// Overrides the source file of a table.
    pub fn source(mut self, table: impl Into<String>, path: impl Into<String>) -> Self {
        self.sources.insert(table.into(), path.into());
        self
    }

    /// Adds a rule without key columns.
    pub fn rule(self, name: impl Into<String>, table: impl Into<String>, check: CheckSpec) -> Self {
        self.rule_definition(RuleDefinition {
            name: name.into(),
            table: table.into(),
            description: None,
            keys: None,
            check,
        })
    }

    /// Adds a fully specified rule.
    pub fn rule_definition(mut self, rule: RuleDefinition) -> Self {
        self.rules.push(rule);
        self
    }

    /// Builds the catalog definition.
    pub fn build(self) -> CatalogDefinition {
        CatalogDefinition {
            name: self.name,
            description: self.description,
            layer: self.layer,
            as_of: self.as_of,
            include_standard: self.include_standard,
            sources: self.sources,
            rules: self.rules,
        }
    }
}

/// Builder for creating a `Table` row by row.
///
/// # Example
///
/// ```rust
/// use quality_core::{TableBuilder, Value};
///
/// let table = TableBuilder::new("crm_sales_details")
///     .columns(["sls_ord_num", "sls_quantity"])
///     .row(["SO1".into(), Value::Int(2)])
///     .build();
/// assert_eq!(table.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct TableBuilder {
    name: String,
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl TableBuilder {
    /// Creates a new table builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the column names.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a row, matching values to columns by position.
    ///
    /// Missing trailing values are filled with nulls; extra values are ignored.
    pub fn row<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut values = values.into_iter();
        let record = self
            .columns
            .iter()
            .map(|column| (column.clone(), values.next().unwrap_or(Value::Null)))
            .collect();
        self.rows.push(record);
        self
    }

    /// Adds a prepared record.
    pub fn record(mut self, record: Record) -> Self {
        self.rows.push(record);
        self
    }

    /// Builds the table.
    pub fn build(self) -> Table {
        Table::from_rows(self.name, self.columns, self.rows)
    }
}
