//! Source tables and snapshots.

use crate::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// CRM customer master data.
pub const CRM_CUST_INFO: &str = "crm_cust_info";
/// CRM product master data (historised by start date).
pub const CRM_PRD_INFO: &str = "crm_prd_info";
/// CRM sales order lines.
pub const CRM_SALES_DETAILS: &str = "crm_sales_details";
/// ERP customer birthdate and gender.
pub const ERP_CUST_AZ12: &str = "erp_cust_az12";
/// ERP customer location.
pub const ERP_LOC_A101: &str = "erp_loc_a101";
/// ERP product category mapping.
pub const ERP_PX_CAT_G1V2: &str = "erp_px_cat_g1v2";

/// All source tables known to the engine, in load order.
pub const SOURCE_TABLES: [&str; 6] = [
    CRM_CUST_INFO,
    CRM_PRD_INFO,
    CRM_SALES_DETAILS,
    ERP_CUST_AZ12,
    ERP_LOC_A101,
    ERP_PX_CAT_G1V2,
];

/// Warehouse layer a snapshot was read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    /// Raw data, loaded as-is
    #[default]
    Bronze,
    /// Deduplicated, trimmed and standardized data
    Silver,
    /// Business-ready aggregates
    Gold,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layer::Bronze => "bronze",
            Layer::Silver => "silver",
            Layer::Gold => "gold",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bronze" | "raw" => Ok(Layer::Bronze),
            "silver" | "cleansed" => Ok(Layer::Silver),
            "gold" | "curated" => Ok(Layer::Gold),
            other => Err(format!("unknown layer '{}'", other)),
        }
    }
}

/// A named table: column list plus rows in physical order.
///
/// The position of a record in `rows` is its row index. Set-level checks use
/// it as the stable tie-breaker when ordering values are equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Table {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates a table from existing rows.
    pub fn from_rows(name: impl Into<String>, columns: Vec<String>, rows: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns true if the table declares the column.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the rows in physical order.
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Gets a specific row by index.
    pub fn get_row(&self, index: usize) -> Option<&Record> {
        self.rows.get(index)
    }

    /// Appends a row.
    pub fn push(&mut self, record: Record) {
        self.rows.push(record);
    }
}

/// An immutable view over the source tables for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    layer: Layer,
    tables: BTreeMap<String, Table>,
}

impl Snapshot {
    /// Creates an empty snapshot for a layer.
    pub fn new(layer: Layer) -> Self {
        Self {
            layer,
            tables: BTreeMap::new(),
        }
    }

    /// Adds a table, replacing one with the same name.
    pub fn insert(&mut self, table: Table) {
        self.tables.insert(table.name().to_string(), table);
    }

    /// Builder-style variant of [`Snapshot::insert`].
    pub fn with_table(mut self, table: Table) -> Self {
        self.insert(table);
        self
    }

    /// Returns the layer the snapshot was read from.
    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Looks up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Returns true if the snapshot contains the table.
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Returns the table names in sorted order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Returns the total number of rows across all tables.
    pub fn total_rows(&self) -> usize {
        self.tables.values().map(Table::len).sum()
    }
}
