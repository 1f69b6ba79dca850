//! Declarative rule catalog definitions.
//!
//! These types describe a catalog as data, the way it is written in YAML or
//! TOML. The engine compiles each [`RuleDefinition`] into an executable rule.
//!
//! # Example
//!
//! ```rust
//! use quality_core::{CatalogDefinition, CheckSpec, Layer, RuleDefinition};
//!
//! let catalog = CatalogDefinition {
//!     name: "silver_checks".to_string(),
//!     description: None,
//!     layer: Layer::Silver,
//!     as_of: None,
//!     include_standard: false,
//!     sources: Default::default(),
//!     rules: vec![RuleDefinition {
//!         name: "cst_key_whitespace".to_string(),
//!         table: "crm_cust_info".to_string(),
//!         description: None,
//!         keys: Some(vec!["cst_id".to_string()]),
//!         check: CheckSpec::Trimmed {
//!             column: "cst_key".to_string(),
//!         },
//!     }],
//! };
//! assert_eq!(catalog.rules.len(), 1);
//! ```

use crate::Layer;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A complete catalog definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDefinition {
    /// Catalog name
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Layer the catalog is meant for
    #[serde(default)]
    pub layer: Layer,

    /// Reference date for time-dependent rules
    #[serde(default)]
    pub as_of: Option<NaiveDate>,

    /// Prepend the standard catalog to the declared rules
    #[serde(default)]
    pub include_standard: bool,

    /// Per-table source file overrides, relative to the data directory
    #[serde(default)]
    pub sources: BTreeMap<String, String>,

    /// Declared rules, in catalog order
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

/// A single declared rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Rule name, unique per table
    pub name: String,

    /// Target table
    pub table: String,

    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Key columns reported with each violation
    #[serde(default)]
    pub keys: Option<Vec<String>>,

    /// What to check
    pub check: CheckSpec,
}

/// The checks a declared rule can use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckSpec {
    /// Value must equal its trimmed form
    Trimmed {
        /// Column to check
        column: String,
    },

    /// Date must lie within `[min, max]`; `max` defaults to the run's as-of date
    DateWithin {
        /// Date column
        column: String,
        /// Inclusive lower bound
        #[serde(default)]
        min: Option<NaiveDate>,
        /// Inclusive upper bound
        #[serde(default)]
        max: Option<NaiveDate>,
        /// Whether null counts as a violation
        #[serde(default)]
        required: bool,
    },

    /// Integer-encoded `YYYYMMDD` date must be well-formed and within bounds
    IntDate {
        /// Integer date column
        column: String,
        /// Inclusive lower bound, defaults to 1900-01-01
        #[serde(default)]
        min: Option<NaiveDate>,
        /// Inclusive upper bound, defaults to the run's as-of date
        #[serde(default)]
        max: Option<NaiveDate>,
    },

    /// One date must not come after another
    DateOrder {
        /// Column that must be earlier or equal
        earlier: String,
        /// Column that must be later or equal
        later: String,
    },

    /// Sales must equal quantity times absolute price
    SalesConsistency {
        /// Sales amount column
        #[serde(default = "default_sales")]
        sales: String,
        /// Quantity column
        #[serde(default = "default_quantity")]
        quantity: String,
        /// Unit price column
        #[serde(default = "default_price")]
        price: String,
    },

    /// Numeric value must be present and not negative
    NonNegative {
        /// Numeric column
        column: String,
    },

    /// Value must be one of a fixed set
    AllowedValues {
        /// Column to check
        column: String,
        /// Valid values
        values: Vec<String>,
        /// Whether null counts as a violation
        #[serde(default)]
        required: bool,
    },

    /// String value must match a regex
    Pattern {
        /// Column to check
        column: String,
        /// Regular expression
        regex: String,
    },

    /// Key must be unique; the latest record of each duplicate group survives
    UniqueKey {
        /// Key columns
        key: Vec<String>,
        /// Recency column; the maximum value survives
        #[serde(default)]
        order_by: Option<String>,
        /// Whether null keys are reported
        #[serde(default = "default_true")]
        reject_null_keys: bool,
    },

    /// End date must be one day before the next start date of the same key
    EndDateInference {
        /// Partition key column
        key: String,
        /// Start date column
        start: String,
        /// Stored end date column
        end: String,
    },

    /// Value must exist in a column of another table
    Referential {
        /// Referencing column
        column: String,
        /// Referenced table
        ref_table: String,
        /// Referenced column
        ref_column: String,
    },
}

impl CheckSpec {
    /// Returns the `type` tag of the check.
    pub fn type_name(&self) -> &'static str {
        match self {
            CheckSpec::Trimmed { .. } => "trimmed",
            CheckSpec::DateWithin { .. } => "date_within",
            CheckSpec::IntDate { .. } => "int_date",
            CheckSpec::DateOrder { .. } => "date_order",
            CheckSpec::SalesConsistency { .. } => "sales_consistency",
            CheckSpec::NonNegative { .. } => "non_negative",
            CheckSpec::AllowedValues { .. } => "allowed_values",
            CheckSpec::Pattern { .. } => "pattern",
            CheckSpec::UniqueKey { .. } => "unique_key",
            CheckSpec::EndDateInference { .. } => "end_date_inference",
            CheckSpec::Referential { .. } => "referential",
        }
    }
}

fn default_sales() -> String {
    "sls_sales".to_string()
}

fn default_quantity() -> String {
    "sls_quantity".to_string()
}

fn default_price() -> String {
    "sls_price".to_string()
}

fn default_true() -> bool {
    true
}
