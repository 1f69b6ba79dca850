//! # Data Warehouse Quality Core
//!
//! Core data structures for the data warehouse quality checks.
//!
//! This crate provides the building blocks shared by the rule engine, the
//! catalog parser and the source loaders: typed values and records, tables
//! and snapshots, the rule abstraction, violations and reports, and the
//! declarative catalog definition.
//!
//! ## Key Concepts
//!
//! - **Snapshot**: immutable set of source tables read from one warehouse layer
//! - **Rule**: a named row-level or set-level check bound to a table
//! - **Violation**: one discrepancy, with rule, table, keys, expected and actual values
//! - **RuleReport**: the ordered violations of one run
//!
//! ## Example
//!
//! ```rust
//! use quality_core::{Finding, Record, Rule, RuleContext, RuleError};
//!
//! let rule = Rule::row(
//!     "cst_key_whitespace",
//!     "crm_cust_info",
//!     |record: &Record, _ctx: &RuleContext<'_>| -> Result<Option<Finding>, RuleError> {
//!         let key = record.text("cst_key")?.unwrap_or_default();
//!         Ok((key.trim() != key).then(|| Finding::new("unwanted spaces").actual(&key)))
//!     },
//! )
//! .keys(["cst_id"]);
//!
//! assert_eq!(rule.table(), "crm_cust_info");
//! ```

pub mod builder;
pub mod catalog;
pub mod error;
pub mod report;
pub mod rule;
pub mod table;
pub mod value;

pub use builder::*;
pub use catalog::*;
pub use error::*;
pub use report::*;
pub use rule::*;
pub use table::*;
pub use value::*;
