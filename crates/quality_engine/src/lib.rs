//! # Data Warehouse Quality Engine
//!
//! Rule engine for data warehouse quality checks. This crate provides the
//! logic for checking a snapshot of source tables, including:
//!
//! - Row-level checks (whitespace, date bounds, integer dates, sales arithmetic)
//! - Set-level checks (duplicate keys, end date inference, references)
//! - Grouping and ordered-scan helpers standing in for SQL window functions
//! - The standard catalog and compilation of declarative catalogs
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use quality_core::{Layer, Snapshot};
//! use quality_engine::RuleEngine;
//!
//! let engine = RuleEngine::standard().unwrap();
//! let snapshot = Snapshot::new(Layer::Bronze);
//!
//! // An empty snapshot lacks the tables the standard rules need
//! let result = engine.run(&snapshot, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
//! assert!(result.is_err());
//! ```

mod compile;
mod constraints;
mod dates;
mod engine;
mod quality;
mod sales;
mod standard;
mod window;

pub use compile::*;
pub use constraints::*;
pub use dates::*;
pub use engine::*;
pub use quality::*;
pub use sales::*;
pub use standard::*;
pub use window::*;
