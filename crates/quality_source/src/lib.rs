//! CSV source store for data warehouse quality checks.
//!
//! This module reads the CRM and ERP source extracts into a [`Snapshot`]
//! the rule engine can run against. Files are registered with a DataFusion
//! `SessionContext`, scanned in full, and the resulting Arrow record batches
//! are converted into typed records.
//!
//! # Example
//!
//! ```no_run
//! use quality_source::{CsvSource, SourceConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SourceConfig::builder()
//!     .data_dir("datasets")
//!     .build()?;
//!
//! let source = CsvSource::new(config)?;
//! let snapshot = source.load_snapshot().await?;
//! println!("Loaded {} rows", snapshot.total_rows());
//! # Ok(())
//! # }
//! ```
//!
//! [`Snapshot`]: quality_core::Snapshot

use thiserror::Error;

mod config;
mod converter;
mod loader;

pub use config::{SourceConfig, SourceConfigBuilder, default_location};
pub use converter::{arrow_value_to_value, batches_to_table};
pub use loader::{CsvSource, load_snapshot};

/// Error types specific to reading source extracts.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Invalid source configuration
    #[error("Invalid source configuration: {0}")]
    ConfigurationError(String),

    /// DataFusion failed to register or scan a file
    #[error("Failed to read source data: {0}")]
    DataReadError(#[from] datafusion::error::DataFusionError),

    /// An Arrow column could not be converted
    #[error("Failed to convert Arrow value: {0}")]
    TypeConversionError(String),
}
