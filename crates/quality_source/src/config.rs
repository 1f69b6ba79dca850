//! Configuration for reading source extracts.

use crate::SourceError;
use quality_core::{
    CRM_CUST_INFO, CRM_PRD_INFO, CRM_SALES_DETAILS, ERP_CUST_AZ12, ERP_LOC_A101, ERP_PX_CAT_G1V2,
    Layer, SOURCE_TABLES,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Default number of rows sampled to infer CSV column types.
pub const DEFAULT_INFER_ROWS: usize = 100_000;

/// Returns the default file of a known source table, relative to the data
/// directory.
pub fn default_location(table: &str) -> Option<&'static str> {
    match table {
        CRM_CUST_INFO => Some("source_crm/cust_info.csv"),
        CRM_PRD_INFO => Some("source_crm/prd_info.csv"),
        CRM_SALES_DETAILS => Some("source_crm/sales_details.csv"),
        ERP_CUST_AZ12 => Some("source_erp/CUST_AZ12.csv"),
        ERP_LOC_A101 => Some("source_erp/LOC_A101.csv"),
        ERP_PX_CAT_G1V2 => Some("source_erp/PX_CAT_G1V2.csv"),
        _ => None,
    }
}

/// Where and how to read the source tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory the table files are resolved against
    pub data_dir: PathBuf,

    /// Layer the files belong to
    pub layer: Layer,

    /// Per-table file overrides; relative paths resolve against `data_dir`
    pub overrides: BTreeMap<String, PathBuf>,

    /// Restrict loading to these tables
    pub only: Option<BTreeSet<String>>,

    /// Rows sampled to infer column types
    pub infer_schema_rows: usize,
}

impl SourceConfig {
    /// Creates a new builder for `SourceConfig`.
    pub fn builder() -> SourceConfigBuilder {
        SourceConfigBuilder::default()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(SourceError::ConfigurationError(
                "data_dir cannot be empty".to_string(),
            ));
        }

        if self.infer_schema_rows == 0 {
            return Err(SourceError::ConfigurationError(
                "infer_schema_rows must be positive".to_string(),
            ));
        }

        if let Some(table) = self.overrides.keys().find(|t| t.trim().is_empty()) {
            return Err(SourceError::ConfigurationError(format!(
                "override for an empty table name ('{}')",
                table
            )));
        }

        Ok(())
    }

    /// Returns the tables to load: the six source tables plus any table
    /// only known through an override, filtered by `only`.
    pub fn tables(&self) -> Vec<String> {
        let mut tables: BTreeSet<String> = SOURCE_TABLES.iter().map(|t| t.to_string()).collect();
        tables.extend(self.overrides.keys().cloned());

        tables
            .into_iter()
            .filter(|t| self.only.as_ref().is_none_or(|only| only.contains(t)))
            .collect()
    }

    /// Resolves the file of a table, if one is known.
    pub fn path_for(&self, table: &str) -> Option<PathBuf> {
        let relative = match self.overrides.get(table) {
            Some(path) => path.clone(),
            None => PathBuf::from(default_location(table)?),
        };

        Some(if relative.is_absolute() {
            relative
        } else {
            self.data_dir.join(relative)
        })
    }
}

/// Builder for `SourceConfig`.
#[derive(Debug, Clone, Default)]
pub struct SourceConfigBuilder {
    data_dir: Option<PathBuf>,
    layer: Layer,
    overrides: BTreeMap<String, PathBuf>,
    only: Option<BTreeSet<String>>,
    infer_schema_rows: Option<usize>,
}

impl SourceConfigBuilder {
    /// Sets the data directory.
    pub fn data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets the layer the files belong to.
    pub fn layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    /// Overrides the file of one table.
    pub fn table_path(mut self, table: impl Into<String>, path: impl AsRef<Path>) -> Self {
        self.overrides
            .insert(table.into(), path.as_ref().to_path_buf());
        self
    }

    /// Overrides the files of several tables at once.
    pub fn table_paths<I, K, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<String>,
        P: AsRef<Path>,
    {
        for (table, path) in paths {
            self = self.table_path(table, path);
        }
        self
    }

    /// Restricts loading to the given tables.
    pub fn only<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(tables.into_iter().map(Into::into).collect());
        self
    }

    /// Sets how many rows are sampled to infer column types.
    pub fn infer_schema_rows(mut self, rows: usize) -> Self {
        self.infer_schema_rows = Some(rows);
        self
    }

    /// Builds the `SourceConfig`.
    ///
    /// Returns an error if the data directory is missing or the
    /// configuration is invalid.
    pub fn build(self) -> Result<SourceConfig, SourceError> {
        let config = SourceConfig {
            data_dir: self.data_dir.ok_or_else(|| {
                SourceError::ConfigurationError("data_dir is required".to_string())
            })?,
            layer: self.layer,
            overrides: self.overrides,
            only: self.only,
            infer_schema_rows: self.infer_schema_rows.unwrap_or(DEFAULT_INFER_ROWS),
        };

        config.validate()?;
        Ok(config)
    }
}
