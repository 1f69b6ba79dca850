//! Loading source tables through DataFusion.

use crate::{SourceConfig, SourceError, converter::batches_to_table};
use datafusion::prelude::{CsvReadOptions, SessionConfig, SessionContext};
use quality_core::{Snapshot, Table};
use std::path::Path;
use tracing::{debug, info, warn};

/// Reader for the CSV extracts of one warehouse layer.
///
/// Every table file is registered with a DataFusion `SessionContext` and
/// scanned in full. Column names are lowercased, since the ERP extracts
/// ship upper-case headers (`CID`, `BDATE`, `GEN`).
///
/// Scans run on a single partition: row indices must follow file order,
/// and a split scan returns batches in completion order.
pub struct CsvSource {
    config: SourceConfig,
    ctx: SessionContext,
}

impl CsvSource {
    /// Creates a new source reader with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        info!(
            "Initializing {} source reader at {}",
            config.layer,
            config.data_dir.display()
        );

        config.validate()?;

        Ok(Self {
            config,
            ctx: SessionContext::new_with_config(session_config()),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Loads a single table.
    ///
    /// Returns `Ok(None)` when the table has no known file or its file does
    /// not exist; the rule engine reports tables it needs but cannot find.
    ///
    /// # Errors
    ///
    /// Returns an error if DataFusion cannot read the file or a value cannot
    /// be converted.
    pub async fn load_table(&self, name: &str) -> Result<Option<Table>, SourceError> {
        let Some(path) = self.config.path_for(name) else {
            warn!("No source file known for table '{}'", name);
            return Ok(None);
        };

        if !path.is_file() {
            warn!("Skipping table '{}': {} not found", name, path.display());
            return Ok(None);
        }

        info!("Loading table '{}' from {}", name, path.display());
        let table = self.read_csv(name, &path).await?;
        debug!(
            "Loaded {} rows and {} columns for '{}'",
            table.len(),
            table.columns().len(),
            name
        );

        Ok(Some(table))
    }

    /// Loads every configured table into a snapshot.
    ///
    /// # Errors
    ///
    /// Returns the first read or conversion error.
    pub async fn load_snapshot(&self) -> Result<Snapshot, SourceError> {
        let mut snapshot = Snapshot::new(self.config.layer);

        for name in self.config.tables() {
            if let Some(table) = self.load_table(&name).await? {
                snapshot.insert(table);
            }
        }

        info!(
            "Loaded {} tables with {} rows",
            snapshot.table_names().count(),
            snapshot.total_rows()
        );
        Ok(snapshot)
    }

    async fn read_csv(&self, name: &str, path: &Path) -> Result<Table, SourceError> {
        let location = path.to_str().ok_or_else(|| {
            SourceError::ConfigurationError(format!(
                "path for '{}' is not valid UTF-8: {}",
                name,
                path.display()
            ))
        })?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let options = CsvReadOptions::new()
            .has_header(true)
            .file_extension(&extension)
            .schema_infer_max_records(self.config.infer_schema_rows);

        self.ctx.deregister_table(name)?;
        self.ctx.register_csv(name, location, options).await?;

        let frame = self.ctx.table(name).await?;
        let columns = frame
            .schema()
            .fields()
            .iter()
            .map(|field| field.name().trim().to_lowercase())
            .collect();
        let batches = frame.collect().await?;

        batches_to_table(name, columns, &batches)
    }
}

fn session_config() -> SessionConfig {
    SessionConfig::new()
        .with_target_partitions(1)
        .with_repartition_file_scans(false)
}

/// Loads a snapshot with a one-off reader.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or a file cannot be
/// read.
pub async fn load_snapshot(config: SourceConfig) -> Result<Snapshot, SourceError> {
    CsvSource::new(config)?.load_snapshot().await
}
