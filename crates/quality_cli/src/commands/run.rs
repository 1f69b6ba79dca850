use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use quality_core::{CatalogDefinition, Layer};
use quality_engine::RuleEngine;
use quality_parser::parse_file;
use quality_source::{CsvSource, SourceConfig};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::info;

use crate::output;

/// Options of the `run` command.
pub struct RunOptions {
    pub catalog: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub as_of: Option<NaiveDate>,
    pub layer: Option<Layer>,
    pub format: String,
    pub output: Option<PathBuf>,
    pub standard: bool,
}

pub async fn execute(options: RunOptions) -> Result<()> {
    let text = options.format != "json";

    let definition = match &options.catalog {
        Some(path) => {
            info!("Loading catalog: {}", path.display());
            let mut definition = parse_file(path)
                .with_context(|| format!("Failed to parse catalog file: {}", path.display()))?;
            definition.include_standard |= options.standard;
            Some(definition)
        }
        None => None,
    };

    let engine = match &definition {
        Some(definition) => RuleEngine::from_definition(definition)
            .with_context(|| format!("Failed to compile catalog '{}'", definition.name))?,
        None => RuleEngine::standard().context("Failed to build the standard catalog")?,
    };

    if text {
        output::print_info(&format!(
            "Catalog loaded: {} ({} rules)",
            definition
                .as_ref()
                .map_or("standard", |definition| definition.name.as_str()),
            engine.len()
        ));
    }

    let layer = options
        .layer
        .or(definition.as_ref().map(|definition| definition.layer))
        .unwrap_or_default();
    let as_of = options
        .as_of
        .or(definition.as_ref().and_then(|definition| definition.as_of))
        .unwrap_or_else(|| Local::now().date_naive());
    info!("Layer: {}, as of {}", layer, as_of);

    let config = source_config(&options, definition.as_ref(), &engine, layer)?;
    let source = CsvSource::new(config).context("Invalid source configuration")?;
    let snapshot = source.load_snapshot().await.with_context(|| {
        format!(
            "Failed to read source data from {}",
            options.data_dir.display()
        )
    })?;

    if text {
        output::print_info(&format!(
            "Loaded {} tables ({} rows) from {}",
            snapshot.table_names().count(),
            snapshot.total_rows(),
            options.data_dir.display()
        ));
    }

    let report = engine
        .run(&snapshot, as_of)
        .context("Rule run aborted")?;

    output::write_rule_report(&report, &options.format, options.output.as_deref())?;

    if let Some(path) = &options.output
        && text
    {
        output::print_success(&format!("Report written to {}", path.display()));
    }

    if !report.passed() {
        std::process::exit(1);
    }

    Ok(())
}

/// Builds the source configuration, loading only the tables the rules read.
fn source_config(
    options: &RunOptions,
    definition: Option<&CatalogDefinition>,
    engine: &RuleEngine,
    layer: Layer,
) -> Result<SourceConfig> {
    let required: BTreeSet<&str> = engine
        .rules()
        .iter()
        .flat_map(|rule| rule.required_tables())
        .collect();

    let mut builder = SourceConfig::builder()
        .data_dir(&options.data_dir)
        .layer(layer)
        .only(required);

    if let Some(definition) = definition {
        builder = builder.table_paths(&definition.sources);
    }

    builder.build().context("Invalid source configuration")
}
