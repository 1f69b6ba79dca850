use anyhow::{Context, Result};
use quality_engine::RuleEngine;
use quality_parser::parse_file;
use std::path::Path;
use tracing::info;

use crate::output;

pub fn execute(catalog_path: &Path) -> Result<()> {
    info!("Checking catalog: {}", catalog_path.display());

    let catalog = parse_file(catalog_path)
        .with_context(|| format!("Failed to parse catalog file: {}", catalog_path.display()))?;

    // Compiling validates columns, bounds and patterns without touching data
    let engine = RuleEngine::from_definition(&catalog)
        .with_context(|| format!("Catalog '{}' does not compile", catalog.name))?;

    output::print_info(&format!(
        "Catalog loaded: {} (layer: {})",
        catalog.name, catalog.layer
    ));
    output::print_success("Catalog is valid");

    println!("\nCatalog Summary:");
    println!("  Name:        {}", catalog.name);
    println!(
        "  Description: {}",
        catalog.description.as_deref().unwrap_or("N/A")
    );
    println!("  Layer:       {}", catalog.layer);
    println!(
        "  As of:       {}",
        catalog
            .as_of
            .map_or_else(|| "today".to_string(), |date| date.to_string())
    );
    println!(
        "  Standard:    {}",
        if catalog.include_standard { "included" } else { "not included" }
    );
    println!("  Rules:       {}", engine.len());

    if !catalog.sources.is_empty() {
        println!("\nSources:");
        for (table, path) in &catalog.sources {
            println!("  {:<20} {}", table, path);
        }
    }

    if !catalog.rules.is_empty() {
        println!("\nDeclared Rules:");
        output::print_rule_definitions(&catalog.rules);
    }

    Ok(())
}
