use anyhow::{Context, Result};
use quality_engine::standard_catalog;

use crate::output;

pub fn execute(format: &str) -> Result<()> {
    let rules = standard_catalog();

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&rules)
                .context("Failed to serialize the standard catalog")?;
            println!("{}", json);
        }
        _ => {
            output::print_info(&format!("Standard catalog: {} rules", rules.len()));
            output::print_rule_definitions(&rules);
        }
    }

    Ok(())
}
