//! Compilation of declarative rule definitions.
//!
//! Turns the [`RuleDefinition`]s of a parsed catalog into executable
//! [`Rule`]s, validating them up front so that a bad catalog fails before
//! any data is read.

use crate::{
    AllowedValuesCheck, DateOrderCheck, DateWithinCheck, EndDateInferenceCheck, IntDateCheck,
    NonNegativeCheck, PatternCheck, ReferentialCheck, RuleEngine, SalesConsistencyCheck,
    TrimmedCheck, UniqueKeyCheck, standard_catalog,
};
use quality_core::{CatalogDefinition, CheckSpec, EngineError, Result, Rule, RuleDefinition};
use tracing::info;

/// Compiles a single rule definition.
///
/// # Errors
///
/// Returns `EngineError::InvalidRule` for empty column names, an empty key
/// or value list, inverted date bounds, or a regex that does not compile.
pub fn compile_rule(definition: &RuleDefinition) -> Result<Rule> {
    let name = definition.name.as_str();
    let table = definition.table.as_str();

    if name.trim().is_empty() {
        return Err(EngineError::invalid_rule(name, "rule name is empty"));
    }
    if table.trim().is_empty() {
        return Err(EngineError::invalid_rule(name, "target table is empty"));
    }

    let invalid = |message: &str| EngineError::invalid_rule(name, message);
    let column = |value: &str, what: &str| -> Result<()> {
        if value.trim().is_empty() {
            Err(invalid(&format!("{} column is empty", what)))
        } else {
            Ok(())
        }
    };

    let rule = match &definition.check {
        CheckSpec::Trimmed { column: c } => {
            column(c, "checked")?;
            Rule::row(name, table, TrimmedCheck::new(c))
        }
        CheckSpec::DateWithin {
            column: c,
            min,
            max,
            required,
        } => {
            column(c, "date")?;
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    return Err(invalid(&format!("min {} is after max {}", min, max)));
                }
            }
            Rule::row(name, table, DateWithinCheck::new(c, *min, *max, *required))
        }
        CheckSpec::IntDate { column: c, min, max } => {
            column(c, "date")?;
            if let (Some(min), Some(max)) = (min, max) {
                if min > max {
                    return Err(invalid(&format!("min {} is after max {}", min, max)));
                }
            }
            Rule::row(name, table, IntDateCheck::new(c, *min, *max))
        }
        CheckSpec::DateOrder { earlier, later } => {
            column(earlier, "earlier")?;
            column(later, "later")?;
            Rule::row(name, table, DateOrderCheck::new(earlier, later))
        }
        CheckSpec::SalesConsistency {
            sales,
            quantity,
            price,
        } => {
            column(sales, "sales")?;
            column(quantity, "quantity")?;
            column(price, "price")?;
            Rule::row(
                name,
                table,
                SalesConsistencyCheck::new(sales, quantity, price),
            )
        }
        CheckSpec::NonNegative { column: c } => {
            column(c, "numeric")?;
            Rule::row(name, table, NonNegativeCheck::new(c))
        }
        CheckSpec::AllowedValues {
            column: c,
            values,
            required,
        } => {
            column(c, "checked")?;
            if values.is_empty() {
                return Err(invalid("allowed values list is empty"));
            }
            Rule::row(
                name,
                table,
                AllowedValuesCheck::new(c, values.clone(), *required),
            )
        }
        CheckSpec::Pattern { column: c, regex } => {
            column(c, "checked")?;
            let check = PatternCheck::new(c, regex)
                .map_err(|e| invalid(&format!("invalid regex '{}': {}", regex, e)))?;
            Rule::row(name, table, check)
        }
        CheckSpec::UniqueKey {
            key,
            order_by,
            reject_null_keys,
        } => {
            if key.is_empty() {
                return Err(invalid("key column list is empty"));
            }
            for k in key {
                column(k, "key")?;
            }
            if let Some(order_by) = order_by {
                column(order_by, "ordering")?;
            }
            Rule::set(
                name,
                table,
                UniqueKeyCheck::new(key.clone(), order_by.clone(), *reject_null_keys),
            )
        }
        CheckSpec::EndDateInference { key, start, end } => {
            column(key, "key")?;
            column(start, "start")?;
            column(end, "end")?;
            Rule::set(name, table, EndDateInferenceCheck::new(key, start, end))
        }
        CheckSpec::Referential {
            column: c,
            ref_table,
            ref_column,
        } => {
            column(c, "referencing")?;
            column(ref_column, "referenced")?;
            if ref_table.trim().is_empty() {
                return Err(invalid("referenced table is empty"));
            }
            Rule::set(
                name,
                table,
                ReferentialCheck::new(c, ref_table, ref_column),
            )
            .requires(ref_table)
        }
    };

    let rule = match &definition.keys {
        Some(keys) => rule.keys(keys.iter().cloned()),
        None => rule,
    };

    Ok(match &definition.description {
        Some(description) => rule.describe(description),
        None => rule,
    })
}

impl RuleEngine {
    /// Builds an engine from a parsed catalog.
    ///
    /// With `include_standard` set, the standard catalog comes first and
    /// the declared rules follow.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidRule` for a definition that does not
    /// compile, and `EngineError::DuplicateRule` for a repeated rule.
    pub fn from_definition(catalog: &CatalogDefinition) -> Result<Self> {
        let mut engine = RuleEngine::new();

        let standard = if catalog.include_standard {
            standard_catalog()
        } else {
            Vec::new()
        };

        for definition in standard.iter().chain(&catalog.rules) {
            engine.register_rule(compile_rule(definition)?)?;
        }

        info!(
            "Compiled catalog '{}' into {} rules",
            catalog.name,
            engine.len()
        );
        Ok(engine)
    }
}
