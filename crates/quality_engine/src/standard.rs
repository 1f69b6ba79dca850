//! The standard rule catalog.
//!
//! One rule per diagnostic the warehouse team runs between the bronze and
//! silver loads: duplicate keys, stray whitespace, malformed or impossible
//! dates, sales arithmetic and dangling customer references.

use crate::RuleEngine;
use chrono::NaiveDate;
use quality_core::{
    CRM_CUST_INFO, CRM_PRD_INFO, CRM_SALES_DETAILS, CheckSpec, ERP_CUST_AZ12, ERP_PX_CAT_G1V2,
    Result, RuleDefinition,
};

/// Oldest plausible customer birthdate.
pub const BIRTHDATE_FLOOR: NaiveDate = match NaiveDate::from_ymd_opt(1924, 1, 1) {
    Some(date) => date,
    None => NaiveDate::MIN,
};

/// Latest plausible sales due date.
pub const DUE_DATE_CEILING: NaiveDate = match NaiveDate::from_ymd_opt(2050, 1, 1) {
    Some(date) => date,
    None => NaiveDate::MAX,
};

const SALES_KEYS: [&str; 2] = ["sls_ord_num", "sls_prd_key"];

fn rule(
    name: &str,
    table: &str,
    keys: &[&str],
    description: &str,
    check: CheckSpec,
) -> RuleDefinition {
    RuleDefinition {
        name: name.to_string(),
        table: table.to_string(),
        description: Some(description.to_string()),
        keys: Some(keys.iter().map(|k| k.to_string()).collect()),
        check,
    }
}

fn trimmed(name: &str, table: &str, keys: &[&str], column: &str) -> RuleDefinition {
    rule(
        name,
        table,
        keys,
        &format!("'{}' has no leading or trailing spaces", column),
        CheckSpec::Trimmed {
            column: column.to_string(),
        },
    )
}

fn int_date(name: &str, column: &str, max: Option<NaiveDate>) -> RuleDefinition {
    rule(
        name,
        CRM_SALES_DETAILS,
        &SALES_KEYS,
        &format!("'{}' is a valid YYYYMMDD date", column),
        CheckSpec::IntDate {
            column: column.to_string(),
            min: None,
            max,
        },
    )
}

fn date_order(name: &str, earlier: &str, later: &str) -> RuleDefinition {
    rule(
        name,
        CRM_SALES_DETAILS,
        &SALES_KEYS,
        &format!("'{}' is not after '{}'", earlier, later),
        CheckSpec::DateOrder {
            earlier: earlier.to_string(),
            later: later.to_string(),
        },
    )
}

/// Returns the standard catalog as rule definitions, in catalog order.
pub fn standard_catalog() -> Vec<RuleDefinition> {
    vec![
        rule(
            "cst_id_unique",
            CRM_CUST_INFO,
            &["cst_id"],
            "One record per customer id; the latest created survives",
            CheckSpec::UniqueKey {
                key: vec!["cst_id".to_string()],
                order_by: Some("cst_create_date".to_string()),
                reject_null_keys: true,
            },
        ),
        trimmed("cst_key_whitespace", CRM_CUST_INFO, &["cst_id"], "cst_key"),
        trimmed(
            "cst_firstname_whitespace",
            CRM_CUST_INFO,
            &["cst_id"],
            "cst_firstname",
        ),
        trimmed(
            "cst_lastname_whitespace",
            CRM_CUST_INFO,
            &["cst_id"],
            "cst_lastname",
        ),
        rule(
            "prd_id_unique",
            CRM_PRD_INFO,
            &["prd_id"],
            "One record per product id",
            CheckSpec::UniqueKey {
                key: vec!["prd_id".to_string()],
                order_by: None,
                reject_null_keys: true,
            },
        ),
        trimmed("prd_nm_whitespace", CRM_PRD_INFO, &["prd_id"], "prd_nm"),
        rule(
            "prd_cost_non_negative",
            CRM_PRD_INFO,
            &["prd_id"],
            "Product cost is present and not negative",
            CheckSpec::NonNegative {
                column: "prd_cost".to_string(),
            },
        ),
        rule(
            "prd_end_dt_inference",
            CRM_PRD_INFO,
            &["prd_id", "prd_key"],
            "End date is the day before the next start date of the same product",
            CheckSpec::EndDateInference {
                key: "prd_key".to_string(),
                start: "prd_start_dt".to_string(),
                end: "prd_end_dt".to_string(),
            },
        ),
        int_date("sls_order_dt_valid", "sls_order_dt", None),
        int_date("sls_ship_dt_valid", "sls_ship_dt", None),
        int_date("sls_due_dt_valid", "sls_due_dt", Some(DUE_DATE_CEILING)),
        date_order("sls_order_before_ship", "sls_order_dt", "sls_ship_dt"),
        date_order("sls_order_before_due", "sls_order_dt", "sls_due_dt"),
        rule(
            "sls_sales_consistency",
            CRM_SALES_DETAILS,
            &SALES_KEYS,
            "Sales equal quantity times absolute price",
            CheckSpec::SalesConsistency {
                sales: "sls_sales".to_string(),
                quantity: "sls_quantity".to_string(),
                price: "sls_price".to_string(),
            },
        ),
        rule(
            "sls_cust_id_reference",
            CRM_SALES_DETAILS,
            &SALES_KEYS,
            "Every sales line references a known customer",
            CheckSpec::Referential {
                column: "sls_cust_id".to_string(),
                ref_table: CRM_CUST_INFO.to_string(),
                ref_column: "cst_id".to_string(),
            },
        ),
        rule(
            "bdate_range",
            ERP_CUST_AZ12,
            &["cid"],
            "Birthdate is between 1924-01-01 and the as-of date",
            CheckSpec::DateWithin {
                column: "bdate".to_string(),
                min: Some(BIRTHDATE_FLOOR),
                max: None,
                required: false,
            },
        ),
        trimmed("cat_whitespace", ERP_PX_CAT_G1V2, &["id"], "cat"),
        trimmed("subcat_whitespace", ERP_PX_CAT_G1V2, &["id"], "subcat"),
        trimmed(
            "maintenance_whitespace",
            ERP_PX_CAT_G1V2,
            &["id"],
            "maintenance",
        ),
    ]
}

impl RuleEngine {
    /// Creates an engine preloaded with the standard catalog.
    pub fn standard() -> Result<Self> {
        let mut engine = RuleEngine::new();
        for definition in &standard_catalog() {
            engine.register_rule(crate::compile_rule(definition)?)?;
        }
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_standard_catalog_compiles() {
        let engine = RuleEngine::standard().unwrap();
        assert_eq!(engine.len(), standard_catalog().len());
        assert_eq!(engine.rules()[0].name(), "cst_id_unique");
    }

    #[test]
    fn test_standard_tables() {
        let engine = RuleEngine::standard().unwrap();
        let tables: BTreeSet<_> = engine
            .rules()
            .iter()
            .flat_map(|r| r.required_tables())
            .collect();

        assert_eq!(
            tables,
            BTreeSet::from([
                CRM_CUST_INFO,
                CRM_PRD_INFO,
                CRM_SALES_DETAILS,
                ERP_CUST_AZ12,
                ERP_PX_CAT_G1V2
            ])
        );
    }

    #[test]
    fn test_every_standard_rule_is_described() {
        assert!(standard_catalog().iter().all(|r| r.description.is_some()));
    }
}
