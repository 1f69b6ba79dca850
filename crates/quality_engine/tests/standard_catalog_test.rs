//! Integration tests for the standard catalog.
//!
//! These tests run the full standard catalog against a small but realistic
//! bronze snapshot of the six source tables.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use quality_core::{
    CRM_CUST_INFO, CRM_PRD_INFO, CRM_SALES_DETAILS, EngineError, ERP_CUST_AZ12, ERP_LOC_A101,
    ERP_PX_CAT_G1V2, Layer, Snapshot, Table, TableBuilder, Value,
};
use quality_engine::RuleEngine;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn as_of() -> NaiveDate {
    date(2024, 6, 30)
}

fn customers() -> Table {
    TableBuilder::new(CRM_CUST_INFO)
        .columns([
            "cst_id",
            "cst_key",
            "cst_firstname",
            "cst_lastname",
            "cst_marital_status",
            "cst_gndr",
            "cst_create_date",
        ])
        .row([
            Value::Int(11000),
            Value::from("AW00011000"),
            Value::from(" Jon"),
            Value::from("Yang "),
            Value::from("M"),
            Value::from("M"),
            Value::from("2025-10-06"),
        ])
        .row([
            Value::Int(11001),
            Value::from("AW00011001"),
            Value::from("Eugene"),
            Value::from("Huang"),
            Value::from("S"),
            Value::from("M"),
            Value::from("2025-10-06"),
        ])
        .row([
            Value::Int(29466),
            Value::from("AW00029466"),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null,
            Value::from("2026-01-25"),
        ])
        .row([
            Value::Int(29466),
            Value::from("AW00029466"),
            Value::from("Lance"),
            Value::from("Jimenez"),
            Value::from("M"),
            Value::Null,
            Value::from("2026-01-27"),
        ])
        .row([
            Value::Null,
            Value::from("SF566"),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null,
        ])
        .build()
}

fn products() -> Table {
    TableBuilder::new(CRM_PRD_INFO)
        .columns([
            "prd_id",
            "prd_key",
            "prd_nm",
            "prd_cost",
            "prd_line",
            "prd_start_dt",
            "prd_end_dt",
        ])
        .row([
            Value::Int(212),
            Value::from("AC-HE-HL-U509-R"),
            Value::from("Sport-100 Helmet- Red"),
            Value::Int(12),
            Value::from("S "),
            Value::from("2011-07-01"),
            Value::from("2007-12-28"),
        ])
        .row([
            Value::Int(213),
            Value::from("AC-HE-HL-U509-R"),
            Value::from("Sport-100 Helmet- Red"),
            Value::Int(14),
            Value::from("S "),
            Value::from("2012-07-01"),
            Value::from("2008-12-27"),
        ])
        .row([
            Value::Int(210),
            Value::from("CO-RF-FR-R92B-58"),
            Value::from("HL Road Frame - Black- 58"),
            Value::Null,
            Value::from("R "),
            Value::from("2003-07-01"),
            Value::Null,
        ])
        .build()
}

fn sales() -> Table {
    TableBuilder::new(CRM_SALES_DETAILS)
        .columns([
            "sls_ord_num",
            "sls_prd_key",
            "sls_cust_id",
            "sls_order_dt",
            "sls_ship_dt",
            "sls_due_dt",
            "sls_sales",
            "sls_quantity",
            "sls_price",
        ])
        .row([
            Value::from("SO43697"),
            Value::from("BK-R93R-62"),
            Value::Int(11000),
            Value::Int(20101229),
            Value::Int(20110105),
            Value::Int(20110110),
            Value::Int(3578),
            Value::Int(1),
            Value::Int(3578),
        ])
        .row([
            Value::from("SO43698"),
            Value::from("BK-M82S-44"),
            Value::Int(11001),
            Value::Int(0),
            Value::Int(20110105),
            Value::Int(20110110),
            Value::Int(15),
            Value::Int(2),
            Value::Int(10),
        ])
        .row([
            Value::from("SO43699"),
            Value::from("BK-M82S-44"),
            Value::Int(99999),
            Value::Int(20110120),
            Value::Int(20110105),
            Value::Int(20110110),
            Value::Int(20),
            Value::Int(2),
            Value::Int(0),
        ])
        .build()
}

fn birthdates() -> Table {
    TableBuilder::new(ERP_CUST_AZ12)
        .columns(["cid", "bdate", "gen"])
        .row([
            Value::from("NASAW00011000"),
            Value::from("1971-10-06"),
            Value::from("Male"),
        ])
        .row([
            Value::from("NASAW00011001"),
            Value::from("1900-01-01"),
            Value::from("M"),
        ])
        .row([
            Value::from("AW00011002"),
            Value::from("2024-07-01"),
            Value::Null,
        ])
        .build()
}

fn locations() -> Table {
    TableBuilder::new(ERP_LOC_A101)
        .columns(["cid", "cntry"])
        .row([Value::from("AW-00011000"), Value::from("Australia")])
        .build()
}

fn categories() -> Table {
    TableBuilder::new(ERP_PX_CAT_G1V2)
        .columns(["id", "cat", "subcat", "maintenance"])
        .row([
            Value::from("AC_BR"),
            Value::from("Accessories"),
            Value::from("Bike Racks"),
            Value::from("Yes"),
        ])
        .row([
            Value::from("AC_BS"),
            Value::from("Accessories "),
            Value::from("Bike Stands"),
            Value::from("No"),
        ])
        .build()
}

fn snapshot() -> Snapshot {
    Snapshot::new(Layer::Bronze)
        .with_table(customers())
        .with_table(products())
        .with_table(sales())
        .with_table(birthdates())
        .with_table(locations())
        .with_table(categories())
}

#[test]
fn test_run_is_deterministic() {
    let engine = RuleEngine::standard().unwrap();
    let snapshot = snapshot();

    let first = engine.run(&snapshot, as_of()).unwrap();
    let second = engine.run(&snapshot, as_of()).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_violations_follow_catalog_then_row_order() {
    let engine = RuleEngine::standard().unwrap();
    let report = engine.run(&snapshot(), as_of()).unwrap();

    let catalog: Vec<_> = engine.rules().iter().map(|r| r.name()).collect();
    let positions: Vec<_> = report
        .violations
        .iter()
        .map(|v| {
            (
                catalog.iter().position(|name| *name == v.rule).unwrap(),
                v.row,
            )
        })
        .collect();

    let mut sorted = positions.clone();
    sorted.sort();
    assert_eq!(positions, sorted);
    assert_eq!(report.rules.len(), engine.len());
}

#[test]
fn test_duplicate_customers() {
    let report = RuleEngine::standard()
        .unwrap()
        .run(&snapshot(), as_of())
        .unwrap();

    let violations: Vec<_> = report.for_rule("cst_id_unique").collect();
    assert_eq!(violations.len(), 2);

    // the older of the two 29466 records
    assert_eq!(violations[0].row, Some(2));
    assert_eq!(violations[0].keys["cst_id"], "29466");
    assert_eq!(violations[0].repair("survivor_row"), Some(&Value::Int(3)));
    // the null key row
    assert_eq!(violations[1].row, Some(4));
    assert_eq!(violations[1].actual.as_deref(), Some("NULL"));
}

#[test]
fn test_whitespace_rules() {
    let report = RuleEngine::standard()
        .unwrap()
        .run(&snapshot(), as_of())
        .unwrap();

    assert_eq!(report.for_rule("cst_key_whitespace").count(), 0);
    let first: Vec<_> = report.for_rule("cst_firstname_whitespace").collect();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].expected.as_deref(), Some("Jon"));
    assert_eq!(report.for_rule("cst_lastname_whitespace").count(), 1);
    assert_eq!(report.for_rule("cat_whitespace").count(), 1);
    assert_eq!(report.for_rule("prd_nm_whitespace").count(), 0);
}

#[test]
fn test_product_rules() {
    let report = RuleEngine::standard()
        .unwrap()
        .run(&snapshot(), as_of())
        .unwrap();

    let cost: Vec<_> = report.for_rule("prd_cost_non_negative").collect();
    assert_eq!(cost.len(), 1);
    assert_eq!(cost[0].keys["prd_id"], "210");

    let ends: Vec<_> = report.for_rule("prd_end_dt_inference").collect();
    assert_eq!(ends.len(), 2);
    assert_eq!(ends[0].expected.as_deref(), Some("2012-06-30"));
    assert_eq!(ends[1].expected.as_deref(), Some("open"));
}

#[test]
fn test_sales_rules() {
    let report = RuleEngine::standard()
        .unwrap()
        .run(&snapshot(), as_of())
        .unwrap();

    let order_dates: Vec<_> = report.for_rule("sls_order_dt_valid").collect();
    assert_eq!(order_dates.len(), 1);
    assert_eq!(order_dates[0].keys["sls_ord_num"], "SO43698");

    let ordering: Vec<_> = report.for_rule("sls_order_before_ship").collect();
    assert_eq!(ordering.len(), 1);
    assert_eq!(ordering[0].row, Some(2));

    let consistency: Vec<_> = report.for_rule("sls_sales_consistency").collect();
    assert_eq!(consistency.len(), 2);
    assert_eq!(consistency[0].repair("calc_sales"), Some(&Value::Int(20)));
    assert_eq!(consistency[1].repair("calc_price"), Some(&Value::Int(10)));

    let references: Vec<_> = report.for_rule("sls_cust_id_reference").collect();
    assert_eq!(references.len(), 1);
    assert_eq!(references[0].actual.as_deref(), Some("99999"));
}

#[test]
fn test_birthdate_rule() {
    let report = RuleEngine::standard()
        .unwrap()
        .run(&snapshot(), as_of())
        .unwrap();

    let rows: Vec<_> = report.for_rule("bdate_range").map(|v| v.row).collect();
    assert_eq!(rows, vec![Some(1), Some(2)]);
}

#[test]
fn test_missing_table_fails_the_run() {
    let snapshot = Snapshot::new(Layer::Bronze)
        .with_table(customers())
        .with_table(products())
        .with_table(sales())
        .with_table(birthdates());

    let result = RuleEngine::standard().unwrap().run(&snapshot, as_of());
    assert_eq!(
        result,
        Err(EngineError::missing_table(
            ERP_PX_CAT_G1V2,
            "cat_whitespace"
        ))
    );
}

#[test]
fn test_malformed_value_isolated_to_its_rule() {
    let mut birthdates = birthdates();
    birthdates.push(
        [
            ("cid", Value::from("AW00011003")),
            ("bdate", Value::from("06/10/1971")),
            ("gen", Value::from("Female")),
        ]
        .into_iter()
        .collect(),
    );

    let snapshot = Snapshot::new(Layer::Bronze)
        .with_table(customers())
        .with_table(products())
        .with_table(sales())
        .with_table(birthdates)
        .with_table(categories());

    let report = RuleEngine::standard()
        .unwrap()
        .run(&snapshot, as_of())
        .unwrap();

    let errors: Vec<_> = report.execution_errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].rule, "bdate_range");
    assert!(errors[0].message.contains("06/10/1971"));

    // the other rules still ran
    assert_eq!(report.for_rule("cst_id_unique").count(), 2);
    assert_eq!(report.for_rule("cat_whitespace").count(), 1);
}
