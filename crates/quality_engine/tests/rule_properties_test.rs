//! Behavioural properties of the built-in rules, checked through the engine.

use chrono::{Days, NaiveDate};
use quality_core::{
    CRM_CUST_INFO, CRM_PRD_INFO, CheckSpec, Layer, Rule, Snapshot, TableBuilder, Value,
};
use quality_engine::{
    DateWithinCheck, RuleEngine, TrimmedCheck, UniqueKeyCheck, compile_rule, infer_end_dates,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_duplicate_groups_report_n_minus_one() {
    for n in 2..=6_i64 {
        let mut builder = TableBuilder::new(CRM_CUST_INFO).columns(["cst_id", "cst_create_date"]);
        for i in 0..n {
            // one group of size n, plus a singleton per iteration
            builder = builder
                .row([Value::Int(1), Value::Int(i % 3)])
                .row([Value::Int(100 + i), Value::Int(0)]);
        }
        let snapshot = Snapshot::new(Layer::Silver).with_table(builder.build());

        let mut engine = RuleEngine::new();
        engine
            .register_rule(Rule::set(
                "cst_id_unique",
                CRM_CUST_INFO,
                UniqueKeyCheck::new(
                    vec!["cst_id".to_string()],
                    Some("cst_create_date".to_string()),
                    true,
                ),
            ))
            .unwrap();

        let report = engine.run(&snapshot, date(2024, 1, 1)).unwrap();
        assert_eq!(report.violations.len() as i64, n - 1, "group of {}", n);

        // the survivor holds the maximum ordering value, earliest row on ties
        let max = (0..n).map(|i| i % 3).max().unwrap();
        let survivor_row = (0..n).position(|i| i % 3 == max).unwrap() * 2;
        assert!(report.violations.iter().all(|v| v.row != Some(survivor_row)));
    }
}

#[test]
fn test_whitespace_property() {
    let values = [
        ("Jon", false),
        ("Jon Yang", false),
        ("", false),
        (" Jon", true),
        ("Jon ", true),
        ("\tJon", true),
        ("Jon\n", true),
    ];

    let mut builder = TableBuilder::new(CRM_CUST_INFO).columns(["cst_firstname"]);
    for (value, _) in values {
        builder = builder.row([Value::from(value)]);
    }
    let snapshot = Snapshot::new(Layer::Bronze).with_table(builder.build());

    let mut engine = RuleEngine::new();
    engine
        .register_rule(Rule::row(
            "cst_firstname_whitespace",
            CRM_CUST_INFO,
            TrimmedCheck::new("cst_firstname"),
        ))
        .unwrap();
    let report = engine.run(&snapshot, date(2024, 1, 1)).unwrap();

    let flagged: Vec<_> = report.violations.iter().filter_map(|v| v.row).collect();
    let expected: Vec<_> = values
        .iter()
        .enumerate()
        .filter(|(_, (_, violates))| *violates)
        .map(|(row, _)| row)
        .collect();
    assert_eq!(flagged, expected);
}

#[test]
fn test_end_date_inference_example() {
    let table = TableBuilder::new(CRM_PRD_INFO)
        .columns(["prd_key", "prd_start_dt", "prd_end_dt"])
        .row([Value::from("K"), Value::from("2021-01-01"), Value::Null])
        .row([Value::from("K"), Value::from("2021-06-01"), Value::Null])
        .build();

    let inferred = infer_end_dates(&table, "prd_key", "prd_start_dt").unwrap();
    assert_eq!(inferred, vec![(0, Some(date(2021, 5, 31))), (1, None)]);

    let rule = compile_rule(&quality_core::RuleDefinition {
        name: "prd_end_dt_inference".to_string(),
        table: CRM_PRD_INFO.to_string(),
        description: None,
        keys: None,
        check: CheckSpec::EndDateInference {
            key: "prd_key".to_string(),
            start: "prd_start_dt".to_string(),
            end: "prd_end_dt".to_string(),
        },
    })
    .unwrap();
    let mut engine = RuleEngine::new();
    engine.register_rule(rule).unwrap();

    let report = engine
        .run(
            &Snapshot::new(Layer::Silver).with_table(table),
            date(2024, 1, 1),
        )
        .unwrap();

    // only the first record's end date disagrees with its inferred value
    assert_eq!(report.violations.len(), 1);
    assert_eq!(report.violations[0].row, Some(0));
    assert_eq!(
        report.violations[0].repair("inferred_end"),
        Some(&Value::Date(date(2021, 5, 31)))
    );
}

#[test]
fn test_birthdate_bounds_follow_as_of() {
    let as_of = date(2024, 6, 30);
    let day_after = as_of.checked_add_days(Days::new(1)).unwrap();

    let table = TableBuilder::new("erp_cust_az12")
        .columns(["cid", "bdate"])
        .row([Value::from("A"), Value::Date(date(1900, 1, 1))])
        .row([Value::from("B"), Value::Date(day_after)])
        .row([Value::from("C"), Value::Date(date(1950, 1, 1))])
        .row([Value::from("D"), Value::Date(as_of)])
        .build();
    let snapshot = Snapshot::new(Layer::Bronze).with_table(table);

    let mut engine = RuleEngine::new();
    engine
        .register_rule(
            Rule::row(
                "bdate_range",
                "erp_cust_az12",
                DateWithinCheck::new("bdate", Some(date(1924, 1, 1)), None, false),
            )
            .keys(["cid"]),
        )
        .unwrap();

    let report = engine.run(&snapshot, as_of).unwrap();
    let flagged: Vec<_> = report.violations.iter().map(|v| v.keys["cid"].as_str()).collect();
    assert_eq!(flagged, vec!["A", "B"]);

    // a later as-of date accepts the same birthdate
    let later = engine.run(&snapshot, day_after).unwrap();
    assert_eq!(later.violations.len(), 1);
}
