//! Set-level quality checks.
//!
//! These checks need the whole table (or a second table) at once:
//! - UniqueKey: one record per key, the most recent one surviving
//! - EndDateInference: end dates derived from the next start date per key
//! - Referential: values must exist in another table

use crate::dates::date_like;
use crate::window::{SortOrder, lead, partition_by, row_number, sort_by_column, sort_rows};
use chrono::NaiveDate;
use quality_core::{Finding, RuleContext, RuleError, SetCheck, Table, Value};
use std::collections::BTreeSet;

fn record_at(table: &Table, row: usize) -> Result<&quality_core::Record, RuleError> {
    table
        .get_row(row)
        .ok_or_else(|| RuleError::Failed(format!("row {} out of range", row)))
}

/// Flags every record of a duplicate key group except its survivor.
///
/// The survivor is the record with the greatest `order_by` value. Ties, and
/// groups without an ordering column, keep the first record in table order.
#[derive(Debug, Clone)]
pub struct UniqueKeyCheck {
    key: Vec<String>,
    order_by: Option<String>,
    reject_null_keys: bool,
}

impl UniqueKeyCheck {
    /// Creates a new unique key check.
    pub fn new(key: Vec<String>, order_by: Option<String>, reject_null_keys: bool) -> Self {
        Self {
            key,
            order_by,
            reject_null_keys,
        }
    }

    fn describe_key(&self) -> String {
        self.key.join(", ")
    }
}

impl SetCheck for UniqueKeyCheck {
    fn check(&self, table: &Table, _context: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let partitions = partition_by(table, &self.key)?;
        let mut findings = Vec::new();

        if self.reject_null_keys {
            for &row in &partitions.null_keys {
                findings.push(
                    Finding::new(format!("Null value in key ({})", self.describe_key()))
                        .at_row(row)
                        .expected("non-null key")
                        .actual("NULL"),
                );
            }
        }

        for (key, rows) in partitions.duplicates() {
            let ranked = match &self.order_by {
                Some(column) => sort_by_column(table, rows, column, SortOrder::Descending)?,
                None => rows.clone(),
            };
            let survivor = ranked[0];

            for (row, rank) in row_number(&ranked).filter(|&(_, rank)| rank > 1) {
                findings.push(
                    Finding::new(format!(
                        "Duplicate key ({}) = ({}); row {} survives",
                        self.describe_key(),
                        key.join(", "),
                        survivor
                    ))
                    .at_row(row)
                    .expected("1 record per key")
                    .actual(format!("{} records", ranked.len()))
                    .repair("rank", rank as i64)
                    .repair("survivor_row", survivor as i64),
                );
            }
        }

        Ok(findings)
    }
}

/// Infers end dates from the next start date within each key group.
///
/// Returns `(row, inferred_end)` pairs in row order. The last record of
/// every group has no successor and an open (`None`) end. Records with a
/// null key are treated as one group of their own.
pub fn infer_end_dates(
    table: &Table,
    key: &str,
    start: &str,
) -> Result<Vec<(usize, Option<NaiveDate>)>, RuleError> {
    let partitions = partition_by(table, &[key.to_string()])?;
    let mut inferred = Vec::with_capacity(table.len());

    let groups = partitions
        .groups
        .values()
        .chain(std::iter::once(&partitions.null_keys))
        .filter(|rows| !rows.is_empty());

    for rows in groups {
        let ordered = sort_rows(rows, SortOrder::Ascending, |row| {
            date_like(record_at(table, row)?, start)
        })?;

        for (row, next) in lead(&ordered) {
            let end = match next {
                Some(next) => date_like(record_at(table, next)?, start)?.and_then(|d| d.pred_opt()),
                None => None,
            };
            inferred.push((row, end));
        }
    }

    inferred.sort_by_key(|&(row, _)| row);
    Ok(inferred)
}

/// Flags stored end dates that disagree with the inferred ones, or that
/// precede their own start date.
#[derive(Debug, Clone)]
pub struct EndDateInferenceCheck {
    key: String,
    start: String,
    end: String,
}

impl EndDateInferenceCheck {
    /// Creates a new end date inference check.
    pub fn new(key: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            start: start.into(),
            end: end.into(),
        }
    }
}

impl SetCheck for EndDateInferenceCheck {
    fn check(&self, table: &Table, _context: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let mut findings = Vec::new();

        for (row, inferred) in infer_end_dates(table, &self.key, &self.start)? {
            let record = record_at(table, row)?;
            let start = date_like(record, &self.start)?;
            let stored = date_like(record, &self.end)?;

            let mut problems = Vec::new();
            if stored != inferred {
                problems.push(format!(
                    "'{}' differs from the day before the next '{}'",
                    self.end, self.start
                ));
            }
            if let (Some(start), Some(end)) = (start, stored) {
                if end < start {
                    problems.push(format!("'{}' is before '{}'", self.end, self.start));
                }
            }

            if problems.is_empty() {
                continue;
            }

            findings.push(
                Finding::new(problems.join("; "))
                    .at_row(row)
                    .expected(inferred.map_or_else(|| "open".to_string(), |d| d.to_string()))
                    .actual(Value::from(stored))
                    .repair("inferred_end", inferred),
            );
        }

        Ok(findings)
    }
}

/// Flags values missing from a column of another table.
///
/// Values are compared as rendered text. Nulls pass.
#[derive(Debug, Clone)]
pub struct ReferentialCheck {
    column: String,
    ref_table: String,
    ref_column: String,
}

impl ReferentialCheck {
    /// Creates a new referential check.
    pub fn new(
        column: impl Into<String>,
        ref_table: impl Into<String>,
        ref_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            ref_table: ref_table.into(),
            ref_column: ref_column.into(),
        }
    }

    /// Returns the referenced table.
    pub fn ref_table(&self) -> &str {
        &self.ref_table
    }
}

impl SetCheck for ReferentialCheck {
    fn check(&self, table: &Table, context: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        let reference = context.snapshot.table(&self.ref_table).ok_or_else(|| {
            RuleError::Failed(format!("referenced table '{}' not loaded", self.ref_table))
        })?;

        let known = reference
            .rows()
            .iter()
            .map(|record| record.text(&self.ref_column))
            .filter_map(Result::transpose)
            .collect::<Result<BTreeSet<_>, _>>()?;

        let mut findings = Vec::new();
        for (row, record) in table.rows().iter().enumerate() {
            let Some(value) = record.text(&self.column)? else {
                continue;
            };
            if !known.contains(&value) {
                findings.push(
                    Finding::new(format!(
                        "'{}' has no match in {}.{}",
                        self.column, self.ref_table, self.ref_column
                    ))
                    .at_row(row)
                    .expected(format!("value present in {}.{}", self.ref_table, self.ref_column))
                    .actual(value),
                );
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quality_core::{Layer, Snapshot, TableBuilder};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn run(check: &dyn SetCheck, table: &Table, snapshot: &Snapshot) -> Vec<Finding> {
        let context = RuleContext::new(date(2024, 1, 1), snapshot);
        check.check(table, &context).unwrap()
    }

    fn customers() -> Table {
        TableBuilder::new("crm_cust_info")
            .columns(["cst_id", "cst_create_date"])
            .row([Value::Int(1), Value::from("2025-01-01")])
            .row([Value::Int(1), Value::from("2026-01-01")])
            .row([Value::Int(2), Value::from("2025-01-01")])
            .row([Value::Int(1), Value::from("2026-01-01")])
            .row([Value::Null, Value::from("2025-01-01")])
            .build()
    }

    #[test]
    fn test_duplicates_report_all_but_latest() {
        let check = UniqueKeyCheck::new(
            vec!["cst_id".to_string()],
            Some("cst_create_date".to_string()),
            false,
        );
        let table = customers();
        let findings = run(&check, &table, &Snapshot::new(Layer::Bronze));

        let rows: Vec<_> = findings.iter().map(|f| f.row).collect();
        assert_eq!(rows, vec![Some(3), Some(0)]);
        assert_eq!(findings[0].repairs["survivor_row"], Value::Int(1));
        assert_eq!(findings[0].repairs["rank"], Value::Int(2));
        assert_eq!(findings[1].repairs["rank"], Value::Int(3));
    }

    #[test]
    fn test_null_keys_reported_when_rejected() {
        let check = UniqueKeyCheck::new(vec!["cst_id".to_string()], None, true);
        let table = customers();
        let findings = run(&check, &table, &Snapshot::new(Layer::Bronze));

        assert_eq!(findings[0].row, Some(4));
        assert_eq!(findings[0].actual.as_deref(), Some("NULL"));
        // without an ordering column the first physical record survives
        let duplicates: Vec<_> = findings[1..].iter().map(|f| f.row).collect();
        assert_eq!(duplicates, vec![Some(1), Some(3)]);
    }

    fn products() -> Table {
        TableBuilder::new("crm_prd_info")
            .columns(["prd_key", "prd_start_dt", "prd_end_dt"])
            .row([
                Value::from("AC-HE-HL-U509"),
                Value::from("2021-06-01"),
                Value::Null,
            ])
            .row([
                Value::from("AC-HE-HL-U509"),
                Value::from("2021-01-01"),
                Value::from("2021-05-31"),
            ])
            .row([
                Value::from("BK-R93R-62"),
                Value::from("2021-03-01"),
                Value::from("2020-12-31"),
            ])
            .build()
    }

    #[test]
    fn test_infer_end_dates() {
        let inferred = infer_end_dates(&products(), "prd_key", "prd_start_dt").unwrap();
        assert_eq!(
            inferred,
            vec![(0, None), (1, Some(date(2021, 5, 31))), (2, None)]
        );
    }

    #[test]
    fn test_end_date_findings() {
        let check = EndDateInferenceCheck::new("prd_key", "prd_start_dt", "prd_end_dt");
        let table = products();
        let findings = run(&check, &table, &Snapshot::new(Layer::Bronze));

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.row, Some(2));
        assert_eq!(finding.expected.as_deref(), Some("open"));
        assert_eq!(finding.actual.as_deref(), Some("2020-12-31"));
        assert!(finding.message.contains("is before"));
        assert_eq!(finding.repairs["inferred_end"], Value::Null);
    }

    #[test]
    fn test_referential() {
        let customers = customers();
        let sales = TableBuilder::new("crm_sales_details")
            .columns(["sls_cust_id"])
            .row([Value::from("1")])
            .row([Value::Int(99)])
            .row([Value::Null])
            .build();
        let snapshot = Snapshot::new(Layer::Bronze).with_table(customers);

        let check = ReferentialCheck::new("sls_cust_id", "crm_cust_info", "cst_id");
        let findings = run(&check, &sales, &snapshot);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].row, Some(1));
        assert_eq!(findings[0].actual.as_deref(), Some("99"));
    }

    #[test]
    fn test_referential_without_reference_table() {
        let sales = TableBuilder::new("crm_sales_details")
            .columns(["sls_cust_id"])
            .build();
        let snapshot = Snapshot::new(Layer::Bronze);
        let check = ReferentialCheck::new("sls_cust_id", "crm_cust_info", "cst_id");
        let context = RuleContext::new(date(2024, 1, 1), &snapshot);
        assert!(matches!(
            check.check(&sales, &context),
            Err(RuleError::Failed(_))
        ));
    }
}
