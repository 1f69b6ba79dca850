//! Main rule engine.
//!
//! This module provides the `RuleEngine` that holds the rule catalog and
//! runs it against a snapshot, turning check findings into an ordered,
//! deterministic report.

use chrono::NaiveDate;
use quality_core::{
    EngineError, Finding, Result, Rule, RuleContext, RuleError, RuleKind, RuleReport,
    RuleSummary, RunStats, Snapshot, Table, Violation, ViolationKind,
};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Rule engine for data warehouse quality checks.
///
/// Rules run in registration (catalog) order. A rule that fails to evaluate
/// is recorded as a `RuleExecutionError` violation and does not stop the
/// others.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use quality_core::{CRM_PRD_INFO, Layer, Rule, Snapshot, TableBuilder, Value};
/// use quality_engine::{NonNegativeCheck, RuleEngine};
///
/// let mut engine = RuleEngine::new();
/// let rule = Rule::row("prd_cost_non_negative", CRM_PRD_INFO, NonNegativeCheck::new("prd_cost"));
/// engine.register_rule(rule).unwrap();
///
/// let products = TableBuilder::new(CRM_PRD_INFO)
///     .columns(["prd_id", "prd_cost"])
///     .row([Value::Int(210), Value::Int(-5)])
///     .build();
/// let snapshot = Snapshot::new(Layer::Bronze).with_table(products);
///
/// let report = engine
///     .run(&snapshot, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
///     .unwrap();
/// assert_eq!(report.violations.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    /// Creates an engine with an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::DuplicateRule` if a rule with the same name
    /// already targets the same table.
    pub fn register_rule(&mut self, rule: Rule) -> Result<()> {
        if self
            .rules
            .iter()
            .any(|r| r.name() == rule.name() && r.table() == rule.table())
        {
            return Err(EngineError::duplicate_rule(rule.name(), rule.table()));
        }

        debug!(
            "Registered {} rule '{}' on {}",
            rule.kind().label(),
            rule.name(),
            rule.table()
        );
        self.rules.push(rule);
        Ok(())
    }

    /// Returns the registered rules in catalog order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns the number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rule is registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Runs every registered rule against a snapshot.
    ///
    /// `as_of` stands in for the current date in time-dependent rules, so
    /// the same snapshot and `as_of` always produce the same report.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::MissingTable` if a table required by any rule
    /// is absent. No rule runs in that case.
    pub fn run(&self, snapshot: &Snapshot, as_of: NaiveDate) -> Result<RuleReport> {
        self.check_tables(snapshot)?;

        info!(
            "Running {} rules against the {} snapshot as of {}",
            self.rules.len(),
            snapshot.layer(),
            as_of
        );
        let start = Instant::now();
        let context = RuleContext::new(as_of, snapshot);

        let mut violations = Vec::new();
        let mut summaries = Vec::with_capacity(self.rules.len());
        let mut stats = RunStats {
            rules_evaluated: self.rules.len(),
            ..Default::default()
        };

        let mut scanned = BTreeSet::new();

        for rule in &self.rules {
            let table = snapshot
                .table(rule.table())
                .ok_or_else(|| EngineError::missing_table(rule.table(), rule.name()))?;
            if scanned.insert(rule.table()) {
                stats.records_scanned += table.len();
            }

            let (found, failed) = match evaluate(rule, table, &context) {
                Ok(findings) => {
                    debug!("Rule '{}' produced {} violations", rule.name(), findings.len());
                    let found = findings.len();
                    violations.extend(
                        findings
                            .into_iter()
                            .map(|finding| to_violation(rule, table, finding)),
                    );
                    (found, false)
                }
                Err(error) => {
                    warn!("Rule '{}' failed: {}", rule.name(), error);
                    stats.rules_failed += 1;
                    violations.push(execution_error(rule, &error));
                    (0, true)
                }
            };

            summaries.push(RuleSummary {
                rule: rule.name().to_string(),
                table: rule.table().to_string(),
                check: rule.kind().label().to_string(),
                violations: found,
                failed,
            });
        }

        info!(
            "Run finished: {} violations, {} failed rules",
            violations.len(),
            stats.rules_failed
        );
        debug!("Run took {:?}", start.elapsed());

        Ok(RuleReport {
            layer: snapshot.layer(),
            as_of,
            violations,
            rules: summaries,
            stats,
        })
    }

    fn check_tables(&self, snapshot: &Snapshot) -> Result<()> {
        for rule in &self.rules {
            if let Some(table) = rule.required_tables().find(|t| !snapshot.contains(t)) {
                return Err(EngineError::missing_table(table, rule.name()));
            }
        }
        Ok(())
    }
}

/// Evaluates one rule, returning its findings sorted by row.
///
/// Any error discards the findings gathered so far.
fn evaluate(
    rule: &Rule,
    table: &Table,
    context: &RuleContext<'_>,
) -> std::result::Result<Vec<Finding>, RuleError> {
    let mut findings = match rule.kind() {
        RuleKind::Row(check) => {
            let mut findings = Vec::new();
            for (row, record) in table.rows().iter().enumerate() {
                if let Some(finding) = check.check(record, context)? {
                    findings.push(finding.at_row(row));
                }
            }
            findings
        }
        RuleKind::Set(check) => {
            let findings = check.check(table, context)?;
            if findings.iter().any(|f| f.row.is_none()) {
                return Err(RuleError::Failed(
                    "set-level finding without a row".to_string(),
                ));
            }
            findings
        }
    };

    findings.sort_by_key(|f| f.row);
    Ok(findings)
}

fn to_violation(rule: &Rule, table: &Table, finding: Finding) -> Violation {
    let keys = finding
        .row
        .and_then(|row| table.get_row(row))
        .map(|record| {
            rule.key_columns()
                .iter()
                .filter_map(|column| {
                    record
                        .get(column)
                        .map(|value| (column.clone(), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    Violation {
        rule: rule.name().to_string(),
        table: rule.table().to_string(),
        kind: ViolationKind::Finding,
        row: finding.row,
        keys,
        expected: finding.expected,
        actual: finding.actual,
        message: finding.message,
        repairs: finding.repairs,
    }
}

fn execution_error(rule: &Rule, error: &RuleError) -> Violation {
    Violation {
        rule: rule.name().to_string(),
        table: rule.table().to_string(),
        kind: ViolationKind::RuleExecutionError,
        row: None,
        keys: BTreeMap::new(),
        expected: None,
        actual: None,
        message: error.to_string(),
        repairs: BTreeMap::new(),
    }
}
