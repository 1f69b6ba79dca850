//! Violations and run reports.
//!
//! A [`RuleReport`] is produced per engine run and is fully deterministic: it
//! contains no timing data, and its violations follow catalog order then row
//! order.

use crate::{Layer, Value};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// What produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The data failed the rule
    Finding,
    /// The rule itself failed to evaluate
    RuleExecutionError,
}

/// One reported discrepancy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Rule that fired
    pub rule: String,

    /// Table the rule targets
    pub table: String,

    /// Finding or rule execution error
    pub kind: ViolationKind,

    /// Offending row index (absent for execution errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,

    /// Primary key values of the offending record
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub keys: BTreeMap<String, String>,

    /// Expected value, rendered
    pub expected: Option<String>,

    /// Actual value, rendered
    pub actual: Option<String>,

    /// Human-readable description
    pub message: String,

    /// Derived values that would repair the record
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub repairs: BTreeMap<String, Value>,
}

impl Violation {
    /// Returns true if this violation records a failed rule.
    pub fn is_execution_error(&self) -> bool {
        self.kind == ViolationKind::RuleExecutionError
    }

    /// Looks up a repaired value by name.
    pub fn repair(&self, name: &str) -> Option<&Value> {
        self.repairs.get(name)
    }
}

/// Per-rule outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    /// Rule name
    pub rule: String,

    /// Target table
    pub table: String,

    /// "row" or "set"
    pub check: String,

    /// Number of findings
    pub violations: usize,

    /// Whether the rule failed to evaluate
    pub failed: bool,
}

/// Counters about a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Number of rules evaluated
    pub rules_evaluated: usize,

    /// Number of records in the distinct target tables, each table counted once
    pub records_scanned: usize,

    /// Number of rules that failed to evaluate
    pub rules_failed: usize,
}

/// Result of running a rule catalog against a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleReport {
    /// Layer of the evaluated snapshot
    pub layer: Layer,

    /// Reference date used for time-dependent rules
    pub as_of: NaiveDate,

    /// Violations, in catalog order then row order
    pub violations: Vec<Violation>,

    /// One entry per rule, in catalog order
    pub rules: Vec<RuleSummary>,

    /// Run counters
    pub stats: RunStats,
}

impl RuleReport {
    /// Returns true if no rule fired and no rule failed.
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns the violations of a single rule.
    pub fn for_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations.iter().filter(move |v| v.rule == rule)
    }

    /// Returns the violations recording failed rules.
    pub fn execution_errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_execution_error())
    }

    /// Returns the number of data findings (excluding rule failures).
    pub fn finding_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| !v.is_execution_error())
            .count()
    }
}
