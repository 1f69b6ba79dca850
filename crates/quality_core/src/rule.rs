//! Rule abstraction.
//!
//! A [`Rule`] targets one table and is either a row-level check, evaluated
//! once per record, or a set-level check, evaluated once over the whole table
//! (grouping, window ranking, cross-table lookups). Both kinds are traits with
//! blanket implementations for closures, so ad-hoc rules can be registered
//! without a dedicated type.

use crate::{Record, RuleError, Snapshot, Table, Value};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// Context handed to every check.
///
/// `as_of` replaces the wall clock: "future date" checks compare against it
/// so that a run is reproducible.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Reference date for time-dependent checks
    pub as_of: NaiveDate,

    /// The snapshot under evaluation, for cross-table checks
    pub snapshot: &'a Snapshot,
}

impl<'a> RuleContext<'a> {
    /// Creates a new rule context.
    pub fn new(as_of: NaiveDate, snapshot: &'a Snapshot) -> Self {
        Self { as_of, snapshot }
    }
}

/// A single discrepancy reported by a check.
///
/// The engine attaches rule name, table and key values when turning a
/// finding into a [`crate::Violation`].
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    /// Offending row index. Set-level checks must fill it; row-level
    /// findings get it from the engine.
    pub row: Option<usize>,

    /// Human-readable description
    pub message: String,

    /// Expected value, rendered
    pub expected: Option<String>,

    /// Actual value, rendered
    pub actual: Option<String>,

    /// Derived values that would repair the record (e.g. `calc_sales`)
    pub repairs: BTreeMap<String, Value>,
}

impl Finding {
    /// Creates a new finding with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            row: None,
            message: message.into(),
            expected: None,
            actual: None,
            repairs: BTreeMap::new(),
        }
    }

    /// Sets the row index.
    pub fn at_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Sets the expected value.
    pub fn expected(mut self, expected: impl ToString) -> Self {
        self.expected = Some(expected.to_string());
        self
    }

    /// Sets the actual value.
    pub fn actual(mut self, actual: impl ToString) -> Self {
        self.actual = Some(actual.to_string());
        self
    }

    /// Adds a repaired or inferred value.
    pub fn repair(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.repairs.insert(name.into(), value.into());
        self
    }
}

/// Predicate evaluated once per record.
pub trait RowCheck: Send + Sync {
    /// Returns `Some(finding)` when the record violates the check.
    fn check(&self, record: &Record, context: &RuleContext<'_>)
    -> Result<Option<Finding>, RuleError>;
}

impl<F> RowCheck for F
where
    F: Fn(&Record, &RuleContext<'_>) -> Result<Option<Finding>, RuleError> + Send + Sync,
{
    fn check(
        &self,
        record: &Record,
        context: &RuleContext<'_>,
    ) -> Result<Option<Finding>, RuleError> {
        self(record, context)
    }
}

/// Aggregate evaluated once over a whole table.
pub trait SetCheck: Send + Sync {
    /// Returns one finding per offending row. Every finding carries a row.
    fn check(&self, table: &Table, context: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError>;
}

impl<F> SetCheck for F
where
    F: Fn(&Table, &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> + Send + Sync,
{
    fn check(&self, table: &Table, context: &RuleContext<'_>) -> Result<Vec<Finding>, RuleError> {
        self(table, context)
    }
}

/// The two kinds of rule.
pub enum RuleKind {
    /// Per-record predicate
    Row(Box<dyn RowCheck>),
    /// Whole-table aggregate
    Set(Box<dyn SetCheck>),
}

impl RuleKind {
    /// Short label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            RuleKind::Row(_) => "row",
            RuleKind::Set(_) => "set",
        }
    }
}

impl fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleKind::{}", self.label())
    }
}

/// A named data-quality rule bound to a target table.
#[derive(Debug)]
pub struct Rule {
    name: String,
    table: String,
    description: Option<String>,
    key_columns: Vec<String>,
    extra_tables: Vec<String>,
    kind: RuleKind,
}

impl Rule {
    /// Creates a row-level rule.
    pub fn row(
        name: impl Into<String>,
        table: impl Into<String>,
        check: impl RowCheck + 'static,
    ) -> Self {
        Self::with_kind(name, table, RuleKind::Row(Box::new(check)))
    }

    /// Creates a set-level rule.
    pub fn set(
        name: impl Into<String>,
        table: impl Into<String>,
        check: impl SetCheck + 'static,
    ) -> Self {
        Self::with_kind(name, table, RuleKind::Set(Box::new(check)))
    }

    fn with_kind(name: impl Into<String>, table: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            description: None,
            key_columns: Vec::new(),
            extra_tables: Vec::new(),
            kind,
        }
    }

    /// Sets the description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the key columns reported with each violation.
    pub fn keys<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Declares an additional table the rule reads.
    pub fn requires(mut self, table: impl Into<String>) -> Self {
        let table = table.into();
        if table != self.table && !self.extra_tables.contains(&table) {
            self.extra_tables.push(table);
        }
        self
    }

    /// Returns the rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the target table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the key columns.
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// Returns every table the rule needs, target table first.
    pub fn required_tables(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.table.as_str()).chain(self.extra_tables.iter().map(String::as_str))
    }

    /// Returns the rule kind.
    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }
}
