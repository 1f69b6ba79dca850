//! Error types for the rule engine.
//!
//! Two families live here: [`EngineError`] for failures that stop a catalog
//! from being built or run, and [`RuleError`] for failures of a single rule
//! that the engine recovers from and records in the report.

use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Fatal engine errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A rule with the same name already targets the same table
    #[error("Rule '{name}' is already registered for table '{table}'")]
    DuplicateRule {
        /// Rule name
        name: String,
        /// Target table
        table: String,
    },

    /// The snapshot does not contain a table that a rule needs
    #[error("Table '{table}' required by rule '{rule}' is missing from the snapshot")]
    MissingTable {
        /// Missing table name
        table: String,
        /// First rule that required it
        rule: String,
    },

    /// A declarative rule definition could not be turned into a rule
    #[error("Invalid rule '{rule}': {message}")]
    InvalidRule {
        /// Rule name
        rule: String,
        /// What is wrong with it
        message: String,
    },
}

impl EngineError {
    /// Creates a new duplicate rule error.
    pub fn duplicate_rule(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self::DuplicateRule {
            name: name.into(),
            table: table.into(),
        }
    }

    /// Creates a new missing table error.
    pub fn missing_table(table: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::MissingTable {
            table: table.into(),
            rule: rule.into(),
        }
    }

    /// Creates a new invalid rule error.
    pub fn invalid_rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while a single rule evaluates.
///
/// These never abort a run. The engine turns them into a
/// `RuleExecutionError` violation for the rule that raised them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The record has no such column
    #[error("Column '{0}' not found")]
    MissingColumn(String),

    /// The value has the wrong type for the check
    #[error("Type mismatch for column '{column}': expected {expected}, found {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    /// The value has the right type but cannot be interpreted
    #[error("Invalid value '{value}' in column '{column}': {message}")]
    InvalidValue {
        column: String,
        value: String,
        message: String,
    },

    /// Any other failure
    #[error("{0}")]
    Failed(String),
}

impl RuleError {
    /// Creates a new missing column error.
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn(column.into())
    }

    /// Creates a new type mismatch error.
    pub fn type_mismatch(
        column: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a new invalid value error.
    pub fn invalid_value(
        column: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            column: column.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}
