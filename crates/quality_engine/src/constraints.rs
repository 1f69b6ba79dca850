//! Row-level value constraints.
//!
//! This module handles per-record checks on a single column:
//! - Trimmed: no leading or trailing whitespace
//! - NonNegative: numeric value present and not negative
//! - AllowedValues: value must be one of a predefined set
//! - Pattern: value must match a regex pattern

use quality_core::{Finding, Record, RowCheck, RuleContext, RuleError};
use regex::Regex;

/// Flags values with leading or trailing whitespace.
///
/// Nulls pass. Non-string values are checked through their rendered text,
/// which never carries whitespace.
#[derive(Debug, Clone)]
pub struct TrimmedCheck {
    column: String,
}

impl TrimmedCheck {
    /// Creates a new whitespace check.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl RowCheck for TrimmedCheck {
    fn check(
        &self,
        record: &Record,
        _context: &RuleContext<'_>,
    ) -> Result<Option<Finding>, RuleError> {
        let Some(text) = record.text(&self.column)? else {
            return Ok(None);
        };

        let trimmed = text.trim();
        if trimmed == text {
            return Ok(None);
        }

        Ok(Some(
            Finding::new(format!(
                "Unwanted leading/trailing spaces in '{}'",
                self.column
            ))
            .expected(trimmed)
            .actual(&text),
        ))
    }
}

/// Flags null or negative numbers.
#[derive(Debug, Clone)]
pub struct NonNegativeCheck {
    column: String,
}

impl NonNegativeCheck {
    /// Creates a new non-negative check.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

impl RowCheck for NonNegativeCheck {
    fn check(
        &self,
        record: &Record,
        _context: &RuleContext<'_>,
    ) -> Result<Option<Finding>, RuleError> {
        match record.decimal(&self.column)? {
            None => Ok(Some(
                Finding::new(format!("'{}' is null", self.column))
                    .expected(">= 0")
                    .actual("NULL"),
            )),
            Some(value) if value < 0.0 => Ok(Some(
                Finding::new(format!("'{}' is negative", self.column))
                    .expected(">= 0")
                    .actual(value),
            )),
            Some(_) => Ok(None),
        }
    }
}

/// Flags values outside a fixed set.
#[derive(Debug, Clone)]
pub struct AllowedValuesCheck {
    column: String,
    values: Vec<String>,
    required: bool,
}

impl AllowedValuesCheck {
    /// Creates a new allowed values check.
    pub fn new(column: impl Into<String>, values: Vec<String>, required: bool) -> Self {
        Self {
            column: column.into(),
            values,
            required,
        }
    }
}

impl RowCheck for AllowedValuesCheck {
    fn check(
        &self,
        record: &Record,
        _context: &RuleContext<'_>,
    ) -> Result<Option<Finding>, RuleError> {
        let expected = format!("one of [{}]", self.values.join(", "));

        match record.text(&self.column)? {
            None if self.required => Ok(Some(
                Finding::new(format!("'{}' is null", self.column))
                    .expected(expected)
                    .actual("NULL"),
            )),
            None => Ok(None),
            Some(value) if self.values.iter().any(|allowed| *allowed == value) => Ok(None),
            Some(value) => Ok(Some(
                Finding::new(format!(
                    "Value '{}' not in allowed values for '{}'",
                    value, self.column
                ))
                .expected(expected)
                .actual(value),
            )),
        }
    }
}

/// Flags values that do not match a regex.
#[derive(Debug, Clone)]
pub struct PatternCheck {
    column: String,
    regex: Regex,
}

impl PatternCheck {
    /// Creates a new pattern check, compiling the regex once.
    pub fn new(column: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            column: column.into(),
            regex: Regex::new(pattern)?,
        })
    }
}

impl RowCheck for PatternCheck {
    fn check(
        &self,
        record: &Record,
        _context: &RuleContext<'_>,
    ) -> Result<Option<Finding>, RuleError> {
        match record.text(&self.column)? {
            Some(value) if !self.regex.is_match(&value) => Ok(Some(
                Finding::new(format!(
                    "Value for '{}' doesn't match pattern '{}'",
                    self.column,
                    self.regex.as_str()
                ))
                .expected(self.regex.as_str())
                .actual(value),
            )),
            _ => Ok(None),
        }
    }
}
