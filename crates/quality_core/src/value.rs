//! Typed values and records.
//!
//! A [`Record`] is one row of a source table: an ordered mapping from column
//! name to [`Value`]. Records are read-only once a snapshot is built.

use crate::RuleError;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Date format used for textual dates (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A value in a source record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Null/missing value
    Null,
    /// String value, stored as read (whitespace preserved)
    String(String),
    /// Integer value
    Int(i64),
    /// Decimal value
    Decimal(f64),
    /// Calendar date
    Date(NaiveDate),
    /// Boolean value
    Bool(bool),
}

impl Value {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Int(_) => "integer",
            Value::Decimal(_) => "decimal",
            Value::Date(_) => "date",
            Value::Bool(_) => "boolean",
        }
    }

    /// Attempts to get this value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get this value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to get this value as a decimal. Integers widen.
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Value::Decimal(d) => Some(*d),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Attempts to get this value as a date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Total order used for sorting and window ranking.
    ///
    /// Nulls sort first, then booleans, numbers (compared numerically across
    /// integer and decimal), dates and strings.
    pub fn compare(&self, other: &Value) -> Ordering {
        fn class(v: &Value) -> u8 {
            match v {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Int(_) | Value::Decimal(_) => 2,
                Value::Date(_) => 3,
                Value::String(_) => 4,
            }
        }

        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (a, b) if class(a) == 2 && class(b) == 2 => {
                let (a, b) = (a.as_decimal(), b.as_decimal());
                a.unwrap_or_default().total_cmp(&b.unwrap_or_default())
            }
            (a, b) => class(a).cmp(&class(b)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::String(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Decimal(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A single row of a source table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column value, replacing any previous value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    /// Builder-style variant of [`Record::insert`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Returns the raw value of a column, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Returns the value of a column or a [`RuleError::MissingColumn`].
    pub fn value(&self, column: &str) -> Result<&Value, RuleError> {
        self.values
            .get(column)
            .ok_or_else(|| RuleError::missing_column(column))
    }

    /// Returns the column names in sorted order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reads a column as text. Non-string values are rendered.
    pub fn text(&self, column: &str) -> Result<Option<String>, RuleError> {
        Ok(match self.value(column)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
    }

    /// Reads a column as an integer, parsing strings.
    pub fn int(&self, column: &str) -> Result<Option<i64>, RuleError> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Int(i) => Ok(Some(*i)),
            Value::Decimal(d) if d.fract() == 0.0 => Ok(Some(*d as i64)),
            Value::String(s) => parse_trimmed(column, s, "not an integer"),
            other => Err(RuleError::type_mismatch(column, "integer", other.type_name())),
        }
    }

    /// Reads a column as a decimal, parsing strings.
    pub fn decimal(&self, column: &str) -> Result<Option<f64>, RuleError> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Int(i) => Ok(Some(*i as f64)),
            Value::Decimal(d) => Ok(Some(*d)),
            Value::String(s) => parse_trimmed(column, s, "not a number"),
            other => Err(RuleError::type_mismatch(column, "decimal", other.type_name())),
        }
    }

    /// Reads a column as a date, parsing `YYYY-MM-DD` strings.
    pub fn date(&self, column: &str) -> Result<Option<NaiveDate>, RuleError> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Date(d) => Ok(Some(*d)),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .map(Some)
                .map_err(|e| RuleError::invalid_value(column, s.as_str(), e.to_string())),
            other => Err(RuleError::type_mismatch(column, "date", other.type_name())),
        }
    }
}

fn parse_trimmed<T: std::str::FromStr>(
    column: &str,
    raw: &str,
    message: &str,
) -> Result<Option<T>, RuleError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| RuleError::invalid_value(column, raw, message))
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
