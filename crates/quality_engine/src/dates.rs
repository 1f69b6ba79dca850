//! Date validation logic.
//!
//! This module handles:
//! - Date bounds: a date column must fall within `[min, max]`, where `max`
//!   defaults to the run's as-of date (birthdates in the future)
//! - Integer-encoded dates: `YYYYMMDD` integers as delivered by the CRM
//!   sales extract, which may be zero, truncated or out of range
//! - Date ordering: one date column must not come after another

use chrono::{Datelike, NaiveDate};
use quality_core::{Finding, Record, RowCheck, RuleContext, RuleError, Value};

/// Default lower bound for integer-encoded dates.
pub const INT_DATE_FLOOR: NaiveDate = match NaiveDate::from_ymd_opt(1900, 1, 1) {
    Some(date) => date,
    None => NaiveDate::MIN,
};

/// Decodes a `YYYYMMDD` integer into a date.
///
/// Returns `None` for non-positive values, values that are not exactly
/// eight digits, and impossible calendar dates.
pub fn decode_int_date(value: i64) -> Option<NaiveDate> {
    if !(10_000_000..=99_999_999).contains(&value) {
        return None;
    }
    let year = i32::try_from(value / 10_000).ok()?;
    let month = u32::try_from(value / 100 % 100).ok()?;
    let day = u32::try_from(value % 100).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Encodes a date as a `YYYYMMDD` integer.
pub fn encode_int_date(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// Reads a column holding either a real date or a `YYYYMMDD` integer.
///
/// Malformed integer dates read as `None`; reporting them is the job of
/// [`IntDateCheck`].
pub fn date_like(record: &Record, column: &str) -> Result<Option<NaiveDate>, RuleError> {
    match record.value(column)? {
        Value::Int(raw) => Ok(decode_int_date(*raw)),
        _ => record.date(column),
    }
}

/// Flags dates outside `[min, max]`.
#[derive(Debug, Clone)]
pub struct DateWithinCheck {
    column: String,
    min: Option<NaiveDate>,
    max: Option<NaiveDate>,
    required: bool,
}

impl DateWithinCheck {
    /// Creates a new date bounds check. A missing `max` means the as-of date.
    pub fn new(
        column: impl Into<String>,
        min: Option<NaiveDate>,
        max: Option<NaiveDate>,
        required: bool,
    ) -> Self {
        Self {
            column: column.into(),
            min,
            max,
            required,
        }
    }
}

impl RowCheck for DateWithinCheck {
    fn check(
        &self,
        record: &Record,
        context: &RuleContext<'_>,
    ) -> Result<Option<Finding>, RuleError> {
        let max = self.max.unwrap_or(context.as_of);
        let expected = match self.min {
            Some(min) => format!("between {} and {}", min, max),
            None => format!("on or before {}", max),
        };

        let Some(date) = record.date(&self.column)? else {
            return Ok(self.required.then(|| {
                Finding::new(format!("'{}' is null", self.column))
                    .expected(expected.clone())
                    .actual("NULL")
            }));
        };

        if let Some(min) = self.min {
            if date < min {
                return Ok(Some(
                    Finding::new(format!("'{}' is before {}", self.column, min))
                        .expected(expected)
                        .actual(date),
                ));
            }
        }

        if date > max {
            return Ok(Some(
                Finding::new(format!("'{}' is in the future (after {})", self.column, max))
                    .expected(expected)
                    .actual(date),
            ));
        }

        Ok(None)
    }
}

/// Flags malformed or out-of-range `YYYYMMDD` integers.
#[derive(Debug, Clone)]
pub struct IntDateCheck {
    column: String,
    min: NaiveDate,
    max: Option<NaiveDate>,
}

impl IntDateCheck {
    /// Creates a new integer date check. A missing `max` means the as-of date.
    pub fn new(column: impl Into<String>, min: Option<NaiveDate>, max: Option<NaiveDate>) -> Self {
        Self {
            column: column.into(),
            min: min.unwrap_or(INT_DATE_FLOOR),
            max,
        }
    }
}

impl RowCheck for IntDateCheck {
    fn check(
        &self,
        record: &Record,
        context: &RuleContext<'_>,
    ) -> Result<Option<Finding>, RuleError> {
        let Some(raw) = record.int(&self.column)? else {
            return Ok(None);
        };

        let max = self.max.unwrap_or(context.as_of);
        let expected = format!(
            "YYYYMMDD between {} and {}",
            encode_int_date(self.min),
            encode_int_date(max)
        );

        let problem = if raw <= 0 {
            Some("is zero or negative".to_string())
        } else if raw.to_string().len() != 8 {
            Some("is not an 8-digit YYYYMMDD value".to_string())
        } else {
            match decode_int_date(raw) {
                None => Some("is not a calendar date".to_string()),
                Some(date) if date < self.min => Some(format!("is before {}", self.min)),
                Some(date) if date > max => Some(format!("is after {}", max)),
                Some(_) => None,
            }
        };

        Ok(problem.map(|problem| {
            Finding::new(format!("'{}' {}", self.column, problem))
                .expected(expected)
                .actual(raw)
        }))
    }
}

/// Flags records where `earlier` comes after `later`.
///
/// Both columns may hold dates or `YYYYMMDD` integers. Nulls and malformed
/// values pass.
#[derive(Debug, Clone)]
pub struct DateOrderCheck {
    earlier: String,
    later: String,
}

impl DateOrderCheck {
    /// Creates a new date order check.
    pub fn new(earlier: impl Into<String>, later: impl Into<String>) -> Self {
        Self {
            earlier: earlier.into(),
            later: later.into(),
        }
    }
}

impl RowCheck for DateOrderCheck {
    fn check(
        &self,
        record: &Record,
        _context: &RuleContext<'_>,
    ) -> Result<Option<Finding>, RuleError> {
        let earlier = date_like(record, &self.earlier)?;
        let later = date_like(record, &self.later)?;

        match (earlier, later) {
            (Some(earlier), Some(later)) if earlier > later => Ok(Some(
                Finding::new(format!("'{}' is after '{}'", self.earlier, self.later))
                    .expected(format!("{} <= {}", self.earlier, later))
                    .actual(earlier),
            )),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quality_core::{Layer, Snapshot};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn run_at(
        check: &dyn RowCheck,
        record: &Record,
        as_of: NaiveDate,
    ) -> Result<Option<Finding>, RuleError> {
        let snapshot = Snapshot::new(Layer::Bronze);
        check.check(record, &RuleContext::new(as_of, &snapshot))
    }

    #[test]
    fn test_decode_int_date() {
        assert_eq!(decode_int_date(20101229), Some(date(2010, 12, 29)));
        assert_eq!(decode_int_date(0), None);
        assert_eq!(decode_int_date(5489), None);
        assert_eq!(decode_int_date(20101332), None);
        assert_eq!(decode_int_date(32154435), None);
        assert_eq!(encode_int_date(date(2010, 12, 29)), 20101229);
    }

    #[test]
    fn test_birthdate_bounds() {
        let as_of = date(2024, 6, 30);
        let check = DateWithinCheck::new("bdate", Some(date(1924, 1, 1)), None, false);

        let too_old = Record::new().with("bdate", date(1900, 1, 1));
        assert!(run_at(&check, &too_old, as_of).unwrap().is_some());

        let future = Record::new().with("bdate", date(2024, 7, 1));
        let finding = run_at(&check, &future, as_of).unwrap().unwrap();
        assert_eq!(finding.actual.as_deref(), Some("2024-07-01"));

        let fine = Record::new().with("bdate", date(1950, 1, 1));
        assert!(run_at(&check, &fine, as_of).unwrap().is_none());

        let on_as_of = Record::new().with("bdate", as_of);
        assert!(run_at(&check, &on_as_of, as_of).unwrap().is_none());

        let missing = Record::new().with("bdate", Value::Null);
        assert!(run_at(&check, &missing, as_of).unwrap().is_none());
    }

    #[test]
    fn test_unparseable_date_is_an_error() {
        let check = DateWithinCheck::new("bdate", None, None, false);
        let record = Record::new().with("bdate", "31/12/1980");
        assert!(matches!(
            run_at(&check, &record, date(2024, 1, 1)),
            Err(RuleError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_int_date_problems() {
        let as_of = date(2014, 12, 31);
        let check = IntDateCheck::new("sls_order_dt", None, None);

        let cases = [
            (0, true),
            (-20100101, true),
            (5489, true),
            (20101332, true),
            (18991231, true),
            (20150101, true),
            (20101229, false),
        ];
        for (raw, violates) in cases {
            let record = Record::new().with("sls_order_dt", Value::Int(raw));
            let finding = run_at(&check, &record, as_of).unwrap();
            assert_eq!(finding.is_some(), violates, "value {}", raw);
        }

        let record = Record::new().with("sls_order_dt", Value::Null);
        assert!(run_at(&check, &record, as_of).unwrap().is_none());
    }

    #[test]
    fn test_int_date_explicit_max() {
        let check = IntDateCheck::new("sls_due_dt", None, Some(date(2050, 1, 1)));
        let record = Record::new().with("sls_due_dt", Value::Int(20300101));
        assert!(run_at(&check, &record, date(2014, 1, 1)).unwrap().is_none());
    }

    #[test]
    fn test_date_order() {
        let check = DateOrderCheck::new("sls_order_dt", "sls_ship_dt");
        let as_of = date(2024, 1, 1);

        let ok = Record::new()
            .with("sls_order_dt", Value::Int(20101229))
            .with("sls_ship_dt", Value::Int(20110105));
        assert!(run_at(&check, &ok, as_of).unwrap().is_none());

        let bad = Record::new()
            .with("sls_order_dt", Value::Int(20110110))
            .with("sls_ship_dt", Value::Int(20110105));
        assert!(run_at(&check, &bad, as_of).unwrap().is_some());

        let malformed = Record::new()
            .with("sls_order_dt", Value::Int(0))
            .with("sls_ship_dt", Value::Int(20110105));
        assert!(run_at(&check, &malformed, as_of).unwrap().is_none());

        let real_dates = Record::new()
            .with("sls_order_dt", date(2011, 2, 1))
            .with("sls_ship_dt", date(2011, 1, 1));
        assert!(run_at(&check, &real_dates, as_of).unwrap().is_some());
    }
}
