//! Sales arithmetic consistency.
//!
//! A sales line is consistent when `sales = quantity × |price|`. Stored
//! sales that are null, non-positive or off from that product are reported
//! with the recomputed amount (`calc_sales`). A null or zero price is
//! reported with the price recomputed from the stored sales
//! (`calc_price = sales / quantity`), unless sales is null or quantity is
//! null or zero.
//! A negative price is tolerated: only its magnitude takes part.

use quality_core::{Finding, Record, RowCheck, RuleContext, RuleError, Value};

/// Tolerance for comparing stored and recomputed amounts.
const EPSILON: f64 = 1e-6;

/// Renders a derived amount, as an integer when it has no fractional part.
pub fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::Int(value as i64)
    } else {
        Value::Decimal(value)
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
}

fn render(value: Option<f64>) -> String {
    value.map_or_else(|| "NULL".to_string(), |v| number(v).to_string())
}

/// Checks `sales = quantity × |price|` on every sales line.
#[derive(Debug, Clone)]
pub struct SalesConsistencyCheck {
    sales: String,
    quantity: String,
    price: String,
}

impl SalesConsistencyCheck {
    /// Creates a new consistency check over the given columns.
    pub fn new(
        sales: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
    ) -> Self {
        Self {
            sales: sales.into(),
            quantity: quantity.into(),
            price: price.into(),
        }
    }
}

impl Default for SalesConsistencyCheck {
    fn default() -> Self {
        Self::new("sls_sales", "sls_quantity", "sls_price")
    }
}

impl RowCheck for SalesConsistencyCheck {
    fn check(
        &self,
        record: &Record,
        _context: &RuleContext<'_>,
    ) -> Result<Option<Finding>, RuleError> {
        let sales = record.decimal(&self.sales)?;
        let quantity = record.decimal(&self.quantity)?;
        let price = record.decimal(&self.price)?;

        let mut problems = Vec::new();
        let mut repairs: Vec<(&str, Value)> = Vec::new();

        let calc_sales = match (quantity, price) {
            (Some(q), Some(p)) if p != 0.0 => Some(q * p.abs()),
            _ => None,
        };

        match sales {
            None => problems.push(format!("'{}' is null", self.sales)),
            Some(s) if s <= 0.0 => problems.push(format!("'{}' is not positive", self.sales)),
            Some(s) => {
                if let Some(calc) = calc_sales {
                    if !approx_eq(s, calc) {
                        problems.push(format!(
                            "'{}' does not equal {} x |{}|",
                            self.sales, self.quantity, self.price
                        ));
                    }
                }
            }
        }
        if !problems.is_empty() {
            if let Some(calc) = calc_sales {
                repairs.push(("calc_sales", number(calc)));
            }
        }

        match quantity {
            None => problems.push(format!("'{}' is null", self.quantity)),
            Some(q) if q <= 0.0 => problems.push(format!("'{}' is not positive", self.quantity)),
            Some(_) => {}
        }

        if price.is_none_or(|p| p == 0.0) {
            problems.push(format!("'{}' is null or zero", self.price));
            match (sales, quantity) {
                (Some(s), Some(q)) if q != 0.0 => {
                    repairs.push(("calc_price", number(s / q)));
                }
                _ => problems.push("price cannot be repaired".to_string()),
            }
        }

        if problems.is_empty() {
            return Ok(None);
        }

        let expected = match calc_sales {
            Some(calc) => format!("{} = {}", self.sales, number(calc)),
            None => format!("{} = {} x |{}|", self.sales, self.quantity, self.price),
        };
        let actual = format!(
            "{}={}, {}={}, {}={}",
            self.sales,
            render(sales),
            self.quantity,
            render(quantity),
            self.price,
            render(price)
        );

        let finding = repairs.into_iter().fold(
            Finding::new(problems.join("; "))
                .expected(expected)
                .actual(actual),
            |finding, (name, value)| finding.repair(name, value),
        );

        Ok(Some(finding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use quality_core::{Layer, Snapshot};

    fn run(sales: Value, quantity: Value, price: Value) -> Option<Finding> {
        let snapshot = Snapshot::new(Layer::Bronze);
        let context = RuleContext::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), &snapshot);
        let record = Record::new()
            .with("sls_sales", sales)
            .with("sls_quantity", quantity)
            .with("sls_price", price);
        SalesConsistencyCheck::default()
            .check(&record, &context)
            .unwrap()
    }

    #[test]
    fn test_consistent_line() {
        assert_eq!(run(Value::Int(20), Value::Int(2), Value::Int(10)), None);
    }

    #[test]
    fn test_wrong_sales_recomputed() {
        let finding = run(Value::Int(15), Value::Int(2), Value::Int(10)).unwrap();
        assert_eq!(finding.repairs.get("calc_sales"), Some(&Value::Int(20)));
        assert_eq!(finding.expected.as_deref(), Some("sls_sales = 20"));
        assert!(finding.repairs.get("calc_price").is_none());
    }

    #[test]
    fn test_negative_price_tolerated() {
        assert_eq!(run(Value::Int(20), Value::Int(2), Value::Int(-10)), None);
    }

    #[test]
    fn test_zero_price_recomputed() {
        let finding = run(Value::Int(20), Value::Int(2), Value::Int(0)).unwrap();
        assert_eq!(finding.repairs.get("calc_price"), Some(&Value::Int(10)));
        assert!(finding.repairs.get("calc_sales").is_none());
    }

    #[test]
    fn test_null_price_recomputed() {
        let finding = run(Value::Int(30), Value::Int(4), Value::Null).unwrap();
        assert_eq!(finding.repairs.get("calc_price"), Some(&Value::Decimal(7.5)));
    }

    #[test]
    fn test_null_or_negative_sales() {
        let finding = run(Value::Null, Value::Int(2), Value::Int(10)).unwrap();
        assert_eq!(finding.repairs.get("calc_sales"), Some(&Value::Int(20)));

        let finding = run(Value::Int(-20), Value::Int(2), Value::Int(10)).unwrap();
        assert_eq!(finding.repairs.get("calc_sales"), Some(&Value::Int(20)));
    }

    #[test]
    fn test_negative_sales_still_repairs_price() {
        let finding = run(Value::Int(-20), Value::Int(2), Value::Null).unwrap();
        assert_eq!(finding.repairs.get("calc_price"), Some(&Value::Int(-10)));
        assert!(finding.message.contains("'sls_sales' is not positive"));
        assert!(!finding.message.contains("cannot be repaired"));

        let finding = run(Value::Null, Value::Int(2), Value::Null).unwrap();
        assert!(finding.repairs.get("calc_price").is_none());
        assert!(finding.message.contains("cannot be repaired"));
    }

    #[test]
    fn test_zero_quantity_cannot_repair_price() {
        let finding = run(Value::Int(20), Value::Int(0), Value::Int(0)).unwrap();
        assert!(finding.repairs.is_empty());
        assert!(finding.message.contains("cannot be repaired"));
    }

    #[test]
    fn test_decimal_amounts() {
        assert_eq!(
            run(Value::Decimal(0.3), Value::Int(3), Value::Decimal(0.1)),
            None
        );
        assert_eq!(
            run(Value::from("20"), Value::from("2"), Value::from("10")),
            None
        );
    }

    #[test]
    fn test_number_rendering() {
        assert_eq!(number(20.0), Value::Int(20));
        assert_eq!(number(7.5), Value::Decimal(7.5));
    }
}
