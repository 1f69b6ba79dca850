//! Type conversion from Arrow arrays to record values.

use crate::SourceError;
use arrow_array::RecordBatch;
use arrow_array::array::*;
use arrow_array::types::*;
use arrow_schema::{DataType, TimeUnit};
use quality_core::{Record, Table, Value};
use tracing::warn;

fn downcast<'a, T: 'static>(array: &'a ArrayRef, name: &str) -> Result<&'a T, SourceError> {
    array.as_any().downcast_ref::<T>().ok_or_else(|| {
        SourceError::TypeConversionError(format!("Failed to downcast to {}", name))
    })
}

fn primitive<'a, T: ArrowPrimitiveType>(
    array: &'a ArrayRef,
    name: &str,
) -> Result<&'a PrimitiveArray<T>, SourceError> {
    downcast::<PrimitiveArray<T>>(array, name)
}

fn out_of_range(what: &str, row_idx: usize) -> SourceError {
    SourceError::TypeConversionError(format!("{} out of range at row {}", what, row_idx))
}

/// Converts one Arrow value to a record [`Value`].
///
/// Integers widen to `i64`, floats and decimals become `f64`, and dates and
/// timestamps become calendar dates (timestamps drop their time of day).
/// Types the warehouse extracts never produce are logged and read as null.
pub fn arrow_value_to_value(array: &ArrayRef, row_idx: usize) -> Result<Value, SourceError> {
    if array.is_null(row_idx) {
        return Ok(Value::Null);
    }

    let value = match array.data_type() {
        DataType::Null => Value::Null,
        DataType::Boolean => {
            Value::Bool(downcast::<BooleanArray>(array, "BooleanArray")?.value(row_idx))
        }
        DataType::Int8 => {
            Value::Int(primitive::<Int8Type>(array, "Int8Array")?.value(row_idx).into())
        }
        DataType::Int16 => {
            Value::Int(primitive::<Int16Type>(array, "Int16Array")?.value(row_idx).into())
        }
        DataType::Int32 => {
            Value::Int(primitive::<Int32Type>(array, "Int32Array")?.value(row_idx).into())
        }
        DataType::Int64 => Value::Int(primitive::<Int64Type>(array, "Int64Array")?.value(row_idx)),
        DataType::UInt8 => {
            Value::Int(primitive::<UInt8Type>(array, "UInt8Array")?.value(row_idx).into())
        }
        DataType::UInt16 => {
            Value::Int(primitive::<UInt16Type>(array, "UInt16Array")?.value(row_idx).into())
        }
        DataType::UInt32 => {
            Value::Int(primitive::<UInt32Type>(array, "UInt32Array")?.value(row_idx).into())
        }
        DataType::UInt64 => {
            let raw = primitive::<UInt64Type>(array, "UInt64Array")?.value(row_idx);
            Value::Int(i64::try_from(raw).map_err(|_| out_of_range("UInt64 value", row_idx))?)
        }
        DataType::Float32 => {
            Value::Decimal(primitive::<Float32Type>(array, "Float32Array")?.value(row_idx).into())
        }
        DataType::Float64 => {
            Value::Decimal(primitive::<Float64Type>(array, "Float64Array")?.value(row_idx))
        }
        DataType::Decimal128(_, scale) => {
            let raw = primitive::<Decimal128Type>(array, "Decimal128Array")?.value(row_idx);
            Value::Decimal(raw as f64 / 10f64.powi(i32::from(*scale)))
        }
        DataType::Utf8 => Value::String(
            downcast::<StringArray>(array, "StringArray")?
                .value(row_idx)
                .to_string(),
        ),
        DataType::LargeUtf8 => Value::String(
            downcast::<LargeStringArray>(array, "LargeStringArray")?
                .value(row_idx)
                .to_string(),
        ),
        DataType::Utf8View => Value::String(
            downcast::<StringViewArray>(array, "StringViewArray")?
                .value(row_idx)
                .to_string(),
        ),
        DataType::Date32 => Value::Date(
            primitive::<Date32Type>(array, "Date32Array")?
                .value_as_date(row_idx)
                .ok_or_else(|| out_of_range("Date32 value", row_idx))?,
        ),
        DataType::Date64 => Value::Date(
            primitive::<Date64Type>(array, "Date64Array")?
                .value_as_date(row_idx)
                .ok_or_else(|| out_of_range("Date64 value", row_idx))?,
        ),
        DataType::Timestamp(unit, _) => {
            let datetime = match unit {
                TimeUnit::Second => primitive::<TimestampSecondType>(array, "TimestampSecondArray")?
                    .value_as_datetime(row_idx),
                TimeUnit::Millisecond => {
                    primitive::<TimestampMillisecondType>(array, "TimestampMillisecondArray")?
                        .value_as_datetime(row_idx)
                }
                TimeUnit::Microsecond => {
                    primitive::<TimestampMicrosecondType>(array, "TimestampMicrosecondArray")?
                        .value_as_datetime(row_idx)
                }
                TimeUnit::Nanosecond => {
                    primitive::<TimestampNanosecondType>(array, "TimestampNanosecondArray")?
                        .value_as_datetime(row_idx)
                }
            };
            Value::Date(
                datetime
                    .ok_or_else(|| out_of_range("Timestamp value", row_idx))?
                    .date(),
            )
        }
        other => {
            warn!("Unsupported Arrow type for conversion: {:?}", other);
            Value::Null
        }
    };

    Ok(value)
}

/// Converts the record batches of one table into a [`Table`].
///
/// `columns` are the table's column names, already normalized, in schema
/// order; every batch must carry that many columns.
pub fn batches_to_table(
    name: &str,
    columns: Vec<String>,
    batches: &[RecordBatch],
) -> Result<Table, SourceError> {
    let mut table = Table::new(name, columns);

    for batch in batches {
        if batch.num_columns() != table.columns().len() {
            return Err(SourceError::TypeConversionError(format!(
                "batch for '{}' has {} columns, expected {}",
                name,
                batch.num_columns(),
                table.columns().len()
            )));
        }

        for row_idx in 0..batch.num_rows() {
            let mut record = Record::new();
            for (column, array) in table.columns().iter().zip(batch.columns()) {
                record.insert(column.as_str(), arrow_value_to_value(array, row_idx)?);
            }
            table.push(record);
        }
    }

    Ok(table)
}
