//! Grouping and ordered-scan helpers.
//!
//! Window functions (`ROW_NUMBER() OVER (PARTITION BY .. ORDER BY ..)`,
//! `LEAD(..)`) map onto three steps: partition the rows of a table by key,
//! sort each partition stably, then scan it in order. Rows are referred to
//! by index into the table, so ties always fall back to physical order.

use quality_core::{RuleError, Table, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Sort direction for [`sort_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first; nulls first
    Ascending,
    /// Largest first; nulls last
    Descending,
}

/// Rows of a table grouped by key.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Partitions {
    /// Key (rendered values) to row indices, in insertion order
    pub groups: BTreeMap<Vec<String>, Vec<usize>>,

    /// Rows with a null in any key column, in insertion order
    pub null_keys: Vec<usize>,
}

impl Partitions {
    /// Iterates over groups holding more than one row.
    pub fn duplicates(&self) -> impl Iterator<Item = (&Vec<String>, &Vec<usize>)> {
        self.groups.iter().filter(|(_, rows)| rows.len() > 1)
    }
}

/// Groups the rows of `table` by the rendered values of `columns`.
///
/// Keys are compared as text so that an integer `42` and a string `"42"`
/// land in the same group, which is how the source store compares them.
pub fn partition_by(table: &Table, columns: &[String]) -> Result<Partitions, RuleError> {
    let mut partitions = Partitions::default();

    for (row, record) in table.rows().iter().enumerate() {
        let mut key = Vec::with_capacity(columns.len());
        let mut has_null = false;

        for column in columns {
            let value = record.value(column)?;
            if value.is_null() {
                has_null = true;
                break;
            }
            key.push(value.to_string());
        }

        if has_null {
            partitions.null_keys.push(row);
        } else {
            partitions.groups.entry(key).or_default().push(row);
        }
    }

    Ok(partitions)
}

/// Sorts row indices by a derived key, stably.
///
/// Equal keys keep their input order, which callers pass in physical order.
pub fn sort_rows<K, F>(rows: &[usize], order: SortOrder, key_of: F) -> Result<Vec<usize>, RuleError>
where
    K: Ord,
    F: Fn(usize) -> Result<K, RuleError>,
{
    let mut keyed = rows
        .iter()
        .map(|&row| key_of(row).map(|key| (key, row)))
        .collect::<Result<Vec<_>, _>>()?;

    match order {
        SortOrder::Ascending => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
        SortOrder::Descending => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
    }

    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}

/// Sorts row indices by the raw value of a column.
pub fn sort_by_column(
    table: &Table,
    rows: &[usize],
    column: &str,
    order: SortOrder,
) -> Result<Vec<usize>, RuleError> {
    sort_rows(rows, order, |row| {
        let record = table
            .get_row(row)
            .ok_or_else(|| RuleError::Failed(format!("row {} out of range", row)))?;
        record.value(column).map(|v| SortValue(v.clone()))
    })
}

/// Pairs each row with its successor, like `LEAD(row) OVER (..)`.
pub fn lead(rows: &[usize]) -> impl Iterator<Item = (usize, Option<usize>)> + '_ {
    rows.iter()
        .enumerate()
        .map(|(i, &row)| (row, rows.get(i + 1).copied()))
}

/// Assigns 1-based positions, like `ROW_NUMBER() OVER (..)`.
pub fn row_number(rows: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    rows.iter().enumerate().map(|(i, &row)| (row, i + 1))
}

/// A [`Value`] with a total order, for sorting.
#[derive(Debug, Clone)]
pub struct SortValue(pub Value);

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.compare(&other.0)
    }
}
