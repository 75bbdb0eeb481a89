//! Stable multi-key sorting of a table

use std::cmp::Ordering;

use tracing::debug;

use crate::error::{Result, TableError};
use crate::model::{CellValue, ColumnType, Row, Table};

/// One sort key: a column and the type its cells are compared as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: usize,
    pub column_type: ColumnType,
}

impl SortKey {
    pub fn new(column: usize, column_type: ColumnType) -> Self {
        Self {
            column,
            column_type,
        }
    }
}

/// Build sort keys for `columns`, inferring each column's type or comparing
/// everything as strings.
pub fn sort_keys(table: &Table, columns: &[usize], infer: bool) -> Vec<SortKey> {
    columns
        .iter()
        .map(|&column| {
            let column_type = if infer {
                table.infer_type(column)
            } else {
                ColumnType::String
            };
            SortKey::new(column, column_type)
        })
        .collect()
}

/// Read a cell as a sort value under its key's type.
///
/// Only numeric and temporal keys are parsed; every other type compares as
/// the raw string.
fn sort_value<'a>(raw: &'a str, key: &SortKey, row: usize) -> Result<CellValue<'a>> {
    if raw.is_empty() {
        return Ok(CellValue::Null);
    }
    let parsed = match key.column_type {
        ColumnType::Int | ColumnType::Float | ColumnType::Date | ColumnType::Datetime => {
            CellValue::parse(raw, key.column_type)
        }
        ColumnType::Null | ColumnType::Boolean | ColumnType::String => {
            Some(CellValue::String(raw))
        }
    };
    parsed.ok_or_else(|| TableError::CellParse {
        column: key.column,
        row,
        value: raw.to_string(),
        expected: key.column_type,
    })
}

/// Compute the stable sorted order of row positions.
///
/// Every key cell is parsed up front, so a cell that does not fit its key's
/// type fails the whole sort before any row moves.
pub fn sorted_order(table: &Table, keys: &[SortKey], reverse: bool) -> Result<Vec<usize>> {
    let decorated = table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            keys.iter()
                .map(|key| sort_value(&row[key.column], key, i + 1))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let mut order: Vec<usize> = (0..table.row_count()).collect();
    order.sort_by(|&a, &b| {
        let ordering = compare_keys(&decorated[a], &decorated[b]);
        if reverse {
            ordering.reverse()
        } else {
            ordering
        }
    });
    Ok(order)
}

/// Key-by-key comparison; the first differing key decides
fn compare_keys(a: &[CellValue<'_>], b: &[CellValue<'_>]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| x.cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Sort a table's rows in place.
///
/// Rows whose key tuples are equal keep their input order, in both
/// directions.
pub fn sort_table(table: &mut Table, keys: &[SortKey], reverse: bool) -> Result<()> {
    let order = sorted_order(table, keys, reverse)?;
    let mut previous: Vec<Row> = std::mem::take(&mut table.rows);
    table.rows = order
        .into_iter()
        .map(|i| std::mem::take(&mut previous[i]))
        .collect();
    debug!(rows = table.row_count(), keys = keys.len(), reverse, "sorted table");
    Ok(())
}

impl Table {
    /// Sort by the given columns, inferring their types unless `infer` is off
    pub fn sort_by_columns(&mut self, columns: &[usize], infer: bool, reverse: bool) -> Result<()> {
        let keys = sort_keys(self, columns, infer);
        sort_table(self, &keys, reverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(values: &[&str]) -> Row {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn simple_sort_table() -> Table {
        Table::new(
            row(&["Number", "String"]),
            vec![
                row(&["1", "One"]),
                row(&["2", "Two"]),
                row(&["-1", "Minus One"]),
                row(&["2", "Another Two"]),
            ],
        )
        .unwrap()
    }

    fn second_column(table: &Table) -> Vec<&str> {
        table.column_values(1).collect()
    }

    #[test]
    fn test_sort_by_number_is_stable() {
        let mut table = simple_sort_table();
        table.sort_by_columns(&[0], true, false).unwrap();
        assert_eq!(
            second_column(&table),
            vec!["Minus One", "One", "Two", "Another Two"]
        );
    }

    #[test]
    fn test_reverse_keeps_tie_order() {
        let mut table = simple_sort_table();
        table.sort_by_columns(&[0], true, true).unwrap();
        assert_eq!(
            second_column(&table),
            vec!["Two", "Another Two", "One", "Minus One"]
        );
    }

    #[test]
    fn test_sort_by_string_column() {
        let mut table = simple_sort_table();
        table.sort_by_columns(&[1], true, false).unwrap();
        assert_eq!(
            second_column(&table),
            vec!["Another Two", "Minus One", "One", "Two"]
        );
    }

    #[test]
    fn test_multi_key_reverse_without_inference() {
        let mut table = simple_sort_table();
        table.sort_by_columns(&[0, 1], false, true).unwrap();
        assert_eq!(
            second_column(&table),
            vec!["Two", "Another Two", "One", "Minus One"]
        );
    }

    #[test]
    fn test_numeric_versus_string_order() {
        let rows = vec![row(&["10"]), row(&["9"]), row(&["100"])];
        let mut inferred = Table::new(row(&["n"]), rows.clone()).unwrap();
        inferred.sort_by_columns(&[0], true, false).unwrap();
        assert_eq!(inferred.column_values(0).collect::<Vec<_>>(), vec!["9", "10", "100"]);

        let mut forced = Table::new(row(&["n"]), rows).unwrap();
        forced.sort_by_columns(&[0], false, false).unwrap();
        assert_eq!(forced.column_values(0).collect::<Vec<_>>(), vec!["10", "100", "9"]);
    }

    #[test]
    fn test_nulls_sort_first() {
        let mut table = Table::new(
            row(&["when"]),
            vec![
                row(&["2023-03-01"]),
                row(&[""]),
                row(&["2023-1-15"]),
                row(&[""]),
            ],
        )
        .unwrap();
        table.sort_by_columns(&[0], true, false).unwrap();
        assert_eq!(
            table.column_values(0).collect::<Vec<_>>(),
            vec!["", "", "2023-1-15", "2023-03-01"]
        );
    }

    #[test]
    fn test_datetime_column_mixes_dates() {
        let mut table = Table::new(
            row(&["t"]),
            vec![
                row(&["2023-01-02 08:00:00"]),
                row(&["2023-01-02"]),
                row(&["2023-01-01T23:00:00Z"]),
            ],
        )
        .unwrap();
        table.sort_by_columns(&[0], true, false).unwrap();
        assert_eq!(
            table.column_values(0).collect::<Vec<_>>(),
            vec!["2023-01-01T23:00:00Z", "2023-01-02", "2023-01-02 08:00:00"]
        );
    }

    #[test]
    fn test_sort_multibyte_strings() {
        let mut table = Table::new(
            row(&["city"]),
            vec![row(&["Zürich"]), row(&["Ελλάδα"]), row(&["aé"]), row(&["Bern"])],
        )
        .unwrap();
        table.sort_by_columns(&[0], true, false).unwrap();
        assert_eq!(
            table.column_values(0).collect::<Vec<_>>(),
            vec!["Bern", "Zürich", "aé", "Ελλάδα"]
        );
    }

    #[test]
    fn test_forced_type_mismatch_is_fatal() {
        let mut table = simple_sort_table();
        let keys = [SortKey::new(1, ColumnType::Int)];
        let err = sort_table(&mut table, &keys, false).unwrap_err();
        assert!(matches!(
            err,
            TableError::CellParse { column: 1, row: 1, expected: ColumnType::Int, .. }
        ));
        // nothing moved
        assert_eq!(table, simple_sort_table());
    }

    fn small_rows() -> impl Strategy<Value = Vec<(i8, u8)>> {
        prop::collection::vec((-3i8..3, 0u8..4), 0..20)
    }

    fn table_from(rows: &[(i8, u8)]) -> Table {
        Table::new(
            row(&["k", "seq"]),
            rows.iter()
                .enumerate()
                .map(|(i, (k, tag))| vec![k.to_string(), format!("{}-{}", tag, i)])
                .collect(),
        )
        .unwrap()
    }

    proptest! {
        #[test]
        fn prop_sort_is_idempotent(rows in small_rows(), reverse in any::<bool>()) {
            let mut once = table_from(&rows);
            once.sort_by_columns(&[0], true, reverse).unwrap();
            let mut twice = once.clone();
            twice.sort_by_columns(&[0], true, reverse).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_sort_is_stable(rows in small_rows(), reverse in any::<bool>()) {
            let mut table = table_from(&rows);
            table.sort_by_columns(&[0], true, reverse).unwrap();
            // within a run of equal keys the original positions stay increasing
            let positions: Vec<(i64, usize)> = table
                .rows()
                .iter()
                .map(|r| {
                    let pos = r[1].rsplit('-').next().unwrap().parse().unwrap();
                    (r[0].parse().unwrap(), pos)
                })
                .collect();
            for pair in positions.windows(2) {
                if pair[0].0 == pair[1].0 {
                    prop_assert!(pair[0].1 < pair[1].1);
                } else if reverse {
                    prop_assert!(pair[0].0 > pair[1].0);
                } else {
                    prop_assert!(pair[0].0 < pair[1].0);
                }
            }
        }
    }
}
