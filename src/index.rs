//! Value-to-row-position index over one table column

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::model::{Row, Table};

/// Maps each distinct cell value of one column to the positions of the rows
/// holding it, in table order.
///
/// Borrows the table it was built from, so it cannot outlive or observe a
/// reordering of that table.
#[derive(Debug)]
pub struct ColumnIndex<'t> {
    table: &'t Table,
    column: usize,
    positions: FxHashMap<&'t str, Vec<usize>>,
}

impl<'t> ColumnIndex<'t> {
    /// Build the index in a single pass over the column
    pub fn build(table: &'t Table, column: usize) -> Self {
        let mut positions: FxHashMap<&'t str, Vec<usize>> = FxHashMap::default();
        for (i, value) in table.column_values(column).enumerate() {
            positions.entry(value).or_default().push(i);
        }
        debug!(
            column,
            distinct = positions.len(),
            rows = table.row_count(),
            "built column index"
        );
        Self {
            table,
            column,
            positions,
        }
    }

    /// The indexed column
    pub fn column(&self) -> usize {
        self.column
    }

    pub fn table(&self) -> &'t Table {
        self.table
    }

    /// Number of distinct values in the column
    pub fn distinct_values(&self) -> usize {
        self.positions.len()
    }

    /// Positions of rows whose indexed cell equals `value`; empty when unseen
    pub fn row_positions(&self, value: &str) -> &[usize] {
        self.positions.get(value).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rows whose indexed cell equals `value`, in table order
    pub fn matching_rows<'s>(&'s self, value: &str) -> impl Iterator<Item = &'t Row> + 's {
        let table = self.table;
        self.row_positions(value)
            .iter()
            .filter_map(move |&i| table.row(i))
    }
}

impl Table {
    /// Index one column of this table
    pub fn index_column(&self, column: usize) -> ColumnIndex<'_> {
        ColumnIndex::build(self, column)
    }
}
