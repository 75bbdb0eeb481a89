//! Row deduplication over a set of key columns

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};
use tracing::debug;

use crate::error::Result;
use crate::model::{resolve_columns, Row};
use crate::output::RowSink;
use crate::parser::RowStream;

/// Name of the column appended when counting duplicates
pub const COUNT_COLUMN: &str = "Count";

/// How duplicates are found and reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniqueOptions {
    /// Input is already grouped: only adjacent rows are compared, and rows
    /// are streamed without holding the table in memory
    pub sorted: bool,
    /// Append a `Count` column with the size of each group
    pub count: bool,
}

fn key_of(row: &[String], columns: &[usize]) -> Vec<String> {
    columns.iter().map(|&c| row[c].clone()).collect()
}

fn same_key(a: &[String], b: &[String], columns: &[usize]) -> bool {
    columns.iter().all(|&c| a[c] == b[c])
}

fn with_count(mut row: Row, count: usize) -> Row {
    row.push(count.to_string());
    row
}

/// Keep the first row of each distinct key.
///
/// An empty `columns` list keys on every column. Returns the number of data
/// rows written.
pub fn unique<S: AsRef<str>>(
    stream: RowStream<'_>,
    columns: &[S],
    options: UniqueOptions,
    sink: &mut dyn RowSink,
) -> Result<usize> {
    let RowStream { header, rows, .. } = stream;
    let key_columns = if columns.is_empty() {
        (0..header.len()).collect()
    } else {
        resolve_columns(&header, columns)?
    };

    if options.count {
        let mut out_header = header.clone();
        out_header.push(COUNT_COLUMN.to_string());
        sink.write_row(&out_header)?;
    } else {
        sink.write_row(&header)?;
    }

    let written = match (options.sorted, options.count) {
        (true, false) => unique_sorted(rows, &key_columns, sink)?,
        (true, true) => unique_sorted_with_count(rows, &key_columns, sink)?,
        (false, false) => unique_unsorted(rows, &key_columns, sink)?,
        (false, true) => unique_unsorted_with_count(rows, &key_columns, sink)?,
    };
    sink.flush()?;
    debug!(rows = written, ?options, "unique complete");
    Ok(written)
}

fn unique_sorted(
    rows: impl Iterator<Item = Result<Row>>,
    columns: &[usize],
    sink: &mut dyn RowSink,
) -> Result<usize> {
    let mut last: Option<Row> = None;
    let mut written = 0;
    for row in rows {
        let row = row?;
        if last.as_ref().is_some_and(|prev| same_key(prev, &row, columns)) {
            continue;
        }
        sink.write_row(&row)?;
        written += 1;
        last = Some(row);
    }
    Ok(written)
}

fn unique_sorted_with_count(
    rows: impl Iterator<Item = Result<Row>>,
    columns: &[usize],
    sink: &mut dyn RowSink,
) -> Result<usize> {
    let mut run: Option<(Row, usize)> = None;
    let mut written = 0;
    for row in rows {
        let row = row?;
        let continues_run = run
            .as_ref()
            .is_some_and(|(first, _)| same_key(first, &row, columns));
        if continues_run {
            if let Some((_, n)) = run.as_mut() {
                *n += 1;
            }
        } else if let Some((first, n)) = run.replace((row, 1)) {
            sink.write_row(&with_count(first, n))?;
            written += 1;
        }
    }
    if let Some((first, n)) = run {
        sink.write_row(&with_count(first, n))?;
        written += 1;
    }
    Ok(written)
}

fn unique_unsorted(
    rows: impl Iterator<Item = Result<Row>>,
    columns: &[usize],
    sink: &mut dyn RowSink,
) -> Result<usize> {
    let mut seen: FxHashSet<Vec<String>> = FxHashSet::default();
    let mut written = 0;
    for row in rows {
        let row = row?;
        if seen.insert(key_of(&row, columns)) {
            sink.write_row(&row)?;
            written += 1;
        }
    }
    Ok(written)
}

/// Counts are only known at the end, so first rows are held until then
fn unique_unsorted_with_count(
    rows: impl Iterator<Item = Result<Row>>,
    columns: &[usize],
    sink: &mut dyn RowSink,
) -> Result<usize> {
    let mut groups: IndexMap<Vec<String>, (Row, usize), FxBuildHasher> = IndexMap::default();
    for row in rows {
        let row = row?;
        groups
            .entry(key_of(&row, columns))
            .and_modify(|(_, n)| *n += 1)
            .or_insert((row, 1));
    }
    let written = groups.len();
    for (_, (first, n)) in groups {
        sink.write_row(&with_count(first, n))?;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Row {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn simple_sort() -> RowStream<'static> {
        RowStream::from_rows(
            row(&["Number", "String"]),
            vec![
                row(&["1", "One"]),
                row(&["2", "Two"]),
                row(&["-1", "Minus One"]),
                row(&["2", "Another Two"]),
            ],
        )
    }

    fn run(columns: &[&str], sorted: bool, count: bool) -> Vec<Row> {
        let mut out: Vec<Row> = Vec::new();
        unique(simple_sort(), columns, UniqueOptions { sorted, count }, &mut out).unwrap();
        out
    }

    #[test]
    fn test_unsorted_by_one_column() {
        assert_eq!(
            run(&["Number"], false, false),
            vec![
                row(&["Number", "String"]),
                row(&["1", "One"]),
                row(&["2", "Two"]),
                row(&["-1", "Minus One"]),
            ]
        );
    }

    #[test]
    fn test_unsorted_by_all_columns_keeps_everything() {
        assert_eq!(run(&["Number", "String"], false, false).len(), 5);
        assert_eq!(run(&[], false, false).len(), 5);
    }

    #[test]
    fn test_sorted_only_compares_neighbours() {
        assert_eq!(run(&["Number"], true, false).len(), 5);
    }

    #[test]
    fn test_unsorted_with_count() {
        assert_eq!(
            run(&["Number"], false, true),
            vec![
                row(&["Number", "String", "Count"]),
                row(&["1", "One", "1"]),
                row(&["2", "Two", "2"]),
                row(&["-1", "Minus One", "1"]),
            ]
        );
    }

    #[test]
    fn test_sorted_with_count() {
        let stream = RowStream::from_rows(
            row(&["k"]),
            vec![row(&["a"]), row(&["a"]), row(&["b"]), row(&["a"])],
        );
        let mut out: Vec<Row> = Vec::new();
        let written = unique(
            stream,
            &["k"],
            UniqueOptions {
                sorted: true,
                count: true,
            },
            &mut out,
        )
        .unwrap();
        assert_eq!(written, 3);
        assert_eq!(
            out,
            vec![
                row(&["k", "Count"]),
                row(&["a", "2"]),
                row(&["b", "1"]),
                row(&["a", "1"]),
            ]
        );
    }

    #[test]
    fn test_unknown_column() {
        let mut out: Vec<Row> = Vec::new();
        assert!(unique(simple_sort(), &["Nope"], UniqueOptions::default(), &mut out).is_err());
    }
}
