//! Equi-joins between two row sources
//!
//! One side is materialized and indexed on its join column (the probe side);
//! the other side is streamed row by row. Output columns are always the left
//! table's columns followed by the right table's.

use tracing::debug;

use crate::error::{Result, TableError};
use crate::index::ColumnIndex;
use crate::model::{resolve_column, Row, Table};
use crate::output::RowSink;
use crate::parser::RowStream;

/// Join types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    /// Rows with a match on both sides
    #[default]
    Inner,
    /// Every left row; unmatched ones padded with empty right cells
    Left,
    /// Every right row; unmatched ones padded with empty left cells
    Right,
    /// Every row of both sides
    Outer,
}

impl JoinKind {
    /// Pick a join kind from mutually exclusive flags
    pub fn from_flags(left: bool, right: bool, outer: bool) -> Result<Self> {
        match (left, right, outer) {
            (false, false, false) => Ok(JoinKind::Inner),
            (true, false, false) => Ok(JoinKind::Left),
            (false, true, false) => Ok(JoinKind::Right),
            (false, false, true) => Ok(JoinKind::Outer),
            _ => Err(TableError::ConflictingOptions(
                "specify at most one of --left, --right or --outer".to_string(),
            )),
        }
    }
}

/// Join column names for each side
#[derive(Debug, Clone)]
pub struct JoinColumns {
    pub left: String,
    pub right: String,
}

impl JoinColumns {
    /// The same column name on both sides
    pub fn same(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            left: name.clone(),
            right: name,
        }
    }

    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// Counts reported after a join
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JoinSummary {
    /// Data rows written (excluding the header)
    pub rows_emitted: usize,
    /// Streamed rows that found no match
    pub unmatched_streamed: usize,
    /// Probe-side rows appended by an outer join
    pub unmatched_probe: usize,
}

/// Join `left` and `right` on the given columns, writing the combined header
/// and then the joined rows to `sink`.
pub fn join(
    left: RowStream<'_>,
    right: RowStream<'_>,
    columns: &JoinColumns,
    kind: JoinKind,
    sink: &mut dyn RowSink,
) -> Result<JoinSummary> {
    let summary = match kind {
        JoinKind::Inner | JoinKind::Left | JoinKind::Outer => {
            let stream_column = resolve_column(&left.header, &columns.left)?;
            let probe = Table::from_stream(right)?;
            let probe_column = probe.resolve_column(&columns.right)?;
            let index = probe.index_column(probe_column);
            let joiner = Joiner {
                index: &index,
                stream_column,
                stream_width: left.header.len(),
                probe_is_left: false,
            };
            let keep_unmatched = kind != JoinKind::Inner;
            joiner.run(left, keep_unmatched, kind == JoinKind::Outer, sink)?
        }
        JoinKind::Right => {
            let stream_column = resolve_column(&right.header, &columns.right)?;
            let probe = Table::from_stream(left)?;
            let probe_column = probe.resolve_column(&columns.left)?;
            let index = probe.index_column(probe_column);
            let joiner = Joiner {
                index: &index,
                stream_column,
                stream_width: right.header.len(),
                probe_is_left: true,
            };
            joiner.run(right, true, false, sink)?
        }
    };
    sink.flush()?;
    debug!(?kind, rows = summary.rows_emitted, "join complete");
    Ok(summary)
}

/// Streams one side against the index of the other
struct Joiner<'i, 't> {
    index: &'i ColumnIndex<'t>,
    stream_column: usize,
    stream_width: usize,
    /// The probe table supplies the left half of each output row
    probe_is_left: bool,
}

impl Joiner<'_, '_> {
    fn combine(&self, streamed: &[String], probed: &[String]) -> Row {
        let (first, second) = if self.probe_is_left {
            (probed, streamed)
        } else {
            (streamed, probed)
        };
        let mut row = Vec::with_capacity(first.len() + second.len());
        row.extend_from_slice(first);
        row.extend_from_slice(second);
        row
    }

    fn run(
        &self,
        stream: RowStream<'_>,
        keep_unmatched: bool,
        append_unconsumed: bool,
        sink: &mut dyn RowSink,
    ) -> Result<JoinSummary> {
        let probe = self.index.table();
        let probe_blank = vec![String::new(); probe.column_count()];
        let stream_blank = vec![String::new(); self.stream_width];
        let mut consumed = vec![false; probe.row_count()];
        let mut summary = JoinSummary::default();

        sink.write_row(&self.combine(&stream.header, probe.header()))?;

        for (i, row) in stream.rows.enumerate() {
            let row = row?;
            let key = row
                .get(self.stream_column)
                .ok_or_else(|| TableError::RaggedRow {
                    row: i + 1,
                    found: row.len(),
                    expected: self.stream_width,
                })?;

            let positions = self.index.row_positions(key);
            if positions.is_empty() {
                summary.unmatched_streamed += 1;
                if keep_unmatched {
                    sink.write_row(&self.combine(&row, &probe_blank))?;
                    summary.rows_emitted += 1;
                }
                continue;
            }
            for &position in positions {
                consumed[position] = true;
                sink.write_row(&self.combine(&row, &probe.rows()[position]))?;
                summary.rows_emitted += 1;
            }
        }

        if append_unconsumed {
            for (position, probed) in probe.rows().iter().enumerate() {
                if consumed[position] {
                    continue;
                }
                // blank streamed half on the left, probe row on the right
                let mut row = stream_blank.clone();
                row.extend_from_slice(probed);
                sink.write_row(&row)?;
                summary.rows_emitted += 1;
                summary.unmatched_probe += 1;
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Row {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn stream(header: &[&str], rows: &[&[&str]]) -> RowStream<'static> {
        RowStream::from_rows(row(header), rows.iter().map(|r| row(r)).collect())
    }

    fn left() -> RowStream<'static> {
        stream(
            &["id", "l"],
            &[&["1", "a"], &["2", "b"], &["3", "c"], &["2", "d"]],
        )
    }

    fn right() -> RowStream<'static> {
        stream(&["id", "r"], &[&["1", "A"], &["2", "B"], &["2", "C"], &["9", "Z"]])
    }

    fn run(kind: JoinKind) -> (Vec<Row>, JoinSummary) {
        let mut out: Vec<Row> = Vec::new();
        let summary = join(left(), right(), &JoinColumns::same("id"), kind, &mut out).unwrap();
        (out, summary)
    }

    #[test]
    fn test_inner_join() {
        let (out, summary) = run(JoinKind::Inner);
        assert_eq!(
            out,
            vec![
                row(&["id", "l", "id", "r"]),
                row(&["1", "a", "1", "A"]),
                row(&["2", "b", "2", "B"]),
                row(&["2", "b", "2", "C"]),
                row(&["2", "d", "2", "B"]),
                row(&["2", "d", "2", "C"]),
            ]
        );
        // 1 + 2 + 0 + 2 matches across the streamed rows
        assert_eq!(summary.rows_emitted, 5);
        assert_eq!(summary.unmatched_streamed, 1);
    }

    #[test]
    fn test_left_join_pads_unmatched() {
        let (out, _) = run(JoinKind::Left);
        assert_eq!(out.len(), 7);
        assert_eq!(out[4], row(&["3", "c", "", ""]));
    }

    #[test]
    fn test_right_join_keeps_left_columns_first() {
        let (out, summary) = run(JoinKind::Right);
        assert_eq!(
            out,
            vec![
                row(&["id", "l", "id", "r"]),
                row(&["1", "a", "1", "A"]),
                row(&["2", "b", "2", "B"]),
                row(&["2", "d", "2", "B"]),
                row(&["2", "b", "2", "C"]),
                row(&["2", "d", "2", "C"]),
                row(&["", "", "9", "Z"]),
            ]
        );
        assert_eq!(summary.unmatched_streamed, 1);
    }

    #[test]
    fn test_outer_join_appends_unconsumed_probe_rows() {
        let (out, summary) = run(JoinKind::Outer);
        assert_eq!(out.len(), 1 + 6 + 1);
        assert_eq!(out.last().unwrap(), &row(&["", "", "9", "Z"]));
        assert_eq!(summary.unmatched_probe, 1);

        // every input row of both sides shows up
        for l in ["a", "b", "c", "d"] {
            assert!(out.iter().any(|r| r[1] == l));
        }
        for r in ["A", "B", "C", "Z"] {
            assert!(out.iter().any(|row| row[3] == r));
        }
    }

    #[test]
    fn test_different_column_names() {
        let left = stream(&["key", "v"], &[&["x", "1"]]);
        let right = stream(&["v2", "ref"], &[&["2", "x"]]);
        let mut out: Vec<Row> = Vec::new();
        join(
            left,
            right,
            &JoinColumns::new("key", "ref"),
            JoinKind::Inner,
            &mut out,
        )
        .unwrap();
        assert_eq!(out[1], row(&["x", "1", "2", "x"]));
    }

    #[test]
    fn test_missing_join_column() {
        let mut out: Vec<Row> = Vec::new();
        let err = join(
            left(),
            right(),
            &JoinColumns::same("nope"),
            JoinKind::Inner,
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, TableError::ColumnNotFound(name) if name == "nope"));
        assert!(out.is_empty());
    }

    #[test]
    fn test_conflicting_flags() {
        assert_eq!(JoinKind::from_flags(false, false, false).unwrap(), JoinKind::Inner);
        assert_eq!(JoinKind::from_flags(false, true, false).unwrap(), JoinKind::Right);
        assert!(matches!(
            JoinKind::from_flags(true, false, true),
            Err(TableError::ConflictingOptions(_))
        ));
    }
}
