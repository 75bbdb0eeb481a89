//! Plain-text report format

use std::fmt::Display;
use std::io::Write;

use crate::error::Result;
use crate::model::Column;
use crate::stats::{ColumnStats, Summary, ValueCount};

use super::ReportRenderer;

/// Line-oriented report renderer
pub struct TextReport;

impl TextReport {
    pub fn new() -> Self {
        Self
    }

    fn write_column(&self, stats: &ColumnStats, writer: &mut dyn Write) -> Result<()> {
        writeln!(writer, "{}. {}", stats.index + 1, stats.name)?;
        writeln!(writer, "  Type: {}", stats.column_type)?;
        writeln!(writer, "  Number NULL: {}", stats.null_count)?;

        match &stats.summary {
            Summary::Null => {}
            Summary::Int(s) => {
                writeln!(writer, "  Min: {}", s.min)?;
                writeln!(writer, "  Max: {}", s.max)?;
                writeln!(writer, "  Sum: {}", s.sum)?;
                write_moments(s.mean, s.median, s.stdev, writer)?;
                writeln!(writer, "  Unique values: {}", s.unique_values)?;
                write_frequent(&s.most_frequent, |v| v.to_string(), writer)?;
            }
            Summary::Float(s) => {
                writeln!(writer, "  Min: {:.6}", s.min)?;
                writeln!(writer, "  Max: {:.6}", s.max)?;
                writeln!(writer, "  Sum: {:.6}", s.sum)?;
                write_moments(s.mean, s.median, s.stdev, writer)?;
                writeln!(writer, "  Unique values: {}", s.unique_values)?;
                write_frequent(&s.most_frequent, |v| format!("{:.6}", v), writer)?;
            }
            Summary::Boolean(s) => {
                writeln!(writer, "  Number TRUE: {}", s.true_count)?;
                writeln!(writer, "  Number FALSE: {}", s.false_count)?;
            }
            Summary::Temporal(s) => {
                writeln!(writer, "  Min: {}", s.min)?;
                writeln!(writer, "  Max: {}", s.max)?;
                writeln!(writer, "  Unique values: {}", s.unique_values)?;
                write_frequent(&s.most_frequent, |v| v.clone(), writer)?;
            }
            Summary::String(s) => {
                writeln!(writer, "  Unique values: {}", s.unique_values)?;
                writeln!(writer, "  Max length: {}", s.max_length)?;
                write_frequent(&s.most_frequent, |v| v.clone(), writer)?;
            }
        }
        Ok(())
    }
}

impl Default for TextReport {
    fn default() -> Self {
        Self::new()
    }
}

fn write_moments(mean: f64, median: f64, stdev: f64, writer: &mut dyn Write) -> Result<()> {
    writeln!(writer, "  Mean: {:.6}", mean)?;
    writeln!(writer, "  Median: {:.6}", median)?;
    writeln!(writer, "  Standard Deviation: {:.6}", stdev)?;
    Ok(())
}

fn write_frequent<T, F, D>(counts: &[ValueCount<T>], label: F, writer: &mut dyn Write) -> Result<()>
where
    F: Fn(&T) -> D,
    D: Display,
{
    writeln!(writer, "  {} most frequent values:", counts.len())?;
    for vc in counts {
        writeln!(writer, "      {}: {}", label(&vc.value), vc.count)?;
    }
    Ok(())
}

fn write_dimensions(row_count: usize, column_count: usize, writer: &mut dyn Write) -> Result<()> {
    writeln!(writer, "Dimensions:")?;
    writeln!(writer, "  Rows: {}", row_count)?;
    writeln!(writer, "  Columns: {}", column_count)?;
    Ok(())
}

impl ReportRenderer for TextReport {
    fn render_stats(
        &self,
        stats: &[ColumnStats],
        row_count: usize,
        writer: &mut dyn Write,
    ) -> Result<()> {
        for column in stats {
            self.write_column(column, writer)?;
        }
        writeln!(writer, "Number of rows: {}", row_count)?;
        Ok(())
    }

    fn render_describe(
        &self,
        columns: &[Column],
        row_count: usize,
        writer: &mut dyn Write,
    ) -> Result<()> {
        write_dimensions(row_count, columns.len(), writer)?;
        writeln!(writer, "Columns:")?;
        for column in columns {
            writeln!(writer, "  {}: {}", column.index + 1, column.name)?;
            writeln!(writer, "    Type: {}", column.column_type)?;
        }
        Ok(())
    }

    fn render_dimensions(
        &self,
        row_count: usize,
        column_count: usize,
        writer: &mut dyn Write,
    ) -> Result<()> {
        write_dimensions(row_count, column_count, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Table;
    use crate::stats::describe;

    fn table() -> Table {
        let rows = [["1", "One", "t"], ["2", "Two", "f"], ["-1", "Minus One", ""], ["2", "Another Two", "t"]];
        Table::new(
            vec!["Number".to_string(), "String".to_string(), "Flag".to_string()],
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn render(f: impl FnOnce(&TextReport, &mut Vec<u8>)) -> String {
        let mut out = Vec::new();
        f(&TextReport::new(), &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_stats_layout() {
        let table = table();
        let stats = table.stats().unwrap();
        let out = render(|r, w| r.render_stats(&stats, table.row_count(), w).unwrap());
        let expected = "\
1. Number
  Type: int
  Number NULL: 0
  Min: -1
  Max: 2
  Sum: 4
  Mean: 1.000000
  Median: 1.500000
  Standard Deviation: 1.414214
  Unique values: 3
  3 most frequent values:
      2: 2
      1: 1
      -1: 1
2. String
  Type: string
  Number NULL: 0
  Unique values: 4
  Max length: 11
  4 most frequent values:
      One: 1
      Two: 1
      Minus One: 1
      Another Two: 1
3. Flag
  Type: boolean
  Number NULL: 1
  Number TRUE: 2
  Number FALSE: 1
Number of rows: 4
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_describe_layout() {
        let table = table();
        let columns = describe(&table);
        let out = render(|r, w| r.render_describe(&columns, table.row_count(), w).unwrap());
        assert!(out.starts_with("Dimensions:\n  Rows: 4\n  Columns: 3\nColumns:\n"));
        assert!(out.contains("  1: Number\n    Type: int\n"));
        assert!(out.ends_with("  3: Flag\n    Type: boolean\n"));
    }

    #[test]
    fn test_dimensions_layout() {
        let out = render(|r, w| r.render_dimensions(10, 2, w).unwrap());
        assert_eq!(out, "Dimensions:\n  Rows: 10\n  Columns: 2\n");
    }
}
