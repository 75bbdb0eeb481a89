//! JSON report format

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::model::Column;
use crate::stats::ColumnStats;

use super::ReportRenderer;

/// JSON report renderer
pub struct JsonReport {
    pretty: bool,
}

impl JsonReport {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    fn write<T: Serialize>(&self, value: &T, writer: &mut dyn Write) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, value)?;
        } else {
            serde_json::to_writer(&mut *writer, value)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

impl Default for JsonReport {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonDimensions {
    rows: usize,
    columns: usize,
}

#[derive(Serialize)]
struct JsonStatsReport<'a> {
    rows: usize,
    columns: &'a [ColumnStats],
}

#[derive(Serialize)]
struct JsonDescribeReport<'a> {
    dimensions: JsonDimensions,
    columns: &'a [Column],
}

impl ReportRenderer for JsonReport {
    fn render_stats(
        &self,
        stats: &[ColumnStats],
        row_count: usize,
        writer: &mut dyn Write,
    ) -> Result<()> {
        self.write(
            &JsonStatsReport {
                rows: row_count,
                columns: stats,
            },
            writer,
        )
    }

    fn render_describe(
        &self,
        columns: &[Column],
        row_count: usize,
        writer: &mut dyn Write,
    ) -> Result<()> {
        self.write(
            &JsonDescribeReport {
                dimensions: JsonDimensions {
                    rows: row_count,
                    columns: columns.len(),
                },
                columns,
            },
            writer,
        )
    }

    fn render_dimensions(
        &self,
        row_count: usize,
        column_count: usize,
        writer: &mut dyn Write,
    ) -> Result<()> {
        self.write(
            &JsonDimensions {
                rows: row_count,
                columns: column_count,
            },
            writer,
        )
    }
}
