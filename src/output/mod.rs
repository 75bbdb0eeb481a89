//! Output layer: row sinks and report renderers

mod json;
mod text;

use std::io::Write;

use crate::config::{Config, ReportFormat};
use crate::error::Result;
use crate::model::{Column, Row};
use crate::stats::ColumnStats;

pub use json::JsonReport;
pub use text::TextReport;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Destination for result rows (header first, then data)
pub trait RowSink {
    fn write_row(&mut self, row: &[String]) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Collects rows in memory
impl RowSink for Vec<Row> {
    fn write_row(&mut self, row: &[String]) -> Result<()> {
        self.push(row.to_vec());
        Ok(())
    }
}

impl<S: RowSink + ?Sized> RowSink for &mut S {
    fn write_row(&mut self, row: &[String]) -> Result<()> {
        (**self).write_row(row)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Encodes rows as delimited text.
///
/// When the input carried a byte-order mark, it is written back in front of
/// the first row.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    write_bom: bool,
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W, delimiter: u8) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .delimiter(delimiter)
                .flexible(true)
                .from_writer(inner),
            write_bom: false,
        }
    }

    pub fn from_config(inner: W, config: &Config) -> Self {
        Self::new(inner, config.output_delimiter)
    }

    pub fn with_bom(mut self, write_bom: bool) -> Self {
        self.write_bom = write_bom;
        self
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| crate::error::TableError::Io(e.into_error()))
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn write_row(&mut self, row: &[String]) -> Result<()> {
        if self.write_bom {
            self.write_bom = false;
            // nothing is buffered yet, so these bytes lead the output
            self.writer.get_mut().write_all(UTF8_BOM)?;
        }
        self.writer.write_record(row)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Renders report-style command output
pub trait ReportRenderer {
    /// Per-column statistics followed by the row count
    fn render_stats(
        &self,
        stats: &[ColumnStats],
        row_count: usize,
        writer: &mut dyn Write,
    ) -> Result<()>;

    /// Dimensions and per-column types
    fn render_describe(
        &self,
        columns: &[Column],
        row_count: usize,
        writer: &mut dyn Write,
    ) -> Result<()>;

    /// Row and column counts
    fn render_dimensions(
        &self,
        row_count: usize,
        column_count: usize,
        writer: &mut dyn Write,
    ) -> Result<()>;
}

/// Factory for report renderers
pub struct ReportFactory;

impl ReportFactory {
    pub fn create(format: ReportFormat) -> Box<dyn ReportRenderer> {
        match format {
            ReportFormat::Text => Box::new(TextReport::new()),
            ReportFormat::Json => Box::new(JsonReport::new()),
        }
    }
}
