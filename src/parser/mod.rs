//! Input layer: decodes delimited text into a header and a row stream

mod csv;

use crate::error::Result;
use crate::model::Row;

pub use self::csv::{delimiter_for_path, CsvSource};

/// A decoded header plus a one-shot row iterator.
///
/// This is the only shape the table engine consumes; files, delimiters and
/// byte-order marks are handled before a stream is built.
pub struct RowStream<'a> {
    /// Column names
    pub header: Row,
    /// Remaining data rows
    pub rows: Box<dyn Iterator<Item = Result<Row>> + 'a>,
    /// Whether the source began with a UTF-8 byte-order mark
    pub has_bom: bool,
}

impl<'a> RowStream<'a> {
    pub fn new<I>(header: Row, rows: I) -> Self
    where
        I: Iterator<Item = Result<Row>> + 'a,
    {
        Self {
            header,
            rows: Box::new(rows),
            has_bom: false,
        }
    }

    /// Stream over an already materialized row list
    pub fn from_rows(header: Row, rows: Vec<Row>) -> RowStream<'static> {
        RowStream::new(header, rows.into_iter().map(Ok))
    }

    pub fn with_bom(mut self, has_bom: bool) -> Self {
        self.has_bom = has_bom;
        self
    }
}

impl std::fmt::Debug for RowStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStream")
            .field("header", &self.header)
            .field("has_bom", &self.has_bom)
            .finish_non_exhaustive()
    }
}
