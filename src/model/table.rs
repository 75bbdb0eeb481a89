//! The in-memory table

use tracing::debug;

use crate::error::{Result, TableError};
use crate::parser::RowStream;

use super::schema::{infer_column, Column, ColumnType};

/// A row is an ordered sequence of string cells
pub type Row = Vec<String>;

/// A fully materialized header and row sequence.
///
/// Built once from a complete read of a row source. Sorting reorders the rows
/// in place; indexing, inference and statistics only read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    header: Row,
    pub(crate) rows: Vec<Row>,
}

impl Table {
    /// Build a table from a header and a fully materialized row list
    pub fn new(header: Row, rows: Vec<Row>) -> Result<Self> {
        Self::from_rows(header, rows.into_iter().map(Ok))
    }

    /// Consume a row iterator completely.
    ///
    /// Every row must be exactly as wide as the header.
    pub fn from_rows<I>(header: Row, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<Row>>,
    {
        let expected = header.len();
        let mut collected = Vec::new();
        for (i, row) in rows.into_iter().enumerate() {
            let row = row?;
            if row.len() != expected {
                return Err(TableError::RaggedRow {
                    row: i + 1,
                    found: row.len(),
                    expected,
                });
            }
            collected.push(row);
        }
        debug!(rows = collected.len(), columns = expected, "materialized table");
        Ok(Self {
            header,
            rows: collected,
        })
    }

    /// Materialize a decoded row stream
    pub fn from_stream(stream: RowStream<'_>) -> Result<Self> {
        let RowStream { header, rows, .. } = stream;
        Self::from_rows(header, rows)
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Lazily iterate one column's cells, top to bottom
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[column].as_str())
    }

    /// Infer the type of one column
    pub fn infer_type(&self, column: usize) -> ColumnType {
        infer_column(self.column_values(column))
    }

    /// Column metadata with inferred types, in header order
    pub fn columns(&self) -> Vec<Column> {
        self.header
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(name.clone(), i, self.infer_type(i)))
            .collect()
    }

    /// Resolve a single column reference
    pub fn resolve_column(&self, spec: &str) -> Result<usize> {
        resolve_column(&self.header, spec)
    }

    /// Resolve a list of column references
    pub fn resolve_columns<S: AsRef<str>>(&self, specs: &[S]) -> Result<Vec<usize>> {
        resolve_columns(&self.header, specs)
    }
}

/// Resolve one column reference to the header positions it names.
///
/// A reference is, in order of precedence, a 1-based column number, a
/// 1-based range `a-b` (either bound may be omitted), or a header name. A
/// name matches every column that carries it.
pub fn resolve_column_spec(header: &[String], spec: &str) -> Result<Vec<usize>> {
    if spec.is_empty() {
        return Err(TableError::InvalidColumnSpec(spec.to_string()));
    }

    let width = header.len();
    if let Ok(n) = spec.parse::<usize>() {
        if n >= 1 && n <= width {
            return Ok(vec![n - 1]);
        }
    }

    if let Some((lo, hi)) = spec.split_once('-') {
        let lo = if lo.is_empty() { Ok(1) } else { lo.parse::<usize>() };
        let hi = if hi.is_empty() { Ok(width) } else { hi.parse::<usize>() };
        if let (Ok(lo), Ok(hi)) = (lo, hi) {
            let (min, max) = (lo.min(hi), lo.max(hi));
            if min >= 1 && max <= width {
                let ascending = (min - 1..max).collect::<Vec<_>>();
                return Ok(if lo <= hi {
                    ascending
                } else {
                    ascending.into_iter().rev().collect()
                });
            }
        }
    }

    let matches: Vec<usize> = header
        .iter()
        .enumerate()
        .filter(|(_, name)| name.as_str() == spec)
        .map(|(i, _)| i)
        .collect();
    if matches.is_empty() {
        return Err(TableError::ColumnNotFound(spec.to_string()));
    }
    Ok(matches)
}

/// Resolve a reference that must name a single column; the first match wins
pub fn resolve_column(header: &[String], spec: &str) -> Result<usize> {
    let indices = resolve_column_spec(header, spec)?;
    indices
        .first()
        .copied()
        .ok_or_else(|| TableError::ColumnNotFound(spec.to_string()))
}

/// Resolve and concatenate several references
pub fn resolve_columns<S: AsRef<str>>(header: &[String], specs: &[S]) -> Result<Vec<usize>> {
    let mut indices = Vec::new();
    for spec in specs {
        indices.extend(resolve_column_spec(header, spec.as_ref())?);
    }
    Ok(indices)
}
