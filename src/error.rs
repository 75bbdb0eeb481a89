//! Error types for csvtab

use thiserror::Error;

use crate::model::ColumnType;

/// Errors raised by the table engine and its read/write collaborators
#[derive(Error, Debug)]
pub enum TableError {
    /// A column reference matched nothing in the header
    #[error("Could not find header \"{0}\"")]
    ColumnNotFound(String),

    /// A column reference was empty or otherwise unusable
    #[error("Invalid column specification: {0}")]
    InvalidColumnSpec(String),

    /// Two or more options that cannot be combined
    #[error("Conflicting options: {0}")]
    ConflictingOptions(String),

    /// Sampling without replacement asked for more rows than exist
    #[error("Cannot sample {requested} rows without replacement from {available} rows")]
    SampleTooLarge { requested: usize, available: usize },

    /// Delimiter was not a single ASCII character
    #[error("Invalid delimiter: {0:?}")]
    InvalidDelimiter(String),

    /// Input had no header row
    #[error("Input is empty: no header row")]
    EmptyInput,

    /// A data row's width differs from the header
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// A cell could not be read as the type inferred for its whole column
    #[error("Column {column}, row {row}: cannot parse {value:?} as {expected}")]
    CellParse {
        column: usize,
        row: usize,
        value: String,
        expected: ColumnType,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, TableError>;
