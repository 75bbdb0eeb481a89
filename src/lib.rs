//! csvtab - Typed in-memory tables over delimited text
//!
//! Loads CSV/TSV input into a header plus string rows, infers a type for each
//! column, and provides sorting, joins, deduplication, sampling and
//! per-column statistics on top of it.

pub mod config;
pub mod error;
pub mod index;
pub mod join;
pub mod model;
pub mod output;
pub mod parser;
pub mod sample;
pub mod sort;
pub mod stats;
pub mod unique;

pub use config::Config;
pub use error::{Result, TableError};
pub use model::{CellValue, Column, ColumnType, Row, Table};
pub use parser::RowStream;
