//! Data model for the in-memory table engine

mod schema;
mod table;
mod value;

pub use schema::{infer_column, Column, ColumnType};
pub use table::{resolve_column, resolve_column_spec, resolve_columns, Row, Table};
pub use value::{
    format_datetime, parse_bool, parse_date, parse_datetime, parse_float, parse_int, CellValue,
    DATE_OUTPUT_FORMAT,
};
