//! Data model for tabular data representation

mod schema;
mod table;

pub use schema::{Column, DataType, Schema};
pub use table::{CellValue, Row, Table};
