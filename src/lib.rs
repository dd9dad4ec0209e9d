//! regcheck - snapshot regression testing for tabular data pipelines
//!
//! A [`RegressionPackage`] re-runs an extraction routine over a fixed raw
//! input and compares the result with a stored, previously approved
//! snapshot. Any difference in columns, row count, declared types or cell
//! values is reported as a distinct [`RegressionError`].

pub mod config;
pub mod confirm;
pub mod diff;
pub mod error;
pub mod extract;
pub mod model;
pub mod package;
pub mod parser;
pub mod warning;
pub mod writer;

pub use config::PackageConfig;
pub use diff::{compare, compare_schemas, TableComparator};
pub use error::{RegressionError, Result};
pub use extract::Extractor;
pub use model::{CellValue, DataType, Schema, Table};
pub use package::{OverwriteOutcome, RegressionPackage};
pub use warning::{Warning, WarningSink};
