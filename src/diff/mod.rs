//! Comparison engine for snapshot regression checks
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. column sets ([`RegressionError::ColumnsMismatch`])
//! 2. row counts ([`RegressionError::RowCountMismatch`])
//! 3. declared types ([`RegressionError::SchemaMismatch`], or a warning)
//! 4. cell values ([`RegressionError::ContentMismatch`], plus a diff artifact)

pub mod cell_diff;
mod export;
mod schema_diff;

use std::path::{Path, PathBuf};

use crate::error::{RegressionError, Result};
use crate::model::Table;
use crate::warning::{LogSink, WarningSink};

pub use cell_diff::{diff_cells, unequal_columns, CellMismatch};
pub use export::write_diff_artifact;
pub use schema_diff::{check_columns, compare_schemas};

/// Compares two named tables and exports a diff artifact on content mismatch.
pub struct TableComparator<'a> {
    name_a: String,
    name_b: String,
    diff_export_path: PathBuf,
    schema_diff_is_fatal: bool,
    sink: &'a dyn WarningSink,
}

impl<'a> TableComparator<'a> {
    /// Create a comparator. Schema differences are fatal and warnings go to
    /// the log unless configured otherwise.
    pub fn new(
        name_a: impl Into<String>,
        name_b: impl Into<String>,
        diff_export_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name_a: name_a.into(),
            name_b: name_b.into(),
            diff_export_path: diff_export_path.into(),
            schema_diff_is_fatal: true,
            sink: &LogSink,
        }
    }

    /// Whether declared-type differences fail the comparison
    pub fn with_schema_diff_fatal(mut self, fatal: bool) -> Self {
        self.schema_diff_is_fatal = fatal;
        self
    }

    /// Send non-fatal warnings to `sink`
    pub fn with_sink(mut self, sink: &'a dyn WarningSink) -> Self {
        self.sink = sink;
        self
    }

    /// Compare `a` against `b`. Returns `Ok(())` only if both tables are
    /// equal in columns, row count, (fatal) schema and every cell.
    pub fn compare(&self, a: &Table, b: &Table) -> Result<()> {
        let schema_a = a.schema();
        let schema_b = b.schema();

        check_columns(&schema_a, &schema_b, &self.name_a, &self.name_b)?;

        if a.row_count() != b.row_count() {
            return Err(RegressionError::RowCountMismatch {
                name_a: self.name_a.clone(),
                name_b: self.name_b.clone(),
                shape_a: a.shape(),
                shape_b: b.shape(),
            });
        }

        compare_schemas(
            &schema_a,
            &schema_b,
            &self.name_a,
            &self.name_b,
            self.schema_diff_is_fatal,
            self.sink,
        )?;

        let mismatches = diff_cells(a, b);
        if mismatches.is_empty() {
            log::debug!(
                "{} and {} are equal ({} rows, {} columns)",
                self.name_a,
                self.name_b,
                a.row_count(),
                a.column_count()
            );
            return Ok(());
        }

        let columns = unequal_columns(&mismatches);
        write_diff_artifact(&self.diff_export_path, &self.name_a, &self.name_b, &mismatches)?;

        Err(RegressionError::ContentMismatch {
            columns,
            diff_path: self.diff_export_path.clone(),
        })
    }
}

/// Convenience function: compare with warnings routed to the log
pub fn compare(
    a: &Table,
    name_a: &str,
    b: &Table,
    name_b: &str,
    diff_export_path: &Path,
    schema_diff_is_fatal: bool,
) -> Result<()> {
    TableComparator::new(name_a, name_b, diff_export_path)
        .with_schema_diff_fatal(schema_diff_is_fatal)
        .compare(a, b)
}
