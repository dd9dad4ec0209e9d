//! CSV table writer

use std::path::Path;

use anyhow::{Context, Result};

use crate::model::Table;

use super::TableWriter;

/// Writes a header row followed by every row; nulls become empty fields.
pub struct CsvWriter;

impl TableWriter for CsvWriter {
    fn write(&self, table: &Table, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

        writer.write_record(table.column_names())?;
        for row in &table.rows {
            writer.write_record(row.cells.iter().map(|cell| {
                if cell.is_null() {
                    String::new()
                } else {
                    cell.display().into_owned()
                }
            }))?;
        }

        writer.flush()?;
        Ok(())
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv")
    }
}
