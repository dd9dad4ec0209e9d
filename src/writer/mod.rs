//! Writer layer: persists tables

mod csv;
mod parquet;

use std::path::Path;

use anyhow::{bail, Result};

use crate::model::Table;
use crate::parser::extension;

pub use self::csv::CsvWriter;
pub use self::parquet::ParquetWriter;

/// Trait for writing tables to files
pub trait TableWriter: Send + Sync {
    /// Write `table` to `path`, replacing any existing file
    fn write(&self, table: &Table, path: &Path) -> Result<()>;

    /// Check if this writer can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for picking a writer based on file extension
pub struct WriterFactory {
    writers: Vec<Box<dyn TableWriter>>,
}

impl Default for WriterFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl WriterFactory {
    pub fn new() -> Self {
        Self {
            writers: vec![Box::new(ParquetWriter), Box::new(CsvWriter)],
        }
    }

    pub fn get_writer(&self, path: &Path) -> Result<&dyn TableWriter> {
        let ext = extension(path);
        for writer in &self.writers {
            if writer.supports_extension(&ext) {
                return Ok(writer.as_ref());
            }
        }

        bail!("Unsupported table format: {}", path.display())
    }

    pub fn write(&self, table: &Table, path: &Path) -> Result<()> {
        self.get_writer(path)?.write(table, path)
    }
}
