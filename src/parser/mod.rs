//! Reader layer: turns files into tables

mod csv;
mod parquet;

use std::path::Path;

use anyhow::{bail, Result};

use crate::model::Table;

pub use self::csv::CsvParser;
pub use self::parquet::ParquetParser;

/// Trait for reading tabular data files
pub trait Parser: Send + Sync {
    /// Parse a file and return a Table
    fn parse(&self, path: &Path) -> Result<Table>;

    /// Check if this parser can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool;
}

/// Factory for picking a parser based on file extension
pub struct ParserFactory {
    parsers: Vec<Box<dyn Parser>>,
}

impl Default for ParserFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserFactory {
    /// Create a new parser factory with all supported parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(ParquetParser), Box::new(CsvParser::default())],
        }
    }

    /// Get a parser for the given file path
    pub fn get_parser(&self, path: &Path) -> Result<&dyn Parser> {
        let ext = extension(path);

        for parser in &self.parsers {
            if parser.supports_extension(&ext) {
                return Ok(parser.as_ref());
            }
        }

        bail!("Unsupported table format: {}", path.display())
    }

    /// Parse a file using the appropriate parser
    pub fn parse(&self, path: &Path) -> Result<Table> {
        let parser = self.get_parser(path)?;
        parser.parse(path)
    }
}

pub(crate) fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_selection() {
        let factory = ParserFactory::new();
        assert!(factory.get_parser(Path::new("processed.parquet")).is_ok());
        assert!(factory.get_parser(Path::new("snapshot.CSV")).is_ok());
        assert!(factory.get_parser(Path::new("raw.txt.gz")).is_err());
    }
}
