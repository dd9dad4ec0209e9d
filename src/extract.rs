//! Extraction routines: raw input to table

use std::path::Path;

use anyhow::{bail, Result};

use crate::model::Table;
use crate::parser::{CsvParser, Parser};

/// Turns a raw input file into a table.
///
/// Implemented for any `Fn(&Path) -> anyhow::Result<Table>`, so a closure or
/// plain function can be passed straight to a package.
pub trait Extractor {
    fn extract(&self, raw_input: &Path) -> Result<Table>;
}

impl<F> Extractor for F
where
    F: Fn(&Path) -> Result<Table>,
{
    fn extract(&self, raw_input: &Path) -> Result<Table> {
        self(raw_input)
    }
}

/// Reads an uncompressed delimited text file with a header row.
#[derive(Debug, Clone, Copy)]
pub struct CsvExtractor {
    parser: CsvParser,
}

impl CsvExtractor {
    pub fn new(delimiter: u8) -> Self {
        Self {
            parser: CsvParser::with_delimiter(delimiter),
        }
    }
}

impl Default for CsvExtractor {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl Extractor for CsvExtractor {
    fn extract(&self, raw_input: &Path) -> Result<Table> {
        if crate::parser::extension(raw_input) == "gz" {
            bail!(
                "Compressed raw input {} needs a custom extractor",
                raw_input.display()
            );
        }
        self.parser.parse(raw_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, DataType};

    #[test]
    fn test_closure_is_an_extractor() {
        let extractor = |_: &Path| -> Result<Table> {
            Table::from_columns(vec![("x", DataType::Int64, vec![CellValue::Int(1)])])
        };
        let table = extractor.extract(Path::new("unused")).unwrap();
        assert_eq!(table.shape(), (1, 1));
    }

    #[test]
    fn test_csv_extractor_rejects_gzip() {
        let err = CsvExtractor::default()
            .extract(Path::new("raw.txt.gz"))
            .unwrap_err();
        assert!(err.to_string().contains("custom extractor"));
    }
}
