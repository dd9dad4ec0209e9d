//! Delimited text parser

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::model::{CellValue, Column, DataType, Table};

use super::Parser;

/// Parser for CSV (or other single-byte delimited) files with a header row.
///
/// Column types are inferred from the text: every column gets the narrowest
/// of Boolean, Int64, Float64, Date, Datetime, String that fits all of its
/// non-empty values.
#[derive(Debug, Clone, Copy)]
pub struct CsvParser {
    delimiter: u8,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvParser {
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl Parser for CsvParser {
    fn parse(&self, path: &Path) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .context("Failed to read CSV headers")?
            .clone();
        let width = headers.len();

        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        for (line_num, result) in csv_reader.records().enumerate() {
            // +2 for 1-indexing and header
            let record = result.with_context(|| format!("Failed to read CSV row {}", line_num + 2))?;
            if record.len() > width {
                bail!(
                    "CSV row {} has {} fields, header has {}",
                    line_num + 2,
                    record.len(),
                    width
                );
            }
            let mut cells: Vec<String> = record.iter().map(|s| s.trim().to_string()).collect();
            cells.resize(width, String::new());
            raw_rows.push(cells);
        }

        let types: Vec<DataType> = (0..width)
            .map(|col| {
                raw_rows
                    .iter()
                    .map(|row| infer_type(&row[col]))
                    .fold(DataType::Null, DataType::widen)
            })
            .collect();

        let columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| Column::new(name.to_string(), i, types[i]))
            .collect();

        let mut table = Table::try_new(columns)
            .with_context(|| format!("Invalid CSV header in {}", path.display()))?;
        for row in raw_rows {
            let cells = row
                .iter()
                .zip(&types)
                .map(|(text, ty)| convert(text, *ty))
                .collect();
            table.add_row(cells);
        }

        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

fn is_null(s: &str) -> bool {
    s.is_empty() || s.eq_ignore_ascii_case("null") || s == "NA"
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_datetime(s: &str) -> Option<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// Narrowest type for a single text value
fn infer_type(s: &str) -> DataType {
    if is_null(s) {
        DataType::Null
    } else if parse_bool(s).is_some() {
        DataType::Boolean
    } else if s.parse::<i64>().is_ok() {
        DataType::Int64
    } else if s.parse::<f64>().is_ok() {
        DataType::Float64
    } else if chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok() {
        DataType::Date
    } else if parse_datetime(s).is_some() {
        DataType::Datetime
    } else {
        DataType::Utf8
    }
}

/// Convert text to a cell of the column's inferred type
fn convert(s: &str, data_type: DataType) -> CellValue {
    if is_null(s) {
        return CellValue::Null;
    }

    let value = match data_type {
        DataType::Boolean => parse_bool(s).map(CellValue::Bool),
        DataType::Int64 => s.parse::<i64>().ok().map(CellValue::Int),
        DataType::Float64 => s.parse::<f64>().ok().map(CellValue::Float),
        DataType::Date => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(CellValue::Date),
        DataType::Datetime => parse_datetime(s).or_else(|| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map(CellValue::DateTime),
        _ => None,
    };

    value.unwrap_or_else(|| CellValue::String(Cow::Owned(s.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_type() {
        assert_eq!(infer_type(""), DataType::Null);
        assert_eq!(infer_type("null"), DataType::Null);
        assert_eq!(infer_type("true"), DataType::Boolean);
        assert_eq!(infer_type("42"), DataType::Int64);
        assert_eq!(infer_type("3.14"), DataType::Float64);
        assert_eq!(infer_type("2024-01-31"), DataType::Date);
        assert_eq!(infer_type("2024-01-31 10:00:00"), DataType::Datetime);
        assert_eq!(infer_type("hello"), DataType::Utf8);
    }

    #[test]
    fn test_parse_widens_and_converts_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.txt");
        std::fs::write(&path, "id\tvalue\tlabel\n1\t1\ta\n2\t2.5\t3\n3\t\tc\n").unwrap();

        let table = CsvParser::with_delimiter(b'\t').parse(&path).unwrap();

        assert_eq!(table.shape(), (3, 3));
        assert_eq!(table.column("id").unwrap().data_type, DataType::Int64);
        assert_eq!(table.column("value").unwrap().data_type, DataType::Float64);
        assert_eq!(table.column("label").unwrap().data_type, DataType::Utf8);
        assert_eq!(table.cell(0, 1), Some(&CellValue::Float(1.0)));
        assert_eq!(table.cell(2, 1), Some(&CellValue::Null));
        assert_eq!(table.cell(1, 2), Some(&CellValue::from("3")));
    }

    #[test]
    fn test_short_rows_are_padded_with_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(&path, "a,b\n1,2\n3\n").unwrap();

        let table = CsvParser::default().parse(&path).unwrap();
        assert_eq!(table.cell(1, 1), Some(&CellValue::Null));
    }

    #[test]
    fn test_rejects_row_wider_than_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(&path, "a,b\n1,2\n3,4,5\n").unwrap();

        let err = CsvParser::default().parse(&path).unwrap_err();
        assert_eq!(err.to_string(), "CSV row 3 has 3 fields, header has 2");
    }

    #[test]
    fn test_rejects_duplicate_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(&path, "a,b,a\n1,2,3\n").unwrap();

        let err = CsvParser::default().parse(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Duplicate column name: a"));
    }
}
