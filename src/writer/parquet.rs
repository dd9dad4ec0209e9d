//! Parquet table writer

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float32Array, Float64Array, Int16Array, Int32Array,
    Int64Array, Int8Array, NullArray, StringArray, TimestampMicrosecondArray, UInt16Array,
    UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::{DataType as ArrowType, Field, Schema as ArrowSchema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, Timelike};
use parquet::arrow::ArrowWriter;

use crate::model::{CellValue, Column, DataType, Table};

use super::TableWriter;

/// Days from 0001-01-01 (CE) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Writes a table as a single Parquet row group, keeping declared types
pub struct ParquetWriter;

impl TableWriter for ParquetWriter {
    fn write(&self, table: &Table, path: &Path) -> Result<()> {
        let fields: Vec<Field> = table
            .columns
            .iter()
            .map(|c| Field::new(c.name.clone(), to_arrow_type(c.data_type), true))
            .collect();
        let schema = Arc::new(ArrowSchema::new(fields));

        let arrays = table
            .columns
            .iter()
            .map(|c| build_array(table, c))
            .collect::<Result<Vec<_>>>()?;

        let batch = if arrays.is_empty() {
            RecordBatch::new_empty(schema.clone())
        } else {
            RecordBatch::try_new(schema.clone(), arrays).context("Failed to assemble record batch")?
        };

        let file = File::create(path)
            .with_context(|| format!("Failed to create Parquet file: {}", path.display()))?;
        let mut writer =
            ArrowWriter::try_new(file, schema, None).context("Failed to create Parquet writer")?;
        writer.write(&batch).context("Failed to write Parquet batch")?;
        writer.close().context("Failed to finalize Parquet file")?;

        Ok(())
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "parquet" | "pq")
    }
}

fn to_arrow_type(data_type: DataType) -> ArrowType {
    match data_type {
        DataType::Null => ArrowType::Null,
        DataType::Boolean => ArrowType::Boolean,
        DataType::Int8 => ArrowType::Int8,
        DataType::Int16 => ArrowType::Int16,
        DataType::Int32 => ArrowType::Int32,
        DataType::Int64 => ArrowType::Int64,
        DataType::UInt8 => ArrowType::UInt8,
        DataType::UInt16 => ArrowType::UInt16,
        DataType::UInt32 => ArrowType::UInt32,
        DataType::UInt64 => ArrowType::UInt64,
        DataType::Float32 => ArrowType::Float32,
        DataType::Float64 => ArrowType::Float64,
        DataType::Utf8 => ArrowType::Utf8,
        DataType::Date => ArrowType::Date32,
        DataType::Datetime => ArrowType::Timestamp(TimeUnit::Microsecond, None),
    }
}

/// Collect a column's cells through `extract`, which returns `None` when the
/// cell does not fit the declared type.
fn values<T>(
    table: &Table,
    column: &Column,
    extract: impl Fn(&CellValue) -> Option<T>,
) -> Result<Vec<Option<T>>> {
    table
        .rows
        .iter()
        .enumerate()
        .map(|(row, r)| match r.get(column.index).unwrap_or(&CellValue::Null) {
            CellValue::Null => Ok(None),
            cell => match extract(cell) {
                Some(v) => Ok(Some(v)),
                None => bail!(
                    "Value {:?} at row {} does not fit column '{}' of type {}",
                    cell,
                    row,
                    column.name,
                    column.data_type
                ),
            },
        })
        .collect()
}

fn int<T: TryFrom<i64> + TryFrom<u64>>(cell: &CellValue) -> Option<T> {
    match cell {
        CellValue::Int(i) => <T as TryFrom<i64>>::try_from(*i).ok(),
        CellValue::UInt(u) => <T as TryFrom<u64>>::try_from(*u).ok(),
        _ => None,
    }
}

fn build_array(table: &Table, column: &Column) -> Result<ArrayRef> {
    let array: ArrayRef = match column.data_type {
        DataType::Null => Arc::new(NullArray::new(table.row_count())),
        DataType::Boolean => Arc::new(BooleanArray::from(values(table, column, |c| match c {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        })?)),
        DataType::Int8 => Arc::new(Int8Array::from(values(table, column, int::<i8>)?)),
        DataType::Int16 => Arc::new(Int16Array::from(values(table, column, int::<i16>)?)),
        DataType::Int32 => Arc::new(Int32Array::from(values(table, column, int::<i32>)?)),
        DataType::Int64 => Arc::new(Int64Array::from(values(table, column, int::<i64>)?)),
        DataType::UInt8 => Arc::new(UInt8Array::from(values(table, column, int::<u8>)?)),
        DataType::UInt16 => Arc::new(UInt16Array::from(values(table, column, int::<u16>)?)),
        DataType::UInt32 => Arc::new(UInt32Array::from(values(table, column, int::<u32>)?)),
        DataType::UInt64 => Arc::new(UInt64Array::from(values(table, column, int::<u64>)?)),
        DataType::Float32 => Arc::new(Float32Array::from(values(table, column, |c| match c {
            CellValue::Float(f) if f.is_nan() || (*f as f32) as f64 == *f => Some(*f as f32),
            _ => None,
        })?)),
        DataType::Float64 => Arc::new(Float64Array::from(values(table, column, |c| match c {
            CellValue::Float(f) => Some(*f),
            _ => None,
        })?)),
        DataType::Utf8 => Arc::new(StringArray::from(values(table, column, |c| match c {
            CellValue::String(s) => Some(s.to_string()),
            _ => None,
        })?)),
        DataType::Date => Arc::new(Date32Array::from(values(table, column, |c| match c {
            CellValue::Date(d) => Some(d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE),
            _ => None,
        })?)),
        DataType::Datetime => {
            Arc::new(TimestampMicrosecondArray::from(values(table, column, |c| match c {
                CellValue::DateTime(dt) if dt.nanosecond() % 1_000 == 0 => {
                    Some(dt.and_utc().timestamp_micros())
                }
                _ => None,
            })?))
        }
    };

    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParquetParser, Parser};
    use chrono::NaiveDate;

    #[test]
    fn test_parquet_keeps_declared_types_and_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.parquet");
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let table = Table::from_columns(vec![
            ("a", DataType::Int32, vec![CellValue::Int(1), CellValue::Null]),
            ("b", DataType::Utf8, vec!["x".into(), "y".into()]),
            ("c", DataType::Float32, vec![CellValue::Float(0.5), CellValue::Float(1.5)]),
            ("d", DataType::Date, vec![CellValue::Date(date), CellValue::Null]),
            (
                "e",
                DataType::Datetime,
                vec![CellValue::DateTime(date.and_hms_opt(12, 30, 0).unwrap()), CellValue::Null],
            ),
            ("f", DataType::UInt16, vec![CellValue::UInt(7), CellValue::UInt(8)]),
        ])
        .unwrap();

        ParquetWriter.write(&table, &path).unwrap();
        let read = ParquetParser.parse(&path).unwrap();

        assert_eq!(read, table);
    }

    #[test]
    fn test_rejects_value_of_wrong_type() {
        let dir = tempfile::tempdir().unwrap();
        let table = Table::from_columns(vec![("a", DataType::Int64, vec!["oops".into()])]).unwrap();

        assert!(ParquetWriter.write(&table, &dir.path().join("x.parquet")).is_err());
    }

    #[test]
    fn test_rejects_float_without_exact_f32_form() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.parquet");

        let lossy = Table::from_columns(vec![("x", DataType::Float32, vec![CellValue::Float(1.1)])])
            .unwrap();
        let err = ParquetWriter.write(&lossy, &path).unwrap_err();
        assert!(err.to_string().contains("does not fit column 'x' of type Float32"));

        let nan = Table::from_columns(vec![("x", DataType::Float32, vec![CellValue::Float(f64::NAN)])])
            .unwrap();
        ParquetWriter.write(&nan, &path).unwrap();
        assert_eq!(ParquetParser.parse(&path).unwrap(), nan);
    }

    #[test]
    fn test_rejects_sub_microsecond_datetime() {
        let dir = tempfile::tempdir().unwrap();
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_nano_opt(12, 0, 0, 1_500)
            .unwrap();
        let table = Table::from_columns(vec![("t", DataType::Datetime, vec![CellValue::DateTime(dt)])])
            .unwrap();

        assert!(ParquetWriter.write(&table, &dir.path().join("x.parquet")).is_err());
    }
}
