//! Parquet file parser

use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType as ArrowType, Date32Type, Date64Type, Float32Type, Float64Type, Int16Type, Int32Type,
    Int64Type, Int8Type, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use chrono::{DateTime, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::model::{CellValue, Column, DataType, Table};

use super::Parser;

/// Days from 0001-01-01 (CE) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parser for Parquet files
pub struct ParquetParser;

impl Parser for ParquetParser {
    fn parse(&self, path: &Path) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open Parquet file: {}", path.display()))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .context("Failed to create Parquet reader")?;

        let schema = builder.schema().clone();
        let reader = builder.build().context("Failed to build Parquet reader")?;

        let columns: Vec<Column> = schema
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| Column::new(field.name().clone(), i, from_arrow_type(field.data_type())))
            .collect();

        let mut table = Table::try_new(columns)
            .with_context(|| format!("Invalid Parquet schema in {}", path.display()))?;

        for batch_result in reader {
            let batch = batch_result.context("Failed to read Parquet batch")?;

            for row_idx in 0..batch.num_rows() {
                let cells: Vec<CellValue> = batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell_value(col, row_idx))
                    .collect();

                table.add_row(cells);
            }
        }

        Ok(table)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "parquet" | "pq")
    }
}

/// Declared column type for an Arrow field type. Types without a direct
/// counterpart are read as strings.
pub(crate) fn from_arrow_type(arrow_type: &ArrowType) -> DataType {
    match arrow_type {
        ArrowType::Null => DataType::Null,
        ArrowType::Boolean => DataType::Boolean,
        ArrowType::Int8 => DataType::Int8,
        ArrowType::Int16 => DataType::Int16,
        ArrowType::Int32 => DataType::Int32,
        ArrowType::Int64 => DataType::Int64,
        ArrowType::UInt8 => DataType::UInt8,
        ArrowType::UInt16 => DataType::UInt16,
        ArrowType::UInt32 => DataType::UInt32,
        ArrowType::UInt64 => DataType::UInt64,
        ArrowType::Float32 => DataType::Float32,
        ArrowType::Float64 => DataType::Float64,
        ArrowType::Utf8 | ArrowType::LargeUtf8 => DataType::Utf8,
        ArrowType::Date32 | ArrowType::Date64 => DataType::Date,
        ArrowType::Timestamp(_, _) => DataType::Datetime,
        _ => DataType::Utf8,
    }
}

fn extract_cell_value(array: &ArrayRef, row_idx: usize) -> CellValue {
    if array.is_null(row_idx) {
        return CellValue::Null;
    }

    match array.data_type() {
        ArrowType::Boolean => CellValue::Bool(array.as_boolean().value(row_idx)),
        ArrowType::Int8 => CellValue::Int(array.as_primitive::<Int8Type>().value(row_idx) as i64),
        ArrowType::Int16 => CellValue::Int(array.as_primitive::<Int16Type>().value(row_idx) as i64),
        ArrowType::Int32 => CellValue::Int(array.as_primitive::<Int32Type>().value(row_idx) as i64),
        ArrowType::Int64 => CellValue::Int(array.as_primitive::<Int64Type>().value(row_idx)),
        ArrowType::UInt8 => CellValue::UInt(array.as_primitive::<UInt8Type>().value(row_idx) as u64),
        ArrowType::UInt16 => {
            CellValue::UInt(array.as_primitive::<UInt16Type>().value(row_idx) as u64)
        }
        ArrowType::UInt32 => {
            CellValue::UInt(array.as_primitive::<UInt32Type>().value(row_idx) as u64)
        }
        ArrowType::UInt64 => CellValue::UInt(array.as_primitive::<UInt64Type>().value(row_idx)),
        ArrowType::Float32 => {
            CellValue::Float(array.as_primitive::<Float32Type>().value(row_idx) as f64)
        }
        ArrowType::Float64 => CellValue::Float(array.as_primitive::<Float64Type>().value(row_idx)),
        ArrowType::Utf8 => {
            CellValue::String(Cow::Owned(array.as_string::<i32>().value(row_idx).to_string()))
        }
        ArrowType::LargeUtf8 => {
            CellValue::String(Cow::Owned(array.as_string::<i64>().value(row_idx).to_string()))
        }
        ArrowType::Date32 => {
            let days = array.as_primitive::<Date32Type>().value(row_idx);
            match days
                .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
                .and_then(NaiveDate::from_num_days_from_ce_opt)
            {
                Some(date) => CellValue::Date(date),
                None => CellValue::Int(days as i64),
            }
        }
        ArrowType::Date64 => {
            let millis = array.as_primitive::<Date64Type>().value(row_idx);
            match DateTime::from_timestamp_millis(millis) {
                Some(dt) => CellValue::Date(dt.date_naive()),
                None => CellValue::Int(millis),
            }
        }
        // Values outside chrono's range are kept as the raw integer
        ArrowType::Timestamp(unit, _) => {
            let (raw, dt) = match unit {
                TimeUnit::Second => {
                    let v = array.as_primitive::<TimestampSecondType>().value(row_idx);
                    (v, DateTime::from_timestamp(v, 0))
                }
                TimeUnit::Millisecond => {
                    let v = array.as_primitive::<TimestampMillisecondType>().value(row_idx);
                    (v, DateTime::from_timestamp_millis(v))
                }
                TimeUnit::Microsecond => {
                    let v = array.as_primitive::<TimestampMicrosecondType>().value(row_idx);
                    (v, DateTime::from_timestamp_micros(v))
                }
                TimeUnit::Nanosecond => {
                    let v = array.as_primitive::<TimestampNanosecondType>().value(row_idx);
                    (v, Some(DateTime::from_timestamp_nanos(v)))
                }
            };
            match dt {
                Some(dt) => CellValue::DateTime(dt.naive_utc()),
                None => CellValue::Int(raw),
            }
        }
        _ => {
            let formatter = arrow::util::display::ArrayFormatter::try_new(
                array.as_ref(),
                &arrow::util::display::FormatOptions::default(),
            );
            match formatter {
                Ok(fmt) => CellValue::String(Cow::Owned(fmt.value(row_idx).to_string())),
                Err(_) => CellValue::Null,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Date32Array, TimestampMicrosecondArray, TimestampSecondArray};
    use arrow::datatypes::{Field, Schema as ArrowSchema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn write_single_column(path: &Path, field: Field, array: ArrayRef) {
        let schema = Arc::new(ArrowSchema::new(vec![field]));
        let batch = RecordBatch::try_new(schema.clone(), vec![array]).unwrap();
        let mut writer = ArrowWriter::try_new(File::create(path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn test_far_future_second_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ts.parquet");
        write_single_column(
            &path,
            Field::new("ts", ArrowType::Timestamp(TimeUnit::Second, None), true),
            Arc::new(TimestampSecondArray::from(vec![10_413_792_000])),
        );

        let table = ParquetParser.parse(&path).unwrap();

        let year_2300 = NaiveDate::from_ymd_opt(2300, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(table.column("ts").unwrap().data_type, DataType::Datetime);
        assert_eq!(table.cell(0, 0), Some(&CellValue::DateTime(year_2300)));
    }

    #[test]
    fn test_unrepresentable_timestamp_keeps_raw_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ts.parquet");
        write_single_column(
            &path,
            Field::new("ts", ArrowType::Timestamp(TimeUnit::Microsecond, None), true),
            Arc::new(TimestampMicrosecondArray::from(vec![i64::MAX])),
        );

        let table = ParquetParser.parse(&path).unwrap();
        assert_eq!(table.cell(0, 0), Some(&CellValue::Int(i64::MAX)));
    }

    #[test]
    fn test_out_of_range_date32_keeps_raw_days() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.parquet");
        write_single_column(
            &path,
            Field::new("d", ArrowType::Date32, true),
            Arc::new(Date32Array::from(vec![0, i32::MAX])),
        );

        let table = ParquetParser.parse(&path).unwrap();

        assert_eq!(
            table.cell(0, 0),
            Some(&CellValue::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()))
        );
        assert_eq!(table.cell(1, 0), Some(&CellValue::Int(i32::MAX as i64)));
    }
}
