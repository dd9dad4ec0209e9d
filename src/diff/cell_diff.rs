//! Cell-level comparison logic

use serde::Serialize;

use crate::model::{CellValue, Table};

/// A position where the two tables disagree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellMismatch {
    /// Row position (0-based)
    pub row: usize,
    /// Column name
    pub column: String,
    pub value_a: CellValue,
    pub value_b: CellValue,
}

/// Compare every cell under exact equality.
///
/// Columns are matched by name and visited in name order, rows by position.
/// Columns missing from `b` are skipped; callers check column sets first.
pub fn diff_cells(a: &Table, b: &Table) -> Vec<CellMismatch> {
    let mut columns: Vec<(usize, &str)> = a
        .columns
        .iter()
        .map(|c| (c.index, c.name.as_str()))
        .collect();
    columns.sort_by(|x, y| x.1.cmp(y.1));

    let mut mismatches = Vec::new();
    for (idx_a, name) in columns {
        let Some(idx_b) = b.column_index(name) else {
            continue;
        };

        for (row, (row_a, row_b)) in a.rows.iter().zip(&b.rows).enumerate() {
            let value_a = row_a.get(idx_a).unwrap_or(&CellValue::Null);
            let value_b = row_b.get(idx_b).unwrap_or(&CellValue::Null);
            if value_a != value_b {
                mismatches.push(CellMismatch {
                    row,
                    column: name.to_string(),
                    value_a: value_a.clone(),
                    value_b: value_b.clone(),
                });
            }
        }
    }

    mismatches
}

/// Sorted, de-duplicated names of columns with at least one mismatch
pub fn unequal_columns(mismatches: &[CellMismatch]) -> Vec<String> {
    let mut columns: Vec<String> = mismatches.iter().map(|m| m.column.clone()).collect();
    columns.sort();
    columns.dedup();
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DataType;

    fn table(col1: Vec<CellValue>, col2: Vec<CellValue>) -> Table {
        Table::from_columns(vec![
            ("col1", DataType::Int64, col1),
            ("col2", DataType::Utf8, col2),
        ])
        .unwrap()
    }

    #[test]
    fn test_equal_tables_have_no_mismatches() {
        let a = table(vec![1i64.into(), 2i64.into()], vec!["a".into(), "b".into()]);
        assert!(diff_cells(&a, &a.clone()).is_empty());
    }

    #[test]
    fn test_mismatch_positions() {
        let a = table(
            vec![1i64.into(), 2i64.into(), 3i64.into()],
            vec!["a".into(), "b".into(), "c".into()],
        );
        let b = table(
            vec![1i64.into(), 5i64.into(), 3i64.into()],
            vec!["a".into(), "b".into(), CellValue::Null],
        );

        let mismatches = diff_cells(&a, &b);
        assert_eq!(mismatches.len(), 2);
        assert_eq!(mismatches[0].column, "col1");
        assert_eq!(mismatches[0].row, 1);
        assert_eq!(mismatches[0].value_b, CellValue::Int(5));
        assert_eq!(mismatches[1].column, "col2");
        assert_eq!(mismatches[1].row, 2);
        assert!(mismatches[1].value_b.is_null());

        assert_eq!(unequal_columns(&mismatches), vec!["col1", "col2"]);
    }

    #[test]
    fn test_columns_matched_by_name_not_position() {
        let a = table(vec![1i64.into()], vec!["a".into()]);
        let mut b = a.clone();
        b.columns.reverse();
        b.columns[0].index = 0;
        b.columns[1].index = 1;
        b.rows[0].cells.reverse();

        assert!(diff_cells(&a, &b).is_empty());
    }
}
