//! Diff artifact export

use std::path::Path;

use crate::error::Result;

use super::cell_diff::CellMismatch;

/// Write one CSV record per mismatched position.
///
/// Header is `row,column,<name_a>,<name_b>`. Nulls are written as empty
/// fields. An existing file at `path` is replaced.
pub fn write_diff_artifact(
    path: &Path,
    name_a: &str,
    name_b: &str,
    mismatches: &[CellMismatch],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["row", "column", name_a, name_b])?;

    for mismatch in mismatches {
        let row = mismatch.row.to_string();
        let value_a = export_value(&mismatch.value_a);
        let value_b = export_value(&mismatch.value_b);
        writer.write_record([row.as_str(), mismatch.column.as_str(), value_a.as_str(), value_b.as_str()])?;
    }

    writer.flush()?;
    log::debug!("Wrote {} mismatched cells to {}", mismatches.len(), path.display());
    Ok(())
}

fn export_value(value: &crate::model::CellValue) -> String {
    if value.is_null() {
        String::new()
    } else {
        value.display().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    #[test]
    fn test_artifact_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diff.csv");
        let mismatches = vec![
            CellMismatch {
                row: 0,
                column: "col1".into(),
                value_a: CellValue::Int(1),
                value_b: CellValue::Int(2),
            },
            CellMismatch {
                row: 2,
                column: "col1".into(),
                value_a: CellValue::Int(3),
                value_b: CellValue::Null,
            },
        ];

        write_diff_artifact(&path, "Locally Processed", "Ground Truth", &mismatches).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "row,column,Locally Processed,Ground Truth");
        assert_eq!(lines[1], "0,col1,1,2");
        assert_eq!(lines[2], "2,col1,3,");
        assert_eq!(lines.len(), 3);
    }
}
