//! Column-set and declared-type comparison

use std::collections::BTreeSet;

use crate::error::{RegressionError, Result, SchemaDifferences};
use crate::model::Schema;
use crate::warning::{Warning, WarningSink};

/// Fail with `ColumnsMismatch` unless both schemas name the same columns.
///
/// Both one-sided lists are sorted.
pub fn check_columns(schema_a: &Schema, schema_b: &Schema, name_a: &str, name_b: &str) -> Result<()> {
    let a: BTreeSet<&str> = schema_a.names().collect();
    let b: BTreeSet<&str> = schema_b.names().collect();

    let only_in_a: Vec<String> = a.difference(&b).map(|s| s.to_string()).collect();
    let only_in_b: Vec<String> = b.difference(&a).map(|s| s.to_string()).collect();

    if only_in_a.is_empty() && only_in_b.is_empty() {
        return Ok(());
    }

    Err(RegressionError::ColumnsMismatch {
        name_a: name_a.to_string(),
        name_b: name_b.to_string(),
        only_in_a,
        only_in_b,
    })
}

/// Compare declared types column by column.
///
/// A column missing from either side is a caller error and fails with
/// `ColumnsMismatch` before any type is compared. Type differences fail with
/// `SchemaMismatch` when `fatal`, otherwise they are reported to `sink` and
/// the call succeeds.
pub fn compare_schemas(
    schema_a: &Schema,
    schema_b: &Schema,
    name_a: &str,
    name_b: &str,
    fatal: bool,
    sink: &dyn WarningSink,
) -> Result<()> {
    check_columns(schema_a, schema_b, name_a, name_b)?;

    let mut differences = SchemaDifferences::new();
    for (name, type_a) in schema_a.iter() {
        if let Some(type_b) = schema_b.get(name) {
            if type_a != type_b {
                differences.insert(name.to_string(), (type_a, type_b));
            }
        }
    }

    if differences.is_empty() {
        return Ok(());
    }

    differences.sort_keys();

    if fatal {
        return Err(RegressionError::SchemaMismatch {
            name_a: name_a.to_string(),
            name_b: name_b.to_string(),
            differences,
        });
    }

    sink.warn(Warning::SchemaDifference {
        name_a: name_a.to_string(),
        name_b: name_b.to_string(),
        differences,
    });
    Ok(())
}
