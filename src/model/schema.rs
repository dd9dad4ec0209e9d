//! Column metadata and declared element types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Declared element type of a column.
///
/// Widths are kept distinct: an `Int64` column recast to `Int32` holds the
/// same values but is still a schema difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataType {
    #[default]
    Null,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Utf8,
    Date,
    Datetime,
}

impl DataType {
    /// Widen the type to accommodate another type, used when inferring
    /// column types from untyped text.
    pub fn widen(self, other: DataType) -> DataType {
        if self == other {
            return self;
        }

        match (self, other) {
            (DataType::Null, t) | (t, DataType::Null) => t,
            (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
                DataType::Float64
            }
            (DataType::Date, DataType::Datetime) | (DataType::Datetime, DataType::Date) => {
                DataType::Datetime
            }
            _ => DataType::Utf8,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataType::Null => "Null",
            DataType::Boolean => "Boolean",
            DataType::Int8 => "Int8",
            DataType::Int16 => "Int16",
            DataType::Int32 => "Int32",
            DataType::Int64 => "Int64",
            DataType::UInt8 => "UInt8",
            DataType::UInt16 => "UInt16",
            DataType::UInt32 => "UInt32",
            DataType::UInt64 => "UInt64",
            DataType::Float32 => "Float32",
            DataType::Float64 => "Float64",
            DataType::Utf8 => "String",
            DataType::Date => "Date",
            DataType::Datetime => "Datetime",
        };
        f.write_str(name)
    }
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within a table
    pub name: String,
    /// Column index (0-based position)
    pub index: usize,
    /// Declared element type
    pub data_type: DataType,
}

impl Column {
    /// Create a column with a declared type
    pub fn new(name: impl Into<String>, index: usize, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            index,
            data_type,
        }
    }
}

/// Column name to declared type, in table column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: IndexMap<String, DataType>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data_type: DataType) {
        self.fields.insert(name.into(), data_type);
    }

    pub fn get(&self, name: &str) -> Option<DataType> {
        self.fields.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, DataType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, DataType)> for Schema {
    fn from_iter<I: IntoIterator<Item = (S, DataType)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(name, ty)| (name.into(), ty)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen() {
        assert_eq!(DataType::Null.widen(DataType::Int64), DataType::Int64);
        assert_eq!(DataType::Int64.widen(DataType::Float64), DataType::Float64);
        assert_eq!(DataType::Date.widen(DataType::Datetime), DataType::Datetime);
        assert_eq!(DataType::Boolean.widen(DataType::Int64), DataType::Utf8);
    }

    #[test]
    fn test_schema_keeps_insertion_order() {
        let schema: Schema = [("b", DataType::Int64), ("a", DataType::Utf8)]
            .into_iter()
            .collect();
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(schema.get("a"), Some(DataType::Utf8));
        assert_eq!(schema.get("missing"), None);
    }
}
