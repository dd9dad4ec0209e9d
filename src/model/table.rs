//! Table, Row, and Cell data structures

use std::borrow::Cow;

use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::schema::{Column, DataType, Schema};

/// A single cell value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(Cow<'static, str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

/// Exact equality. Values of different variants never compare equal, and
/// two NaNs at the same position are not a difference.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::UInt(a), CellValue::UInt(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            _ => false,
        }
    }
}

impl CellValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Convert to a display string
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed("NULL"),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::UInt(u) => Cow::Owned(u.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
            CellValue::String(s) => Cow::Borrowed(s.as_ref()),
            CellValue::Date(d) => Cow::Owned(d.to_string()),
            CellValue::DateTime(dt) => Cow::Owned(dt.to_string()),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Cow::Owned(s.to_string()))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(Cow::Owned(s))
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i as i64)
    }
}

impl From<u64> for CellValue {
    fn from(u: u64) -> Self {
        CellValue::UInt(u)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

/// A row in the table
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Cell values in column order
    pub cells: Vec<CellValue>,
}

impl Row {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    /// Get a cell value by column index
    pub fn get(&self, index: usize) -> Option<&CellValue> {
        self.cells.get(index)
    }
}

/// A table of typed columns and positional rows
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column definitions
    pub columns: Vec<Column>,
    /// All rows in the table
    pub rows: Vec<Row>,
}

impl Table {
    /// Create a new empty table with column definitions
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create an empty table, rejecting duplicate column names
    pub fn try_new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = FxHashSet::default();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                bail!("Duplicate column name: {}", column.name);
            }
        }
        Ok(Self::new(columns))
    }

    /// Build a table from column-major data.
    ///
    /// Every column must hold the same number of values and names must be
    /// unique.
    pub fn from_columns<S, I>(columns: I) -> Result<Self>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, DataType, Vec<CellValue>)>,
    {
        let mut defs = Vec::new();
        let mut data: Vec<Vec<CellValue>> = Vec::new();

        for (index, (name, data_type, values)) in columns.into_iter().enumerate() {
            let name = name.into();
            if let Some(first) = data.first() {
                if first.len() != values.len() {
                    bail!(
                        "Column '{}' has {} values, expected {}",
                        name,
                        values.len(),
                        first.len()
                    );
                }
            }
            defs.push(Column::new(name, index, data_type));
            data.push(values);
        }

        let row_count = data.first().map_or(0, Vec::len);
        let mut columns: Vec<_> = data.into_iter().map(Vec::into_iter).collect();
        let mut table = Table::try_new(defs)?;
        for _ in 0..row_count {
            let cells = columns
                .iter_mut()
                .map(|col| col.next().unwrap_or(CellValue::Null))
                .collect();
            table.add_row(cells);
        }

        Ok(table)
    }

    /// Add a row to the table
    pub fn add_row(&mut self, cells: Vec<CellValue>) {
        self.rows.push(Row::new(cells));
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in table order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Cell at a row position and column index
    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    /// Declared types keyed by column name
    pub fn schema(&self) -> Schema {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.data_type))
            .collect()
    }

    /// Reorder columns (and the cells of every row) by column name.
    pub fn sort_columns_by_name(&mut self) {
        let mut order: Vec<usize> = (0..self.columns.len()).collect();
        order.sort_by(|&a, &b| self.columns[a].name.cmp(&self.columns[b].name));
        self.reorder(&order);
    }

    /// Drop the named columns that are present; unknown names are ignored.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) {
        let drop: FxHashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !drop.contains(c.name.as_str()))
            .map(|(i, _)| i)
            .collect();
        self.reorder(&keep);
    }

    /// Keep only the columns at `order`, in that order.
    fn reorder(&mut self, order: &[usize]) {
        self.columns = order
            .iter()
            .enumerate()
            .map(|(new_idx, &old_idx)| {
                let mut col = self.columns[old_idx].clone();
                col.index = new_idx;
                col
            })
            .collect();

        for row in &mut self.rows {
            row.cells = order
                .iter()
                .map(|&i| row.cells.get(i).cloned().unwrap_or(CellValue::Null))
                .collect();
        }
    }
}
