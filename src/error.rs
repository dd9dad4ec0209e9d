//! Error types for regression runs

use std::path::PathBuf;

use indexmap::IndexMap;
use thiserror::Error;

use crate::model::DataType;

pub type Result<T> = std::result::Result<T, RegressionError>;

/// Column name to `(type in A, type in B)` for every column whose declared
/// type differs.
pub type SchemaDifferences = IndexMap<String, (DataType, DataType)>;

#[derive(Error, Debug)]
pub enum RegressionError {
    #[error("File not found: {} (searched: {searched:?})", .path.display())]
    NotFound {
        path: PathBuf,
        searched: Vec<PathBuf>,
    },

    #[error("In {name_a} not in {name_b}: {only_in_a:?}; in {name_b} not in {name_a}: {only_in_b:?}")]
    ColumnsMismatch {
        name_a: String,
        name_b: String,
        only_in_a: Vec<String>,
        only_in_b: Vec<String>,
    },

    #[error("{name_a} shape = {shape_a:?}, {name_b} shape = {shape_b:?}")]
    RowCountMismatch {
        name_a: String,
        name_b: String,
        shape_a: (usize, usize),
        shape_b: (usize, usize),
    },

    #[error("Schema difference between {name_a} and {name_b}: {}", format_differences(.differences))]
    SchemaMismatch {
        name_a: String,
        name_b: String,
        differences: SchemaDifferences,
    },

    #[error("Unequal columns: {columns:?} (details in {})", .diff_path.display())]
    ContentMismatch {
        columns: Vec<String>,
        diff_path: PathBuf,
    },

    #[error(transparent)]
    Extraction(anyhow::Error),

    #[error("Failed to read table {}: {source:#}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to write table {}: {source:#}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl RegressionError {
    /// True for the failure kinds that mean the two tables differ, as
    /// opposed to a file or plumbing problem.
    pub fn is_regression(&self) -> bool {
        matches!(
            self,
            Self::ColumnsMismatch { .. }
                | Self::RowCountMismatch { .. }
                | Self::SchemaMismatch { .. }
                | Self::ContentMismatch { .. }
        )
    }
}

pub(crate) fn format_differences(differences: &SchemaDifferences) -> String {
    let parts: Vec<String> = differences
        .iter()
        .map(|(name, (a, b))| format!("{}: ({}, {})", name, a, b))
        .collect();
    format!("{{{}}}", parts.join(", "))
}
