//! Non-fatal advisories.
//!
//! Warnings never interrupt a run. They travel through a [`WarningSink`]
//! separate from [`crate::error::RegressionError`], so a caller can treat
//! them independently of hard failures.

use std::cell::RefCell;
use std::path::PathBuf;

use crate::error::{format_differences, SchemaDifferences};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Declared types differ but schema differences are configured as
    /// advisory.
    SchemaDifference {
        name_a: String,
        name_b: String,
        differences: SchemaDifferences,
    },
    /// Configured exclusions that matched no column.
    UnusedExclusions { columns: Vec<String> },
    /// The snapshot at `path` is about to be replaced.
    IrreversibleOverwrite { path: PathBuf },
    /// Excluded columns will be missing from the rewritten snapshot.
    ExcludedFromSnapshot { columns: Vec<String> },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::SchemaDifference {
                name_a,
                name_b,
                differences,
            } => write!(
                f,
                "Schema difference between {} and {}: {}",
                name_a,
                name_b,
                format_differences(differences)
            ),
            Warning::UnusedExclusions { columns } => {
                write!(f, "Excluded columns not present in table: {:?}", columns)
            }
            Warning::IrreversibleOverwrite { path } => write!(
                f,
                "OVERWRITING SNAPSHOT WITH LOCAL DATA at {}. This cannot be undone!",
                path.display()
            ),
            Warning::ExcludedFromSnapshot { columns } => {
                write!(f, "NOT INCLUDING excluded columns {:?} IN SNAPSHOT OVERWRITE.", columns)
            }
        }
    }
}

/// Receiver for non-fatal advisories
pub trait WarningSink {
    fn warn(&self, warning: Warning);
}

/// Routes warnings to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl WarningSink for LogSink {
    fn warn(&self, warning: Warning) {
        log::warn!("{}", warning);
    }
}

/// Records every warning it receives, and also logs it.
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: RefCell<Vec<Warning>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.borrow().clone()
    }

    pub fn take(&self) -> Vec<Warning> {
        self.warnings.take()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.borrow().is_empty()
    }
}

impl WarningSink for CollectingSink {
    fn warn(&self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.borrow_mut().push(warning);
    }
}

impl<T: WarningSink + ?Sized> WarningSink for &T {
    fn warn(&self, warning: Warning) {
        (**self).warn(warning)
    }
}
