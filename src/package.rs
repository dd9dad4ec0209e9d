//! Regression package: resolves inputs and runs the comparison

use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::config::{
    PackageConfig, DIFF_EXPORT_FILENAME, GROUND_TRUTH_NAME, LOCAL_NAME, RAW_INPUT_FILENAMES,
    SNAPSHOT_FILENAME,
};
use crate::confirm::{Confirmation, CONFIRM_TOKEN};
use crate::diff::TableComparator;
use crate::error::{RegressionError, Result};
use crate::extract::Extractor;
use crate::model::Table;
use crate::parser::ParserFactory;
use crate::warning::{LogSink, Warning, WarningSink};
use crate::writer::WriterFactory;

/// Result of an overwrite request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverwriteOutcome {
    /// The snapshot at `path` was replaced by the local table
    Written { path: PathBuf },
    /// Confirmation was not given; nothing was written
    Declined,
}

/// A raw input, an extraction routine and a stored snapshot.
///
/// Nothing is cached: every accessor re-resolves paths and re-reads tables
/// from the configuration.
pub struct RegressionPackage<'a> {
    config: PackageConfig,
    extractor: Box<dyn Extractor + 'a>,
    sink: Box<dyn WarningSink + 'a>,
    parsers: ParserFactory,
    writers: WriterFactory,
}

impl<'a> RegressionPackage<'a> {
    /// Create a package whose warnings go to the log
    pub fn new(config: PackageConfig, extractor: impl Extractor + 'a) -> Self {
        Self {
            config,
            extractor: Box::new(extractor),
            sink: Box::new(LogSink),
            parsers: ParserFactory::new(),
            writers: WriterFactory::new(),
        }
    }

    /// Send warnings to `sink` instead of the log
    pub fn with_sink(mut self, sink: impl WarningSink + 'a) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    /// The raw input: the override if set (it must exist), else the first
    /// conventional file name present under the root.
    pub fn raw_input_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config.raw_input_path {
            return require_existing(path);
        }

        for name in RAW_INPUT_FILENAMES {
            let path = self.config.root.join(name);
            if path.exists() {
                log::debug!("Resolved raw input: {}", path.display());
                return Ok(path);
            }
        }

        Err(RegressionError::NotFound {
            path: self.config.root.join(RAW_INPUT_FILENAMES[0]),
            searched: list_dir(&self.config.root),
        })
    }

    /// The snapshot to compare against; it must exist.
    pub fn ground_truth_path(&self) -> Result<PathBuf> {
        require_existing(&self.snapshot_target_path())
    }

    /// Where an overwrite writes the snapshot. Unlike
    /// [`ground_truth_path`](Self::ground_truth_path) the file need not exist
    /// yet.
    pub fn snapshot_target_path(&self) -> PathBuf {
        self.config
            .ground_truth_path
            .clone()
            .unwrap_or_else(|| self.config.root.join(SNAPSHOT_FILENAME))
    }

    pub fn diff_export_path(&self) -> PathBuf {
        self.config
            .diff_export_path
            .clone()
            .unwrap_or_else(|| self.config.root.join(DIFF_EXPORT_FILENAME))
    }

    /// Run the extractor on the raw input, then exclude and sort columns
    pub fn locally_processed(&self) -> Result<Table> {
        let raw_input = self.raw_input_path()?;
        let table = self
            .extractor
            .extract(&raw_input)
            .map_err(RegressionError::Extraction)?;
        Ok(self.exclude_columns(table))
    }

    /// Read the snapshot, then exclude and sort columns
    pub fn ground_truth(&self) -> Result<Table> {
        let path = self.ground_truth_path()?;
        let table = self
            .parsers
            .parse(&path)
            .map_err(|source| RegressionError::Read { path, source })?;
        Ok(self.exclude_columns(table))
    }

    /// Drop configured exclusions present in `table` and sort the remaining
    /// columns by name. Exclusions matching no column are reported as a
    /// warning.
    pub fn exclude_columns(&self, mut table: Table) -> Table {
        table.sort_columns_by_name();

        let present: FxHashSet<&str> = table.column_names().collect();
        let mut unused: Vec<String> = self
            .config
            .exclude_columns
            .iter()
            .filter(|c| !present.contains(c.as_str()))
            .cloned()
            .collect();

        if !unused.is_empty() {
            unused.sort();
            unused.dedup();
            self.sink.warn(Warning::UnusedExclusions { columns: unused });
        }

        table.drop_columns(self.config.exclude_columns.as_slice());
        table
    }

    /// Compare the locally processed table with the snapshot.
    ///
    /// Comparison errors are returned unchanged.
    pub fn execute_regression_test(&self) -> Result<()> {
        let local = self.locally_processed()?;
        let ground_truth = self.ground_truth()?;

        TableComparator::new(LOCAL_NAME, GROUND_TRUTH_NAME, self.diff_export_path())
            .with_schema_diff_fatal(self.config.raise_if_schema_difference)
            .with_sink(self.sink.as_ref())
            .compare(&local, &ground_truth)
    }

    /// Replace the snapshot with the locally processed table after explicit
    /// confirmation.
    pub fn overwrite_snapshot_with_local(
        &self,
        confirmation: &mut dyn Confirmation,
    ) -> Result<OverwriteOutcome> {
        let path = self.snapshot_target_path();

        self.sink
            .warn(Warning::IrreversibleOverwrite { path: path.clone() });
        if !self.config.exclude_columns.is_empty() {
            self.sink.warn(Warning::ExcludedFromSnapshot {
                columns: self.config.exclude_columns.clone(),
            });
        }

        let prompt = format!(
            "Type \"{}\" to overwrite snapshot at {}.",
            CONFIRM_TOKEN,
            path.display()
        );
        if !confirmation.confirm(&prompt)? {
            log::info!("Snapshot not overwritten.");
            return Ok(OverwriteOutcome::Declined);
        }

        let local = self.locally_processed()?;
        self.writers
            .write(&local, &path)
            .map_err(|source| RegressionError::Write {
                path: path.clone(),
                source,
            })?;
        log::info!("Snapshot overwritten at {}.", path.display());

        Ok(OverwriteOutcome::Written { path })
    }
}

fn require_existing(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        Ok(path.to_path_buf())
    } else {
        Err(RegressionError::NotFound {
            path: path.to_path_buf(),
            searched: vec![path.to_path_buf()],
        })
    }
}

/// Sorted directory listing for `NotFound` diagnostics; empty if unreadable.
fn list_dir(root: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(root)
        .map(|dir| dir.filter_map(|e| e.ok().map(|e| e.path())).collect())
        .unwrap_or_default();
    entries.sort();
    entries
}
