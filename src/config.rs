//! Configuration for a regression package

use std::path::PathBuf;

/// Raw input file names probed under the root, in priority order
pub const RAW_INPUT_FILENAMES: [&str; 2] = ["raw.txt", "raw.txt.gz"];

/// Snapshot file name under the root
pub const SNAPSHOT_FILENAME: &str = "processed.parquet";

/// Diff artifact file name under the root
pub const DIFF_EXPORT_FILENAME: &str = "reg_test_comparison.csv";

/// Display name of the freshly extracted table
pub const LOCAL_NAME: &str = "Locally Processed";

/// Display name of the stored snapshot
pub const GROUND_TRUTH_NAME: &str = "Ground Truth";

/// Configuration for one regression package.
///
/// Every path the package uses is derived from these fields on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageConfig {
    /// Directory holding the raw input, snapshot and diff artifact
    pub root: PathBuf,
    /// Raw input to use instead of probing the root
    pub raw_input_path: Option<PathBuf>,
    /// Snapshot to use instead of `<root>/processed.parquet`
    pub ground_truth_path: Option<PathBuf>,
    /// Diff artifact location instead of `<root>/reg_test_comparison.csv`
    pub diff_export_path: Option<PathBuf>,
    /// Columns dropped from both sides before comparing
    pub exclude_columns: Vec<String>,
    /// Fail on declared-type differences instead of warning
    pub raise_if_schema_difference: bool,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            raw_input_path: None,
            ground_truth_path: None,
            diff_export_path: None,
            exclude_columns: Vec::new(),
            raise_if_schema_difference: true,
        }
    }
}

impl PackageConfig {
    /// Create a new config rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Use an explicit raw input file
    pub fn with_raw_input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.raw_input_path = Some(path.into());
        self
    }

    /// Use an explicit snapshot file
    pub fn with_ground_truth_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ground_truth_path = Some(path.into());
        self
    }

    /// Write the diff artifact somewhere other than the root
    pub fn with_diff_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.diff_export_path = Some(path.into());
        self
    }

    /// Set columns to exclude
    pub fn with_exclude_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Whether declared-type differences are fatal
    pub fn with_raise_if_schema_difference(mut self, raise: bool) -> Self {
        self.raise_if_schema_difference = raise;
        self
    }
}
