//! regcheck - snapshot regression testing for tabular data

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use regcheck::confirm::StdinConfirmation;
use regcheck::extract::CsvExtractor;
use regcheck::{PackageConfig, RegressionError, RegressionPackage};

/// Compare a freshly processed table with its approved snapshot
#[derive(Parser, Debug)]
#[command(name = "regcheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding raw.txt, processed.parquet and the diff artifact
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Raw input file to use instead of <root>/raw.txt
    #[arg(long, global = true)]
    raw_input: Option<PathBuf>,

    /// Snapshot file to use instead of <root>/processed.parquet
    #[arg(long, global = true)]
    ground_truth: Option<PathBuf>,

    /// Where to write the diff artifact on content mismatch
    #[arg(long, global = true)]
    diff_export: Option<PathBuf>,

    /// Column(s) to exclude from both sides (comma-separated)
    #[arg(short, long, value_delimiter = ',', global = true)]
    exclude: Vec<String>,

    /// Report declared-type differences as warnings instead of failing
    #[arg(long, global = true)]
    warn_on_schema_diff: bool,

    /// Field delimiter of the raw input
    #[arg(long, default_value_t = ',', global = true)]
    delimiter: char,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the regression test
    Run,
    /// Replace the snapshot with the locally processed table
    Overwrite,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_regression() => {
            eprintln!("Regression: {}", e);
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<(), RegressionError> {
    let mut config = PackageConfig::new(cli.root)
        .with_exclude_columns(cli.exclude)
        .with_raise_if_schema_difference(!cli.warn_on_schema_diff);
    if let Some(path) = cli.raw_input {
        config = config.with_raw_input_path(path);
    }
    if let Some(path) = cli.ground_truth {
        config = config.with_ground_truth_path(path);
    }
    if let Some(path) = cli.diff_export {
        config = config.with_diff_export_path(path);
    }

    let delimiter = u8::try_from(cli.delimiter).unwrap_or(b',');
    let package = RegressionPackage::new(config, CsvExtractor::new(delimiter));

    match cli.command {
        Command::Run => package.execute_regression_test(),
        Command::Overwrite => package
            .overwrite_snapshot_with_local(&mut StdinConfirmation)
            .map(|_| ()),
    }
}
