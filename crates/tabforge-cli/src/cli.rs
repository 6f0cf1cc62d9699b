//! CLI argument definitions using clap.

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tabforge::OutputFormat;

/// Tabforge: declarative column transformations for tabular data
#[derive(Parser)]
#[command(name = "tabforge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply a rules file to a data file and write the result
    Apply {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "DATA")]
        file: PathBuf,

        /// Path to the rules file (YAML/JSON)
        #[arg(short, long, value_name = "RULES")]
        rules: PathBuf,

        /// Output path (default: <data>_transformed.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (default: from the output extension, else csv)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Reference date for `datediff: today` (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        today: Option<NaiveDate>,

        /// Fail on values that break a `len` rule instead of dropping the row
        #[arg(long)]
        reject_length: bool,
    },

    /// Preview the changes a rules file would make
    Diff {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "DATA")]
        file: PathBuf,

        /// Path to the rules file (YAML/JSON)
        #[arg(short, long, value_name = "RULES")]
        rules: PathBuf,

        /// Maximum number of changed cells to list
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Reference date for `datediff: today` (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        today: Option<NaiveDate>,
    },

    /// Validate a rules file and list its operations
    Check {
        /// Path to the rules file (YAML/JSON)
        #[arg(value_name = "RULES")]
        rules: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract and vet the SQL query in a model response
    Sql {
        /// File holding the response (default: stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}
