//! Apply command - transform a data file and write the result.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use colored::Colorize;
use tabforge::OutputFormat;

pub fn run(
    file: PathBuf,
    rules: PathBuf,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    today: Option<NaiveDate>,
    reject_length: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("Data file not found: {}", file.display()).into());
    }
    if !rules.exists() {
        return Err(format!("Rules file not found: {}", rules.display()).into());
    }

    let tabforge = super::pipeline(today, reject_length);
    let result = tabforge.ingest(&file, &rules)?;

    println!(
        "{} {} operations from {} to {}",
        "Applying".cyan().bold(),
        result.rules.operation_count().to_string().white().bold(),
        rules.display(),
        result.source.file.white()
    );

    let format = format
        .or_else(|| output.as_deref().and_then(OutputFormat::from_path))
        .unwrap_or_default();
    let output_path = output.unwrap_or_else(|| default_output_path(&file, format));

    let outcome = &result.outcome;
    let report = &outcome.report;

    println!();
    println!("  Operations applied: {}", report.operations_applied);
    println!("  Values changed:     {}", report.values_changed);
    println!("  Columns renamed:    {}", report.columns_renamed);
    println!("  Columns added:      {}", report.columns_added);
    println!("  Rows removed:       {}", report.rows_removed);
    println!();

    if outcome.changed {
        println!("{} dataset changed", "✓".green().bold());
    } else {
        println!("{} dataset unchanged", "•".yellow());
    }

    tabforge.export(&outcome.dataset, &output_path, format)?;

    println!(
        "Saved {} rows to {}",
        outcome.dataset.row_count(),
        output_path.display().to_string().cyan()
    );

    Ok(())
}

/// `<stem>_transformed.<ext>` next to the input file.
fn default_output_path(file: &Path, format: OutputFormat) -> PathBuf {
    let stem = file.file_stem().unwrap_or_default().to_string_lossy();
    file.with_file_name(format!("{}_transformed.{}", stem, format.extension()))
}
