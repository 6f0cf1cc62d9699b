//! Diff command - preview changes without writing anything.

use std::path::PathBuf;

use chrono::NaiveDate;
use colored::Colorize;

pub fn run(
    file: PathBuf,
    rules: PathBuf,
    limit: usize,
    today: Option<NaiveDate>,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("Data file not found: {}", file.display()).into());
    }

    let result = super::pipeline(today, false).ingest(&file, &rules)?;
    let outcome = result.outcome;

    if !outcome.changed {
        println!("{}", "No changes.".yellow());
        return Ok(());
    }

    println!(
        "{} {} operations on {}",
        "Previewing".cyan().bold(),
        outcome.report.operations_applied.to_string().white().bold(),
        result.source.file.white()
    );
    println!();

    for change in &outcome.report.changes {
        println!(
            "  [{}] {} - {} ({} values)",
            change.operation.to_uppercase().cyan(),
            change.column.white().bold(),
            change.description,
            change.values_changed
        );
    }

    let total = outcome.report.row_audits().count();
    if total == 0 {
        return Ok(());
    }

    println!();
    for audit in outcome.report.row_audits().take(limit) {
        println!(
            "    row {:>5} {:<24} {} {} {}",
            audit.row + 1,
            audit.column,
            format!("{:?}", audit.original_value).red(),
            "→".dimmed(),
            format!("{:?}", audit.new_value).green()
        );
    }

    if total > limit {
        println!("    {} more", (total - limit).to_string().dimmed());
    }

    if outcome.report.rows_removed > 0 {
        println!();
        println!(
            "{} {} rows would be removed by length rules",
            "Note:".yellow(),
            outcome.report.rows_removed
        );
    }

    Ok(())
}
