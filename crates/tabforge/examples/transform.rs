//! Example: Apply a rule document to a data file with Tabforge.
//!
//! Usage:
//!   cargo run --example transform -- <data_path> <rules_path>
//!
//! Example:
//!   cargo run --example transform -- test_data/golden/cards/input.csv test_data/golden/cards/rules.yaml

use std::env;
use std::path::Path;

use tabforge::assistant::{infer_chart, system_prompt, TableContext};
use tabforge::Tabforge;

fn main() -> tabforge::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: cargo run --example transform -- <data_path> <rules_path>");
        eprintln!("\nExample:");
        eprintln!(
            "  cargo run --example transform -- test_data/golden/cards/input.csv test_data/golden/cards/rules.yaml"
        );
        std::process::exit(1);
    }

    let (data_path, rules_path) = (Path::new(&args[1]), Path::new(&args[2]));
    for path in [data_path, rules_path] {
        if !path.exists() {
            eprintln!("Error: File not found: {}", path.display());
            std::process::exit(1);
        }
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("Tabforge: {} with {}", data_path.display(), rules_path.display());
    println!("{}", separator);
    println!();

    let tabforge = Tabforge::new();
    let result = tabforge.ingest(data_path, rules_path)?;

    println!("## Source Metadata");
    println!("  File: {}", result.source.file);
    println!("  Format: {}", result.source.format());
    println!("  Rows: {}", result.source.row_count);
    println!("  Columns: {}", result.source.column_count);
    println!();

    println!("## Rules ({} columns)", result.rules.len());
    for (column, ops) in result.rules.columns() {
        for op in ops.operations() {
            println!("  {:20} {:9} {}", column, op.key(), op.description());
        }
    }
    println!();

    let outcome = &result.outcome;
    println!("## Changes");
    for change in &outcome.report.changes {
        println!(
            "  [{}] {} ({} values)",
            change.operation, change.description, change.values_changed
        );
    }
    println!();

    println!("## Result ({} rows, changed: {})", outcome.dataset.row_count(), outcome.changed);
    println!("  {}", outcome.dataset.column_names().join(" | "));
    for row in outcome.dataset.rows().take(10) {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("  {}", cells.join(" | "));
    }
    println!();

    // What the SQL assistant would be told about the transformed table.
    let table = TableContext::from_dataset("transformed", &outcome.dataset);
    println!("## Assistant Prompt");
    println!("{}", system_prompt(&table));
    println!();
    println!("## Suggested Chart: {:?}", infer_chart(&outcome.dataset).kind);

    println!("{}", separator);

    Ok(())
}
