//! Check command - validate a rules file.

use std::path::PathBuf;

use colored::Colorize;
use tabforge::RuleSet;

pub fn run(rules: PathBuf, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let rule_set = RuleSet::load(&rules)?;

    if json_output {
        println!("{}", render_json(&rule_set)?);
        return Ok(());
    }

    println!(
        "{} {} ({} columns, {} operations)",
        "Valid".green().bold(),
        rules.display(),
        rule_set.len(),
        rule_set.operation_count()
    );

    for (column, ops) in rule_set.columns() {
        println!();
        println!("  {}", column.white().bold());
        if ops.is_empty() {
            println!("    {}", "(no operations)".dimmed());
        }
        for op in ops.operations() {
            println!("    {:<9} {}", op.key().cyan(), op.description());
        }
    }

    Ok(())
}

/// The rule set as a normalized document, operations in application order.
fn render_json(rule_set: &RuleSet) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rule_set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_rules(dir: &tempfile::TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_json_output_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_rules(
            &dir,
            "rules.yaml",
            "Acct Open Date:\n  datediff: today\n  astype: date\nHas Chip:\n  map:\n    YES: 1\n",
        );

        let rendered = render_json(&RuleSet::load(&path).unwrap()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["Acct Open Date"]["astype"], "date");
        assert_eq!(parsed["Acct Open Date"]["datediff"], "today");
        assert_eq!(parsed["Has Chip"]["map"]["YES"], 1);
        assert!(rendered.find("astype").unwrap() < rendered.find("datediff").unwrap());

        run(path, true).unwrap();
    }

    #[test]
    fn test_run_lists_valid_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_rules(&dir, "rules.json", r#"{"Card Number": {"len": 16}, "notes": {}}"#);
        run(path, false).unwrap();
    }

    #[test]
    fn test_run_rejects_invalid_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_rules(&dir, "rules.yaml", "Has Chip:\n  upper: true\n");

        let err = run(path, true).unwrap_err();
        assert!(err.to_string().contains("upper"));
        assert!(run(dir.path().join("missing.yaml"), false).is_err());
    }
}
