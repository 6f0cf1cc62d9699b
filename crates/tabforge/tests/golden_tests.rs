//! Golden file tests for Tabforge.
//!
//! Each case under `test_data/golden/<case>/` holds:
//! - `input.csv`: the input data file
//! - `rules.yaml` or `rules.json`: the rule document
//! - `expected.csv`: the transformed output, byte for byte
//!
//! Cases pin `datediff` to a fixed date so the output never drifts.
//!
//! # Updating Golden Files
//!
//! When intentional changes are made:
//! ```bash
//! cargo run -p tabforge-cli -- apply test_data/golden/<case>/input.csv \
//!     --rules test_data/golden/<case>/rules.yaml \
//!     -o test_data/golden/<case>/expected.csv --today 2024-03-01
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tabforge::{EngineConfig, OutputFormat, Tabforge, TabforgeConfig, Writer};

const GOLDEN_DIR: &str = "../../test_data/golden";

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn rules_path(test_dir: &Path) -> PathBuf {
    ["rules.yaml", "rules.yml", "rules.json"]
        .iter()
        .map(|name| test_dir.join(name))
        .find(|p| p.exists())
        .unwrap_or_else(|| panic!("No rules file in {:?}", test_dir))
}

/// Run a golden case and return (actual, expected, changed).
fn run_golden(case: &str) -> (String, String, bool) {
    let test_dir = Path::new(GOLDEN_DIR).join(case);

    let tabforge = Tabforge::with_config(TabforgeConfig {
        engine: EngineConfig {
            reference_date: Some(reference_date()),
            ..Default::default()
        },
        ..Default::default()
    });

    let result = tabforge
        .ingest(test_dir.join("input.csv"), rules_path(&test_dir))
        .unwrap_or_else(|e| panic!("Golden case '{}' failed: {}", case, e));

    let actual = Writer::new(OutputFormat::Csv)
        .render(&result.outcome.dataset)
        .unwrap();

    let expected_path = test_dir.join("expected.csv");
    let expected = fs::read_to_string(&expected_path)
        .unwrap_or_else(|e| panic!("Failed to read {:?}: {}", expected_path, e));

    (actual, expected, result.outcome.changed)
}

macro_rules! golden_test {
    ($name:ident, $case:literal, changed = $changed:literal) => {
        #[test]
        fn $name() {
            let (actual, expected, changed) = run_golden($case);
            assert_eq!(
                actual, expected,
                "Golden case '{}' output differs from expected.csv",
                $case
            );
            assert_eq!(changed, $changed, "Golden case '{}' change flag", $case);
        }
    };
}

golden_test!(golden_cards, "cards", changed = true);
golden_test!(golden_no_op, "no_op", changed = false);

#[test]
fn test_golden_output_is_deterministic() {
    let first = run_golden("cards");
    let second = run_golden("cards");
    assert_eq!(first.0, second.0);
}
