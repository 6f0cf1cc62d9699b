//! Integration tests for the Tabforge load → transform → write pipeline.

use std::io::Write;

use chrono::{Duration, Local, NaiveDate};
use tempfile::{NamedTempFile, TempDir};

use tabforge::{
    Column, ColumnRules, DataType, Dataset, EngineConfig, LengthPolicy, Operation, OutputFormat,
    RuleSet, Tabforge, TabforgeError, TransformEngine, Value,
};

/// Helper to create a temporary file with given content and suffix.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn chip_data() -> Dataset {
    Dataset::new(vec![Column::new("Has Chip", ["YES", "NO", "YES"])]).unwrap()
}

fn chip_rules() -> RuleSet {
    RuleSet::from_yaml_str("Has Chip:\n  map:\n    \"YES\": 1\n    \"NO\": 0\n").unwrap()
}

// =============================================================================
// Engine behavior
// =============================================================================

#[test]
fn test_has_chip_scenario() {
    let outcome = TransformEngine::new().apply(&chip_data(), &chip_rules()).unwrap();

    assert!(outcome.changed);
    assert_eq!(
        outcome.dataset.column("Has Chip").unwrap().values,
        vec![Value::Integer(1), Value::Integer(0), Value::Integer(1)]
    );
    assert_eq!(outcome.report.values_changed, 3);
}

#[test]
fn test_empty_rules_leave_data_unchanged() {
    let data = chip_data();
    let outcome = TransformEngine::new().apply(&data, &RuleSet::new()).unwrap();

    assert!(!outcome.changed);
    assert_eq!(outcome.dataset, data);
    assert_eq!(outcome.report.operations_applied, 0);
}

#[test]
fn test_rules_for_absent_columns_are_ignored() {
    let data = chip_data();
    let rules = RuleSet::from_yaml_str(
        "Card Brand:\n  astype: int\n  rename: brand\nExpires:\n  datediff: today\n",
    )
    .unwrap();

    let outcome = TransformEngine::new().apply(&data, &rules).unwrap();
    assert!(!outcome.changed);
    assert_eq!(outcome.dataset, data);
}

#[test]
fn test_map_keeps_unmatched_values() {
    let data = Dataset::new(vec![Column::new("Has Chip", ["YES", "NO", "MAYBE"])]).unwrap();
    let outcome = TransformEngine::new().apply(&data, &chip_rules()).unwrap();

    assert!(outcome.changed);
    assert_eq!(
        outcome.dataset.column("Has Chip").unwrap().values,
        vec![Value::Integer(1), Value::Integer(0), Value::from("MAYBE")]
    );
}

#[test]
fn test_cast_failure_is_typed() {
    let data = Dataset::new(vec![Column::new("qty", ["abc"])]).unwrap();
    let rules = RuleSet::new()
        .with_column("qty", ColumnRules::new([Operation::Cast(DataType::Integer)]));

    let err = TransformEngine::new().apply(&data, &rules).unwrap_err();
    match err {
        TabforgeError::Cast {
            column,
            row,
            value,
            target,
        } => {
            assert_eq!(column, "qty");
            assert_eq!(row, 0);
            assert_eq!(value, "abc");
            assert_eq!(target, "integer");
        }
        other => panic!("expected cast error, got {:?}", other),
    }
}

#[test]
fn test_rename_collision_leaves_input_untouched() {
    let data = Dataset::new(vec![
        Column::new("a", [1i64, 2]),
        Column::new("b", [3i64, 4]),
    ])
    .unwrap();
    let before = data.clone();
    let rules = RuleSet::new().with_column("a", ColumnRules::new([Operation::Rename("b".into())]));

    let err = TransformEngine::new().apply(&data, &rules).unwrap_err();
    assert!(matches!(err, TabforgeError::NameCollision { .. }));
    assert_eq!(data, before);
}

#[test]
fn test_datediff_today() {
    let opened = Local::now().date_naive() - Duration::days(10);
    let data = Dataset::new(vec![Column::new(
        "Acct Open Date",
        [opened.format("%Y-%m-%d").to_string()],
    )])
    .unwrap();
    let rules = RuleSet::from_yaml_str("Acct Open Date:\n  datediff: today\n").unwrap();

    let outcome = TransformEngine::new().apply(&data, &rules).unwrap();
    assert!(outcome.changed);
    assert_eq!(
        outcome.dataset.column("Acct Open Date_datediff").unwrap().values,
        vec![Value::Integer(10)]
    );
}

#[test]
fn test_operations_run_in_fixed_order() {
    // Written out of order on purpose: rename first, cast last.
    let rules = RuleSet::from_json_str(
        r#"{"Acct Open Date": {"datediff": "2024-03-01", "rename": "opened", "astype": "date"}}"#,
    )
    .unwrap();
    let data = Dataset::new(vec![Column::new("Acct Open Date", ["2024-02-29"])]).unwrap();

    let outcome = TransformEngine::new().apply(&data, &rules).unwrap();
    let names = outcome.dataset.column_names();
    assert_eq!(names, vec!["opened", "opened_datediff"]);
    assert_eq!(
        outcome.dataset.column("opened").unwrap().values,
        vec![Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())]
    );
    assert_eq!(
        outcome.dataset.column("opened_datediff").unwrap().values,
        vec![Value::Integer(1)]
    );
}

#[test]
fn test_length_policies() {
    let data = Dataset::new(vec![
        Column::new("Card Number", ["4344676511950444", "434467"]),
        Column::new("Brand", ["Visa", "Amex"]),
    ])
    .unwrap();
    let rules = RuleSet::from_yaml_str("Card Number:\n  len: 16\n").unwrap();

    let outcome = TransformEngine::new().apply(&data, &rules).unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.dataset.row_count(), 1);
    assert_eq!(outcome.report.rows_removed, 1);
    assert_eq!(outcome.dataset.get(0, 1), Some(&Value::from("Visa")));

    let strict = TransformEngine::with_config(EngineConfig {
        length_policy: LengthPolicy::Reject,
        ..Default::default()
    });
    let err = strict.apply(&data, &rules).unwrap_err();
    assert!(matches!(err, TabforgeError::LengthMismatch { row: 1, expected: 16, .. }));
}

// =============================================================================
// Rule loading
// =============================================================================

#[test]
fn test_yaml_and_json_documents_agree() {
    let yaml = create_test_file(
        "Card Number:\n  astype: str\n  len: 16\nHas Chip:\n  map:\n    \"YES\": 1\n    \"NO\": 0\n",
        ".yaml",
    );
    let json = create_test_file(
        r#"{"Card Number": {"astype": "str", "len": 16}, "Has Chip": {"map": {"YES": 1, "NO": 0}}}"#,
        ".json",
    );

    let from_yaml = RuleSet::load(yaml.path()).unwrap();
    let from_json = RuleSet::load(json.path()).unwrap();
    assert_eq!(from_yaml, from_json);
    assert_eq!(from_yaml.operation_count(), 3);
}

#[test]
fn test_unknown_operation_is_rejected() {
    let file = create_test_file("Has Chip:\n  upper: true\n", ".yaml");
    let err = RuleSet::load(file.path()).unwrap_err();
    assert!(matches!(err, TabforgeError::RuleSet { .. }));
    assert!(err.to_string().contains("upper"));
}

#[test]
fn test_missing_rules_file() {
    let err = RuleSet::load("/nonexistent/rules.yaml").unwrap_err();
    assert!(matches!(err, TabforgeError::Io { .. }));
}

// =============================================================================
// Full pipeline
// =============================================================================

#[test]
fn test_ingest_and_export() {
    let dir = TempDir::new().unwrap();
    let data_path = dir.path().join("cards.csv");
    let rules_path = dir.path().join("rules.json");
    let out_path = dir.path().join("out").join("cards.json");

    std::fs::write(
        &data_path,
        "Has Chip,Acct Open Date\nYES,2024-02-20\nNO,NA\n",
    )
    .unwrap();
    std::fs::write(
        &rules_path,
        r#"{"Has Chip": {"map": {"YES": true, "NO": false}}, "Acct Open Date": {"datediff": "2024-03-01"}}"#,
    )
    .unwrap();

    let tabforge = Tabforge::new();
    let result = tabforge.ingest(&data_path, &rules_path).unwrap();
    assert_eq!(result.source.row_count, 2);
    assert!(result.source.hash.starts_with("sha256:"));
    assert!(result.outcome.changed);

    tabforge
        .export(&result.outcome.dataset, &out_path, OutputFormat::Json)
        .unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(written[0]["Has Chip"], true);
    assert_eq!(written[0]["Acct Open Date_datediff"], 10);
    assert_eq!(written[1]["Has Chip"], false);
    assert!(written[1]["Acct Open Date_datediff"].is_null());
}

#[test]
fn test_ingest_reports_bad_rules_before_data() {
    let rules = create_test_file("Has Chip:\n  astype: complex\n", ".yaml");
    let err = Tabforge::new()
        .ingest("/nonexistent/data.csv", rules.path())
        .unwrap_err();

    assert!(matches!(err, TabforgeError::RuleSet { .. }));
    assert!(err.to_string().contains("Has Chip"));
}
