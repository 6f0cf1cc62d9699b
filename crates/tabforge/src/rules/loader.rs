//! Parsing of rule documents (JSON or YAML) into a [`RuleSet`].

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use tracing::debug;

use crate::dataset::{DataType, Value};
use crate::error::{Result, TabforgeError};

use super::operation::{ColumnRules, DateReference, Operation, ValueMap};
use super::ruleset::RuleSet;

/// Serialization format of a rule document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Json,
    Yaml,
}

impl RuleFormat {
    /// Determine the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "json" => Some(RuleFormat::Json),
            "yaml" | "yml" => Some(RuleFormat::Yaml),
            _ => None,
        }
    }

    /// Guess the format from content: a leading `{` means JSON.
    pub fn sniff(text: &str) -> Self {
        if text.trim_start().starts_with('{') {
            RuleFormat::Json
        } else {
            RuleFormat::Yaml
        }
    }
}

/// A scalar used as a mapping key, kept as its display form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ScalarKey(String);

impl<'de> Deserialize<'de> for ScalarKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = ScalarKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, number or boolean key")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ScalarKey, E> {
                Ok(ScalarKey(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<ScalarKey, E> {
                Ok(ScalarKey(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<ScalarKey, E> {
                Ok(ScalarKey(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<ScalarKey, E> {
                Ok(ScalarKey(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<ScalarKey, E> {
                Ok(ScalarKey(v.to_string()))
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

/// Mapping entries in document order, repeated keys included.
#[derive(Debug)]
struct Entries<V>(Vec<(ScalarKey, V)>);

impl<V> Entries<V> {
    /// The first key that appears more than once.
    fn duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.0
            .iter()
            .map(|(ScalarKey(key), _)| key.as_str())
            .find(|key| !seen.insert(*key))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Entries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = Entries<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Entries<V>, A::Error> {
                let mut entries = Vec::new();
                while let Some(entry) = access.next_entry()? {
                    entries.push(entry);
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// A scalar mapping target.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

fn scalar_value(raw: Option<RawScalar>) -> Value {
    match raw {
        None => Value::Null,
        Some(RawScalar::Boolean(b)) => Value::Boolean(b),
        Some(RawScalar::Integer(i)) => Value::Integer(i),
        Some(RawScalar::Float(x)) => Value::Float(x),
        Some(RawScalar::Text(s)) => Value::Text(s),
    }
}

/// One column's record as written in the document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawColumnRules {
    astype: Option<String>,
    map: Option<Entries<Option<RawScalar>>>,
    rename: Option<String>,
    datediff: Option<String>,
    len: Option<i64>,
}

type RawDocument = Entries<Option<RawColumnRules>>;

impl RuleSet {
    /// Parse a rule document in the given format.
    pub fn parse(text: &str, format: RuleFormat) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(RuleSet::new());
        }

        let raw: RawDocument = match format {
            RuleFormat::Json => serde_json::from_str(text).map_err(|e| TabforgeError::RuleSet {
                location: format!("line {}, column {}", e.line(), e.column()),
                message: e.to_string(),
            })?,
            RuleFormat::Yaml => serde_yaml::from_str(text).map_err(|e| TabforgeError::RuleSet {
                location: e
                    .location()
                    .map(|loc| format!("line {}, column {}", loc.line(), loc.column()))
                    .unwrap_or_else(|| "document".to_string()),
                message: e.to_string(),
            })?,
        };

        if let Some(column) = raw.duplicate() {
            return Err(TabforgeError::RuleSet {
                location: format!("column '{}'", column),
                message: "column is listed more than once".to_string(),
            });
        }

        let mut rules = RuleSet::new();
        for (ScalarKey(column), record) in raw.0 {
            let column_rules = match record {
                Some(record) => validate_column(&column, record)?,
                None => ColumnRules::default(),
            };
            rules.insert(column, column_rules);
        }

        debug!(
            columns = rules.len(),
            operations = rules.operation_count(),
            "Parsed rule set"
        );
        Ok(rules)
    }

    /// Parse a JSON rule document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::parse(text, RuleFormat::Json)
    }

    /// Parse a YAML rule document.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Self::parse(text, RuleFormat::Yaml)
    }

    /// Load a rule document from a file.
    ///
    /// The format comes from the extension, falling back to content sniffing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| TabforgeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let format = RuleFormat::from_path(path).unwrap_or_else(|| RuleFormat::sniff(&text));
        Self::parse(&text, format)
    }
}

impl std::str::FromStr for RuleSet {
    type Err = TabforgeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s, RuleFormat::sniff(s))
    }
}

/// Turn a raw record into typed operations.
fn validate_column(column: &str, raw: RawColumnRules) -> Result<ColumnRules> {
    let mut rules = ColumnRules::default();

    if let Some(type_name) = raw.astype {
        let target: DataType = type_name
            .parse()
            .map_err(|msg: String| TabforgeError::rule(column, "astype", msg))?;
        rules = rules.with(Operation::Cast(target));
    }

    if let Some(raw_map) = raw.map {
        if let Some(key) = raw_map.duplicate() {
            return Err(TabforgeError::rule(
                column,
                "map",
                format!("key '{}' is listed more than once", key),
            ));
        }
        let mapping: ValueMap = raw_map
            .0
            .into_iter()
            .map(|(ScalarKey(from), to)| (from, scalar_value(to)))
            .collect();
        rules = rules.with(Operation::Map(mapping));
    }

    if let Some(new_name) = raw.rename {
        if new_name.trim().is_empty() {
            return Err(TabforgeError::rule(column, "rename", "new name must not be empty"));
        }
        rules = rules.with(Operation::Rename(new_name));
    }

    if let Some(reference) = raw.datediff {
        let reference = DateReference::parse(&reference).ok_or_else(|| {
            TabforgeError::rule(
                column,
                "datediff",
                format!("reference '{}' must be 'today' or a YYYY-MM-DD date", reference),
            )
        })?;
        rules = rules.with(Operation::DateDiff(reference));
    }

    if let Some(expected) = raw.len {
        let expected = usize::try_from(expected).map_err(|_| {
            TabforgeError::rule(column, "len", format!("length {} must not be negative", expected))
        })?;
        rules = rules.with(Operation::Length(expected));
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML_RULES: &str = r#"
Has Chip:
  map:
    YES: 1
    NO: 0
Card Number:
  astype: str
  len: 16
Acct Open Date:
  astype: date
  rename: account_open_date
  datediff: today
"#;

    #[test]
    fn test_parse_yaml_document() {
        let rules = RuleSet::from_yaml_str(YAML_RULES).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules.operation_count(), 6);

        let chip = rules.get("Has Chip").unwrap();
        match &chip.operations()[0] {
            Operation::Map(mapping) => {
                assert_eq!(mapping.get("YES"), Some(&Value::Integer(1)));
                assert_eq!(mapping.get("NO"), Some(&Value::Integer(0)));
            }
            other => panic!("expected map, got {:?}", other),
        }

        let open = rules.get("Acct Open Date").unwrap();
        let keys: Vec<_> = open.operations().iter().map(Operation::key).collect();
        assert_eq!(keys, vec!["astype", "rename", "datediff"]);
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let json = r#"{
            "Has Chip": {"map": {"YES": 1, "NO": 0}},
            "Card Number": {"len": 16, "astype": "str"},
            "Acct Open Date": {"datediff": "today", "rename": "account_open_date", "astype": "date"}
        }"#;
        assert_eq!(
            RuleSet::from_json_str(json).unwrap(),
            RuleSet::from_yaml_str(YAML_RULES).unwrap()
        );
    }

    #[test]
    fn test_unknown_operation_rejected_with_location() {
        let err = RuleSet::from_yaml_str("amount:\n  astype: float\n  scale: 100\n").unwrap_err();
        match err {
            TabforgeError::RuleSet { location, message } => {
                assert!(location.starts_with("line"), "location: {}", location);
                assert!(message.contains("scale"), "message: {}", message);
            }
            other => panic!("expected rule set error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_operation_rejected_json() {
        let err = RuleSet::from_json_str(r#"{"amount": {"cast": "float"}}"#).unwrap_err();
        assert!(matches!(err, TabforgeError::RuleSet { .. }));
    }

    #[test]
    fn test_unsupported_type_names_column() {
        let err = RuleSet::from_yaml_str("amount:\n  astype: money\n").unwrap_err();
        match err {
            TabforgeError::RuleSet { location, .. } => {
                assert_eq!(location, "column 'amount' → astype");
            }
            other => panic!("expected rule set error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_datediff_reference() {
        let err = RuleSet::from_yaml_str("opened:\n  datediff: last week\n").unwrap_err();
        assert!(matches!(err, TabforgeError::RuleSet { .. }));
    }

    #[test]
    fn test_negative_length_rejected() {
        let err = RuleSet::from_yaml_str("zip:\n  len: -5\n").unwrap_err();
        assert!(matches!(err, TabforgeError::RuleSet { .. }));
    }

    #[test]
    fn test_duplicate_column_rejected_json() {
        let err = RuleSet::from_json_str(r#"{"a": {"rename": "x"}, "a": {"astype": "int"}}"#)
            .unwrap_err();
        match err {
            TabforgeError::RuleSet { location, .. } => assert_eq!(location, "column 'a'"),
            other => panic!("expected rule set error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_column_rejected_yaml() {
        let err = RuleSet::from_yaml_str("Has Chip:\n  rename: chip\nHas Chip:\n  astype: int\n")
            .unwrap_err();
        assert!(matches!(err, TabforgeError::RuleSet { .. }));
        assert!(err.to_string().contains("Has Chip"));
    }

    #[test]
    fn test_duplicate_map_key_rejected() {
        let err = RuleSet::from_json_str(r#"{"Has Chip": {"map": {"YES": 1, "YES": 0}}}"#)
            .unwrap_err();
        match err {
            TabforgeError::RuleSet { location, message } => {
                assert_eq!(location, "column 'Has Chip' → map");
                assert!(message.contains("YES"));
            }
            other => panic!("expected rule set error, got {:?}", other),
        }
    }

    #[test]
    fn test_top_level_must_be_mapping() {
        let err = RuleSet::from_yaml_str("- astype: int\n").unwrap_err();
        assert!(matches!(err, TabforgeError::RuleSet { .. }));
    }

    #[test]
    fn test_empty_entries_are_noops() {
        let rules = RuleSet::from_yaml_str("notes:\nid: {}\n").unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.operation_count(), 0);
    }

    #[test]
    fn test_empty_document() {
        assert!(RuleSet::from_yaml_str("").unwrap().is_empty());
        assert!(RuleSet::from_json_str("{}").unwrap().is_empty());
    }

    #[test]
    fn test_numeric_and_null_map_entries() {
        let rules = RuleSet::from_yaml_str("flag:\n  map:\n    1: yes\n    0: ~\n").unwrap();
        match &rules.get("flag").unwrap().operations()[0] {
            Operation::Map(mapping) => {
                assert_eq!(mapping.get("1"), Some(&Value::from("yes")));
                assert_eq!(mapping.get("0"), Some(&Value::Null));
            }
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(RuleFormat::from_path(Path::new("r.yml")), Some(RuleFormat::Yaml));
        assert_eq!(RuleFormat::from_path(Path::new("r.JSON")), Some(RuleFormat::Json));
        assert_eq!(RuleFormat::from_path(Path::new("rules")), None);
        assert_eq!(RuleFormat::sniff("  {\"a\": {}}"), RuleFormat::Json);
        assert_eq!(RuleFormat::sniff("a: {}"), RuleFormat::Yaml);
    }

    #[test]
    fn test_from_str_sniffs() {
        let rules: RuleSet = r#"{"a": {"rename": "b"}}"#.parse().unwrap();
        assert_eq!(rules.operation_count(), 1);
    }
}
