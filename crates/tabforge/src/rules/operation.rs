//! Column operations that a rule set can request.

use std::fmt;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::dataset::{DataType, Value};

/// Value substitution table, keyed by the display form of the source value.
pub type ValueMap = IndexMap<String, Value>;

/// Reference point for date-diff derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateReference {
    /// The date the transformation runs.
    Today,
    /// A fixed calendar date.
    Date(NaiveDate),
}

impl DateReference {
    /// Resolve to a concrete date given the engine's notion of today.
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        match self {
            DateReference::Today => today,
            DateReference::Date(d) => *d,
        }
    }

    /// Parse `today` (any case) or an ISO `YYYY-MM-DD` date.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("today") {
            return Some(DateReference::Today);
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .map(DateReference::Date)
    }
}

impl fmt::Display for DateReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateReference::Today => f.write_str("today"),
            DateReference::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for DateReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single operation applied to one column.
///
/// Variants are declared in application order; see [`Operation::stage`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Cast every value to the target type.
    Cast(DataType),
    /// Replace known values, leave the rest.
    Map(ValueMap),
    /// Rename the column.
    Rename(String),
    /// Derive `<column>_datediff` holding `reference - value` in days.
    DateDiff(DateReference),
    /// Keep only rows whose value has this many characters.
    Length(usize),
}

impl Operation {
    /// Position of this operation in the fixed per-column order.
    pub fn stage(&self) -> u8 {
        match self {
            Operation::Cast(_) => 0,
            Operation::Map(_) => 1,
            Operation::Rename(_) => 2,
            Operation::DateDiff(_) => 3,
            Operation::Length(_) => 4,
        }
    }

    /// Key used for this operation in rule documents.
    pub fn key(&self) -> &'static str {
        match self {
            Operation::Cast(_) => "astype",
            Operation::Map(_) => "map",
            Operation::Rename(_) => "rename",
            Operation::DateDiff(_) => "datediff",
            Operation::Length(_) => "len",
        }
    }

    /// Get a human-readable description of the operation.
    pub fn description(&self) -> String {
        match self {
            Operation::Cast(target) => format!("cast to {}", target),
            Operation::Map(mapping) => {
                let examples: Vec<String> = mapping
                    .iter()
                    .take(3)
                    .map(|(from, to)| format!("'{}' → '{}'", from, to))
                    .collect();
                let more = if mapping.len() > 3 {
                    format!(" (+{} more)", mapping.len() - 3)
                } else {
                    String::new()
                };
                format!("map {}{}", examples.join(", "), more)
            }
            Operation::Rename(to) => format!("rename to '{}'", to),
            Operation::DateDiff(reference) => {
                format!("days since value, relative to {}", reference)
            }
            Operation::Length(expected) => format!("keep rows with length {}", expected),
        }
    }
}

/// Ordered operations for one column, at most one per kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnRules {
    ops: Vec<Operation>,
}

impl ColumnRules {
    /// Create rules from a list of operations.
    ///
    /// Operations are sorted into application order; a later operation of the
    /// same kind replaces an earlier one.
    pub fn new(ops: impl IntoIterator<Item = Operation>) -> Self {
        ops.into_iter().fold(Self::default(), Self::with)
    }

    /// Add an operation, replacing any existing one of the same kind.
    pub fn with(mut self, op: Operation) -> Self {
        self.ops.retain(|existing| existing.stage() != op.stage());
        let at = self
            .ops
            .iter()
            .position(|existing| existing.stage() > op.stage())
            .unwrap_or(self.ops.len());
        self.ops.insert(at, op);
        self
    }

    /// Operations in application order.
    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}

impl Serialize for ColumnRules {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.ops.len()))?;
        for op in &self.ops {
            match op {
                Operation::Cast(target) => map.serialize_entry(op.key(), target)?,
                Operation::Map(mapping) => map.serialize_entry(op.key(), mapping)?,
                Operation::Rename(to) => map.serialize_entry(op.key(), to)?,
                Operation::DateDiff(reference) => map.serialize_entry(op.key(), reference)?,
                Operation::Length(expected) => map.serialize_entry(op.key(), expected)?,
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_rules_sorted_into_fixed_order() {
        let rules = ColumnRules::new([
            Operation::DateDiff(DateReference::Today),
            Operation::Rename("opened".into()),
            Operation::Cast(DataType::Date),
        ]);
        let keys: Vec<_> = rules.operations().iter().map(Operation::key).collect();
        assert_eq!(keys, vec!["astype", "rename", "datediff"]);
    }

    #[test]
    fn test_column_rules_replace_same_kind() {
        let rules = ColumnRules::default()
            .with(Operation::Rename("a".into()))
            .with(Operation::Rename("b".into()));
        assert_eq!(rules.operations(), &[Operation::Rename("b".into())]);
    }

    #[test]
    fn test_date_reference_parse() {
        assert_eq!(DateReference::parse("Today"), Some(DateReference::Today));
        assert_eq!(
            DateReference::parse("2024-06-01"),
            Some(DateReference::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()))
        );
        assert_eq!(DateReference::parse("yesterday"), None);
    }

    #[test]
    fn test_serialize_as_document() {
        let mut mapping = ValueMap::new();
        mapping.insert("YES".into(), Value::Integer(1));
        let rules = ColumnRules::new([
            Operation::Map(mapping),
            Operation::Cast(DataType::Text),
        ]);
        let json = serde_json::to_string(&rules).unwrap();
        assert_eq!(json, r#"{"astype":"text","map":{"YES":1}}"#);
    }
}
