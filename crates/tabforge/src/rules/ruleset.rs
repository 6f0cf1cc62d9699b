//! Per-column rule sets.

use indexmap::IndexMap;
use serde::Serialize;

use super::operation::ColumnRules;

/// Mapping from column name to the operations requested for it.
///
/// Column order follows the document; it does not affect application order,
/// which follows the dataset's columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RuleSet {
    columns: IndexMap<String, ColumnRules>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rules for a column.
    pub fn insert(&mut self, column: impl Into<String>, rules: ColumnRules) {
        self.columns.insert(column.into(), rules);
    }

    /// Builder-style variant of [`RuleSet::insert`].
    pub fn with_column(mut self, column: impl Into<String>, rules: ColumnRules) -> Self {
        self.insert(column, rules);
        self
    }

    /// Rules for a column, if any.
    pub fn get(&self, column: &str) -> Option<&ColumnRules> {
        self.columns.get(column)
    }

    /// Iterate over `(column, rules)` in document order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnRules)> {
        self.columns.iter().map(|(name, rules)| (name.as_str(), rules))
    }

    /// Number of column entries.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Total number of operations across all columns.
    pub fn operation_count(&self) -> usize {
        self.columns.values().map(ColumnRules::len).sum()
    }
}
