//! Transformation results and audit records.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;

/// Output of a successful transformation.
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    /// The transformed working copy.
    pub dataset: Dataset,

    /// Whether `dataset` differs from the input in shape, names or values.
    pub changed: bool,

    /// What each operation did.
    pub report: TransformReport,
}

/// Result of applying transformations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformReport {
    /// Number of operations applied.
    pub operations_applied: usize,

    /// Number of cell values modified.
    pub values_changed: usize,

    /// Number of columns added.
    pub columns_added: usize,

    /// Number of columns renamed.
    pub columns_renamed: usize,

    /// Number of rows removed by length rules.
    pub rows_removed: usize,

    /// Detailed changes for each operation.
    pub changes: Vec<TransformChange>,
}

/// A single operation's effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformChange {
    /// Rule document key of the operation (`astype`, `map`, ...).
    pub operation: String,

    /// Description of the change.
    pub description: String,

    /// Column affected, by its name after the operation.
    pub column: String,

    /// Number of values changed (or rows flagged, for length rules).
    pub values_changed: usize,

    /// Per-row audit information.
    pub row_audits: Vec<RowAudit>,
}

/// Audit information for a single cell change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowAudit {
    /// Row index (0-based) in the input dataset.
    pub row: usize,

    /// Column that was changed.
    pub column: String,

    /// Original value before transformation.
    pub original_value: String,

    /// New value after transformation.
    pub new_value: String,

    /// Operation that produced the change.
    pub operation: String,
}

impl TransformReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self {
            operations_applied: 0,
            values_changed: 0,
            columns_added: 0,
            columns_renamed: 0,
            rows_removed: 0,
            changes: Vec::new(),
        }
    }

    /// Add a change to the report.
    pub fn add_change(&mut self, change: TransformChange) {
        self.operations_applied += 1;
        self.values_changed += change.values_changed;
        self.changes.push(change);
    }

    /// Iterate over every row audit in application order.
    pub fn row_audits(&self) -> impl Iterator<Item = &RowAudit> {
        self.changes.iter().flat_map(|c| c.row_audits.iter())
    }
}

impl Default for TransformReport {
    fn default() -> Self {
        Self::new()
    }
}
