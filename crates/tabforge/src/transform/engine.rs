//! Transformation engine that applies rule sets to datasets.

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::dataset::{parse_date, Column, DataType, Dataset, Value};
use crate::error::{Result, TabforgeError};
use crate::rules::{ColumnRules, DateReference, Operation, RuleSet, ValueMap};

use super::cast::cast_value;
use super::operations::{RowAudit, TransformChange, TransformOutcome, TransformReport};

/// Suffix appended to a column's name to form its date-diff column.
pub const DATEDIFF_SUFFIX: &str = "_datediff";

/// What to do with rows that fail a `len` rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LengthPolicy {
    /// Drop the row from every column.
    #[default]
    Filter,
    /// Abort the transformation with [`TabforgeError::LengthMismatch`].
    Reject,
}

/// Configuration for the transformation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Date used for `datediff: today` (None = local date at call time).
    pub reference_date: Option<NaiveDate>,
    /// Handling of `len` mismatches.
    pub length_policy: LengthPolicy,
    /// Record per-row audits in the report.
    pub record_audits: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference_date: None,
            length_policy: LengthPolicy::Filter,
            record_audits: true,
        }
    }
}

/// Engine for applying rule sets to datasets.
///
/// The engine holds configuration only; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct TransformEngine {
    config: EngineConfig,
}

impl TransformEngine {
    /// Create a new transform engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Pin the date that `today` resolves to.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.config.reference_date = Some(date);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The date `today` resolves to for this engine.
    pub fn today(&self) -> NaiveDate {
        self.config
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    /// Apply a rule set to a dataset.
    ///
    /// The input is never modified. On error no partial result is returned.
    pub fn apply(&self, dataset: &Dataset, rules: &RuleSet) -> Result<TransformOutcome> {
        let today = self.today();
        let mut working = dataset.clone();
        let mut report = TransformReport::new();
        let mut keep = vec![true; dataset.row_count()];

        for (column, _) in rules.columns() {
            if dataset.column_index(column).is_none() {
                debug!(column, "No such column in dataset, rules ignored");
            }
        }

        // Resolve against the input's names so a rename never hides a column
        // from its own later operations.
        let targets: Vec<(usize, &ColumnRules)> = dataset
            .columns()
            .iter()
            .enumerate()
            .filter_map(|(index, column)| rules.get(&column.name).map(|r| (index, r)))
            .collect();

        for (index, column_rules) in targets {
            for op in column_rules.operations() {
                let change = match op {
                    Operation::Cast(target) => self.apply_cast(&mut working, index, *target)?,
                    Operation::Map(mapping) => self.apply_map(&mut working, index, mapping)?,
                    Operation::Rename(new_name) => {
                        let renamed = dataset.columns()[index].name != *new_name;
                        let change = self.apply_rename(&mut working, index, new_name)?;
                        if renamed {
                            report.columns_renamed += 1;
                        }
                        change
                    }
                    Operation::DateDiff(reference) => {
                        let change = self.apply_datediff(&mut working, index, reference, today)?;
                        report.columns_added += 1;
                        change
                    }
                    Operation::Length(expected) => {
                        self.apply_length(&working, index, *expected, &mut keep)?
                    }
                };
                debug!(
                    column = %change.column,
                    operation = %change.operation,
                    values_changed = change.values_changed,
                    "Applied operation"
                );
                report.add_change(change);
            }
        }

        let removed = keep.iter().filter(|k| !**k).count();
        if removed > 0 {
            working.retain_rows(&keep);
            report.rows_removed = removed;
        }

        let changed = working != *dataset;
        info!(
            operations = report.operations_applied,
            values_changed = report.values_changed,
            columns_added = report.columns_added,
            rows_removed = report.rows_removed,
            changed,
            "Transformation complete"
        );

        Ok(TransformOutcome {
            dataset: working,
            changed,
            report,
        })
    }

    /// Apply a type cast to every value of a column.
    fn apply_cast(
        &self,
        data: &mut Dataset,
        index: usize,
        target: DataType,
    ) -> Result<TransformChange> {
        let column = column_mut(data, index)?;
        let mut cast = Vec::with_capacity(column.len());
        for (row, value) in column.values.iter().enumerate() {
            let coerced = cast_value(value, target).ok_or_else(|| TabforgeError::Cast {
                column: column.name.clone(),
                row,
                value: value.to_string(),
                target: target.to_string(),
            })?;
            cast.push(coerced);
        }

        let mut changed = 0;
        let mut row_audits = Vec::new();
        for (row, (old, new)) in column.values.iter_mut().zip(cast).enumerate() {
            if *old != new {
                if self.config.record_audits {
                    row_audits.push(RowAudit {
                        row,
                        column: column.name.clone(),
                        original_value: old.to_string(),
                        new_value: new.to_string(),
                        operation: "astype".to_string(),
                    });
                }
                *old = new;
                changed += 1;
            }
        }

        Ok(TransformChange {
            operation: "astype".to_string(),
            description: format!("Cast '{}' to {}", column.name, target),
            column: column.name.clone(),
            values_changed: changed,
            row_audits,
        })
    }

    /// Apply a value mapping; unmapped values pass through.
    fn apply_map(
        &self,
        data: &mut Dataset,
        index: usize,
        mapping: &ValueMap,
    ) -> Result<TransformChange> {
        let column = column_mut(data, index)?;
        let mut changed = 0;
        let mut row_audits = Vec::new();

        for (row, value) in column.values.iter_mut().enumerate() {
            if value.is_null() {
                continue;
            }
            let key = value.to_string();
            if let Some(new_value) = mapping.get(&key) {
                if *new_value == *value {
                    continue;
                }
                if self.config.record_audits {
                    row_audits.push(RowAudit {
                        row,
                        column: column.name.clone(),
                        original_value: key.clone(),
                        new_value: new_value.to_string(),
                        operation: "map".to_string(),
                    });
                }
                *value = new_value.clone();
                changed += 1;
            }
        }

        let examples: Vec<String> = mapping
            .iter()
            .take(2)
            .map(|(from, to)| format!("'{}' → '{}'", from, to))
            .collect();

        Ok(TransformChange {
            operation: "map".to_string(),
            description: format!("Mapped '{}': {}", column.name, examples.join(", ")),
            column: column.name.clone(),
            values_changed: changed,
            row_audits,
        })
    }

    /// Rename a column, refusing to overwrite another.
    fn apply_rename(
        &self,
        data: &mut Dataset,
        index: usize,
        new_name: &str,
    ) -> Result<TransformChange> {
        let old_name = column_mut(data, index)?.name.clone();
        data.rename_column(index, new_name)?;

        Ok(TransformChange {
            operation: "rename".to_string(),
            description: format!("Renamed '{}' → '{}'", old_name, new_name),
            column: new_name.to_string(),
            values_changed: 0,
            row_audits: Vec::new(),
        })
    }

    /// Append `<column>_datediff` holding `reference - value` in whole days.
    fn apply_datediff(
        &self,
        data: &mut Dataset,
        index: usize,
        reference: &DateReference,
        today: NaiveDate,
    ) -> Result<TransformChange> {
        let reference_date = reference.resolve(today);
        let source = column_mut(data, index)?;
        let derived_name = format!("{}{}", source.name, DATEDIFF_SUFFIX);

        let mut days = Vec::with_capacity(source.len());
        for (row, value) in source.values.iter().enumerate() {
            let date = match value {
                Value::Null => {
                    days.push(Value::Null);
                    continue;
                }
                Value::Date(d) => Some(*d),
                Value::Text(s) => parse_date(s),
                _ => None,
            };
            let date = date.ok_or_else(|| TabforgeError::UnparseableDate {
                column: source.name.clone(),
                row,
                value: value.to_string(),
            })?;
            days.push(Value::Integer((reference_date - date).num_days()));
        }

        let source_name = source.name.clone();
        if data.column_index(&derived_name).is_some() {
            return Err(TabforgeError::NameCollision {
                column: source_name,
                target: derived_name,
            });
        }
        let added = days.iter().filter(|v| !v.is_null()).count();
        data.push_column(Column {
            name: derived_name.clone(),
            values: days,
        })?;

        Ok(TransformChange {
            operation: "datediff".to_string(),
            description: format!(
                "Derived '{}' as days from '{}' to {}",
                derived_name, source_name, reference_date
            ),
            column: derived_name,
            values_changed: added,
            row_audits: Vec::new(),
        })
    }

    /// Flag rows whose value length differs from `expected`.
    ///
    /// Rows are only marked here; removal happens once all columns are done.
    fn apply_length(
        &self,
        data: &Dataset,
        index: usize,
        expected: usize,
        keep: &mut [bool],
    ) -> Result<TransformChange> {
        let column = data.column_at(index).ok_or_else(|| missing_column(index))?;
        let mut flagged = 0;
        let mut row_audits = Vec::new();

        for (row, value) in column.values.iter().enumerate() {
            if value.is_null() {
                continue;
            }
            let text = value.to_string();
            if text.chars().count() == expected {
                continue;
            }
            if self.config.length_policy == LengthPolicy::Reject {
                return Err(TabforgeError::LengthMismatch {
                    column: column.name.clone(),
                    row,
                    value: text,
                    expected,
                });
            }
            if self.config.record_audits {
                row_audits.push(RowAudit {
                    row,
                    column: column.name.clone(),
                    original_value: text,
                    new_value: String::new(),
                    operation: "len".to_string(),
                });
            }
            if let Some(slot) = keep.get_mut(row) {
                *slot = false;
            }
            flagged += 1;
        }

        Ok(TransformChange {
            operation: "len".to_string(),
            description: format!(
                "Dropped {} row(s) where '{}' is not {} characters",
                flagged, column.name, expected
            ),
            column: column.name.clone(),
            values_changed: flagged,
            row_audits,
        })
    }
}

fn column_mut(data: &mut Dataset, index: usize) -> Result<&mut Column> {
    data.column_at_mut(index).ok_or_else(|| missing_column(index))
}

fn missing_column(index: usize) -> TabforgeError {
    TabforgeError::InvalidDataset(format!("no column at position {}", index))
}
