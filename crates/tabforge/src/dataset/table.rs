//! In-memory table of named columns.

use std::collections::HashSet;

use crate::error::{Result, TabforgeError};

use super::column::Column;
use super::types::Value;

/// An ordered set of uniquely named columns with a uniform row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Create a dataset, validating unique names and uniform row count.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TabforgeError::InvalidDataset(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }

        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(ragged) = columns.iter().find(|c| c.len() != expected) {
                return Err(TabforgeError::InvalidDataset(format!(
                    "column '{}' has {} rows, expected {}",
                    ragged.name,
                    ragged.len(),
                    expected
                )));
            }
        }

        Ok(Self { columns })
    }

    /// Build a dataset from headers and row-major values.
    ///
    /// Short rows are padded with nulls and long rows truncated.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut columns: Vec<Column> = headers
            .into_iter()
            .map(|name| Column {
                name,
                values: Vec::with_capacity(rows.len()),
            })
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.values.push(cells.next().unwrap_or(Value::Null));
            }
        }

        Self::new(columns)
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get a column by position.
    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub(crate) fn column_at_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.columns.get(col).and_then(|c| c.values.get(row))
    }

    /// Iterate over rows as vectors of cell references.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count()).map(move |row| {
            self.columns
                .iter()
                .map(|c| &c.values[row])
                .collect()
        })
    }

    /// Append a column, rejecting duplicate names and mismatched lengths.
    pub fn push_column(&mut self, column: Column) -> Result<()> {
        if self.column_index(&column.name).is_some() {
            return Err(TabforgeError::InvalidDataset(format!(
                "duplicate column name '{}'",
                column.name
            )));
        }
        if !self.columns.is_empty() && column.len() != self.row_count() {
            return Err(TabforgeError::InvalidDataset(format!(
                "column '{}' has {} rows, expected {}",
                column.name,
                column.len(),
                self.row_count()
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Rename the column at `index`.
    ///
    /// Renaming to the current name is a no-op; any other existing name is a
    /// collision and leaves the dataset unchanged.
    pub fn rename_column(&mut self, index: usize, new_name: &str) -> Result<()> {
        let current = match self.columns.get(index) {
            Some(c) => c.name.clone(),
            None => {
                return Err(TabforgeError::InvalidDataset(format!(
                    "no column at position {}",
                    index
                )));
            }
        };

        if current == new_name {
            return Ok(());
        }
        if self.column_index(new_name).is_some() {
            return Err(TabforgeError::NameCollision {
                column: current,
                target: new_name.to_string(),
            });
        }

        self.columns[index].name = new_name.to_string();
        Ok(())
    }

    /// Keep only the rows whose flag in `keep` is true.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        for column in self.columns.iter_mut() {
            let mut flags = keep.iter();
            column
                .values
                .retain(|_| flags.next().copied().unwrap_or(true));
        }
    }
}
