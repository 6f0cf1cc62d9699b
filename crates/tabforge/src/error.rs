//! Error types for the Tabforge library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Tabforge operations.
#[derive(Debug, Error)]
pub enum TabforgeError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed rule document.
    #[error("Invalid rule set at {location}: {message}")]
    RuleSet { location: String, message: String },

    /// A value could not be coerced to the requested type.
    #[error("Cannot cast value '{value}' in column '{column}' (row {row}) to {target}")]
    Cast {
        column: String,
        row: usize,
        value: String,
        target: String,
    },

    /// A rename or derived column would overwrite an existing column.
    #[error("Cannot name column '{column}' as '{target}': a column with that name already exists")]
    NameCollision { column: String, target: String },

    /// A date-diff source value is not a valid date.
    #[error("Unparseable date '{value}' in column '{column}' (row {row})")]
    UnparseableDate {
        column: String,
        row: usize,
        value: String,
    },

    /// A value failed a length rule under the reject policy.
    #[error("Value '{value}' in column '{column}' (row {row}) does not have length {expected}")]
    LengthMismatch {
        column: String,
        row: usize,
        value: String,
        expected: usize,
    },

    /// Dataset shape violates an invariant (duplicate names, ragged columns).
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// SQL statement rejected by the read-only guard.
    #[error("Unsafe SQL: {0}")]
    UnsafeSql(String),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to load.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TabforgeError {
    /// Build a rule set error for a specific column and operation.
    pub(crate) fn rule(column: &str, op: &str, message: impl Into<String>) -> Self {
        TabforgeError::RuleSet {
            location: format!("column '{}' → {}", column, op),
            message: message.into(),
        }
    }
}

/// Result type alias for Tabforge operations.
pub type Result<T> = std::result::Result<T, TabforgeError>;
