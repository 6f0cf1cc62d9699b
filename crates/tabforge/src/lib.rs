//! Tabforge: declarative column transformations for tabular datasets.
//!
//! A rule document names columns and the operations to run on each one:
//! type casts, value maps, renames, date-diff derivation and length filters.
//! The engine applies them to an in-memory [`Dataset`] and reports whether
//! anything changed.
//!
//! # Core Principles
//!
//! - **Non-destructive**: the caller's dataset is never modified
//! - **All or nothing**: any failing operation aborts the whole transformation
//! - **Fixed order**: cast, then map, then rename, then date-diff, then length
//!
//! # Example
//!
//! ```
//! use tabforge::{Column, Dataset, RuleSet, TransformEngine, Value};
//!
//! let data = Dataset::new(vec![Column::new("Has Chip", ["YES", "NO", "YES"])]).unwrap();
//! let rules = RuleSet::from_yaml_str("Has Chip:\n  map:\n    YES: 1\n    NO: 0\n").unwrap();
//!
//! let outcome = TransformEngine::new().apply(&data, &rules).unwrap();
//! assert!(outcome.changed);
//! assert_eq!(
//!     outcome.dataset.column("Has Chip").unwrap().values,
//!     vec![Value::Integer(1), Value::Integer(0), Value::Integer(1)]
//! );
//! ```

pub mod assistant;
pub mod dataset;
pub mod error;
pub mod input;
pub mod output;
pub mod rules;
pub mod transform;

mod tabforge;

pub use crate::tabforge::{IngestResult, Tabforge, TabforgeConfig};
pub use dataset::{Column, DataType, Dataset, Value};
pub use error::{Result, TabforgeError};
pub use input::{Parser, ParserConfig, SourceMetadata};
pub use output::{OutputFormat, Writer};
pub use rules::{ColumnRules, DateReference, Operation, RuleFormat, RuleSet};
pub use transform::{
    EngineConfig, LengthPolicy, RowAudit, TransformChange, TransformEngine, TransformOutcome,
    TransformReport,
};
