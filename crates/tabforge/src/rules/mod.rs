//! Declarative rule sets: operation types and the document loader.

mod loader;
mod operation;
mod ruleset;

pub use loader::RuleFormat;
pub use operation::{ColumnRules, DateReference, Operation, ValueMap};
pub use ruleset::RuleSet;
