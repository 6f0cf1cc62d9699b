//! Rule-driven column transformations.

mod cast;
mod engine;
mod operations;

pub use cast::cast_value;
pub use engine::{EngineConfig, LengthPolicy, TransformEngine, DATEDIFF_SUFFIX};
pub use operations::{RowAudit, TransformChange, TransformOutcome, TransformReport};
