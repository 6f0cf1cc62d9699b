//! Tabular dataset model: values, columns and tables.

mod column;
mod table;
mod types;

pub use column::Column;
pub use table::Dataset;
pub use types::{is_null_token, parse_date, DataType, Value};
