//! Offline helpers for the SQL chat assistant: prompt construction, SQL
//! extraction and vetting, and chart selection for query results.
//!
//! The model call and chart rendering live with the caller.

mod chart;
mod prompt;
mod sql;

pub use chart::{infer_chart, ChartKind, ChartSpec};
pub use prompt::{system_prompt, ColumnContext, TableContext};
pub use sql::{extract_sql, SqlGuard};
