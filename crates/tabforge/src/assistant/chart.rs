//! Chart-type inference for query results.

use serde::Serialize;

use crate::dataset::{parse_date, Column, DataType, Dataset, Value};

/// Kind of chart suited to a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// A single value.
    Metric,
    /// Numeric series over time.
    Line,
    /// Numeric values per category.
    Bar,
    /// Two numeric measures against each other.
    Scatter,
    /// Anything else; show the rows.
    Table,
}

/// Suggested chart with the columns to plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub y: Vec<String>,
}

impl ChartSpec {
    fn table() -> Self {
        Self {
            kind: ChartKind::Table,
            x: None,
            y: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Numeric,
    Temporal,
    Categorical,
    Empty,
}

/// Classify a column; text columns are checked for numbers, then dates.
fn role(column: &Column) -> Role {
    match column.data_type() {
        Some(t) if t.is_numeric() => Role::Numeric,
        Some(DataType::Date) => Role::Temporal,
        Some(DataType::Text) => {
            let texts = || {
                column.values.iter().filter_map(|v| match v {
                    Value::Text(s) => Some(s.as_str()),
                    _ => None,
                })
            };
            if texts().all(|s| s.trim().parse::<f64>().is_ok()) {
                Role::Numeric
            } else if texts().all(|s| parse_date(s).is_some()) {
                Role::Temporal
            } else {
                Role::Categorical
            }
        }
        Some(_) => Role::Categorical,
        None if column.is_mixed() => Role::Categorical,
        None => Role::Empty,
    }
}

/// Pick a chart for a query result.
///
/// One cell is a metric. Otherwise the first column is the x axis and every
/// remaining column must be numeric: a temporal x gives a line chart, a
/// categorical x a bar chart, and a numeric x (with exactly one y) a scatter.
pub fn infer_chart(data: &Dataset) -> ChartSpec {
    if data.row_count() == 0 || data.column_count() == 0 {
        return ChartSpec::table();
    }

    if data.row_count() == 1 && data.column_count() == 1 {
        return ChartSpec {
            kind: ChartKind::Metric,
            x: None,
            y: vec![data.columns()[0].name.clone()],
        };
    }

    let columns = data.columns();
    if columns.len() < 2 {
        return ChartSpec::table();
    }

    let (x, rest) = (&columns[0], &columns[1..]);
    if !rest.iter().all(|c| role(c) == Role::Numeric) {
        return ChartSpec::table();
    }

    let kind = match role(x) {
        Role::Temporal => ChartKind::Line,
        Role::Categorical => ChartKind::Bar,
        Role::Numeric if rest.len() == 1 => ChartKind::Scatter,
        _ => return ChartSpec::table(),
    };

    ChartSpec {
        kind,
        x: Some(x.name.clone()),
        y: rest.iter().map(|c| c.name.clone()).collect(),
    }
}
