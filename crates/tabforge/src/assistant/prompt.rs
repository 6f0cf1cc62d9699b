//! Prompt templates for the SQL chat assistant.

use serde::{Deserialize, Serialize};

use crate::dataset::{DataType, Dataset};

/// Description of one column offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnContext {
    pub name: String,
    /// Storage type, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Free-text meaning of the column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Table metadata the assistant is allowed to query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableContext {
    /// Fully qualified table name, used verbatim in generated SQL.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub columns: Vec<ColumnContext>,
}

impl TableContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Describe a dataset's columns, using inferred types where uniform.
    pub fn from_dataset(name: impl Into<String>, data: &Dataset) -> Self {
        let columns = data
            .columns()
            .iter()
            .map(|c| ColumnContext {
                name: c.name.clone(),
                data_type: c.data_type().map(sql_type_name).map(str::to_string),
                description: None,
            })
            .collect();
        Self {
            name: name.into(),
            description: None,
            columns,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a column description, replacing an existing entry of the same name.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        data_type: Option<&str>,
        description: Option<&str>,
    ) -> Self {
        let column = ColumnContext {
            name: name.into(),
            data_type: data_type.map(str::to_string),
            description: description.map(str::to_string),
        };
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        self
    }
}

fn sql_type_name(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Text => "VARCHAR",
        DataType::Integer => "BIGINT",
        DataType::Float => "DOUBLE",
        DataType::Boolean => "BOOLEAN",
        DataType::Date => "DATE",
    }
}

/// Build the system prompt that opens a chat session.
pub fn system_prompt(table: &TableContext) -> String {
    let columns = if table.columns.is_empty() {
        "  (no column metadata available)".to_string()
    } else {
        table
            .columns
            .iter()
            .map(|c| {
                let mut line = format!("  - {}", c.name);
                if let Some(ref t) = c.data_type {
                    line.push_str(&format!(": {}", t));
                }
                if let Some(ref d) = c.description {
                    line.push_str(&format!(" ({})", d));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let description = table
        .description
        .as_deref()
        .map(|d| format!("\n{}\n", d))
        .unwrap_or_default();

    format!(
        r#"You are a SQL analyst answering questions about retail sales, marketing and production data.
You answer by writing a single SQL query against one table and explaining the result briefly.

## Table
{name}
{description}
## Columns
{columns}

## Rules
1. Wrap the query in a fenced block that starts with ```sql and ends with ```.
2. Generate exactly one read-only statement (SELECT or WITH). Never modify data.
3. Unless the user asks for a specific number of results, limit the query to 10 rows.
4. Use the table name exactly as written above, and only the columns listed.
5. For text filters use case-insensitive matching, e.g. ILIKE '%keyword%'.
6. Never start a column alias with a number.

Begin by introducing yourself in one sentence, then list three example questions
a user could ask about this table."#,
        name = table.name,
        description = description,
        columns = columns
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Column, Value};

    #[test]
    fn test_prompt_lists_columns_and_rules() {
        let table = TableContext::new("RETAIL.PUBLIC.CARDS")
            .with_column("CARD_BRAND", Some("VARCHAR"), Some("Visa, Mastercard, ..."))
            .with_column("HAS_CHIP", Some("BOOLEAN"), None);
        let prompt = system_prompt(&table);

        assert!(prompt.contains("RETAIL.PUBLIC.CARDS"));
        assert!(prompt.contains("  - CARD_BRAND: VARCHAR (Visa, Mastercard, ...)"));
        assert!(prompt.contains("  - HAS_CHIP: BOOLEAN"));
        assert!(prompt.contains("```sql"));
        assert!(prompt.contains("limit the query to 10 rows"));
    }

    #[test]
    fn test_context_from_dataset() {
        let data = Dataset::new(vec![
            Column::new("qty", [Value::Integer(1), Value::Integer(2)]),
            Column::new("mixed", [Value::Integer(1), Value::from("x")]),
        ])
        .unwrap();
        let table = TableContext::from_dataset("sales", &data);
        assert_eq!(table.columns[0].data_type.as_deref(), Some("BIGINT"));
        assert_eq!(table.columns[1].data_type, None);
    }

    #[test]
    fn test_with_column_replaces() {
        let table = TableContext::new("t")
            .with_column("a", None, None)
            .with_column("a", Some("DATE"), None);
        assert_eq!(table.columns.len(), 1);
        assert_eq!(table.columns[0].data_type.as_deref(), Some("DATE"));
    }
}
