//! Named column of cell values.

use super::types::{DataType, Value};

/// A named, ordered sequence of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name, unique within its dataset.
    pub name: String,
    /// Cell values in row order.
    pub values: Vec<Value>,
}

impl Column {
    /// Create a column from anything convertible to values.
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a column from raw text cells, mapping null tokens to null.
    pub fn from_raw<'a>(name: impl Into<String>, raw: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            name: name.into(),
            values: raw.into_iter().map(Value::from_raw).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of null values.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// The shared type of all non-null values.
    ///
    /// Returns `None` when the column is all-null or holds mixed types.
    pub fn data_type(&self) -> Option<DataType> {
        let mut types = self.values.iter().filter_map(Value::data_type);
        let first = types.next()?;
        types.all(|t| t == first).then_some(first)
    }

    /// Returns true if non-null values have more than one type.
    pub fn is_mixed(&self) -> bool {
        let mut types = self.values.iter().filter_map(Value::data_type);
        match types.next() {
            Some(first) => types.any(|t| t != first),
            None => false,
        }
    }
}
