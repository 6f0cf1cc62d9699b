//! Per-value type coercion.
//!
//! Each target type has one pure function that either produces the coerced
//! value or reports failure with `None`. Nulls always survive a cast, and
//! text null tokens become nulls.

use crate::dataset::{is_null_token, parse_date, DataType, Value};

/// Coerce a value to `target`, returning `None` if it cannot be represented.
pub fn cast_value(value: &Value, target: DataType) -> Option<Value> {
    if let Value::Text(s) = value {
        if is_null_token(s) {
            return Some(Value::Null);
        }
    }
    if value.is_null() {
        return Some(Value::Null);
    }

    match target {
        DataType::Text => Some(to_text(value)),
        DataType::Integer => to_integer(value),
        DataType::Float => to_float(value),
        DataType::Boolean => to_boolean(value),
        DataType::Date => to_date(value),
    }
}

fn to_text(value: &Value) -> Value {
    match value {
        Value::Text(_) => value.clone(),
        other => Value::Text(other.to_string()),
    }
}

fn to_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Integer(_) => Some(value.clone()),
        Value::Float(x) => whole_float(*x).map(Value::Integer),
        Value::Boolean(b) => Some(Value::Integer(i64::from(*b))),
        Value::Text(s) => integer_text(s.trim()).map(Value::Integer),
        Value::Date(_) | Value::Null => None,
    }
}

/// Parse `[+-]digits` with an optional all-zero fraction, exactly.
///
/// Exponents and anything outside the `i64` range are rejected rather than
/// rounded through `f64`.
fn integer_text(text: &str) -> Option<i64> {
    let whole = match text.split_once('.') {
        Some((whole, fraction)) => {
            if fraction.is_empty() || !fraction.bytes().all(|b| b == b'0') {
                return None;
            }
            whole
        }
        None => text,
    };
    whole.parse::<i64>().ok()
}

/// Convert a float with no fractional part to an integer.
fn whole_float(x: f64) -> Option<i64> {
    // 2^63 is representable as f64 but not as i64.
    const UPPER: f64 = 9_223_372_036_854_775_808.0;
    if x.is_finite() && x.fract() == 0.0 && x >= -UPPER && x < UPPER {
        Some(x as i64)
    } else {
        None
    }
}

fn to_float(value: &Value) -> Option<Value> {
    match value {
        Value::Float(_) => Some(value.clone()),
        Value::Integer(i) => Some(Value::Float(*i as f64)),
        Value::Boolean(b) => Some(Value::Float(if *b { 1.0 } else { 0.0 })),
        Value::Text(s) => s.trim().parse::<f64>().ok().map(Value::Float),
        Value::Date(_) | Value::Null => None,
    }
}

fn to_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Boolean(_) => Some(value.clone()),
        Value::Integer(0) => Some(Value::Boolean(false)),
        Value::Integer(1) => Some(Value::Boolean(true)),
        Value::Text(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "t" | "y" | "1" => Some(Value::Boolean(true)),
            "false" | "no" | "f" | "n" | "0" => Some(Value::Boolean(false)),
            _ => None,
        },
        _ => None,
    }
}

fn to_date(value: &Value) -> Option<Value> {
    match value {
        Value::Date(_) => Some(value.clone()),
        Value::Text(s) => parse_date(s).map(Value::Date),
        _ => None,
    }
}
