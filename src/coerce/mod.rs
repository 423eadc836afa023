//! Schema-directed value coercion
//!
//! Converts an untyped recognized value (a `serde_json::Value` coming
//! off the NLU wire) into a strongly-typed `FieldValue` according to
//! the parameter's declared `ValueType`. Coercion failures are format
//! errors the binder recovers from locally; they never abort a binding
//! pass.

use chrono::NaiveDate;
use serde_json::Value;

use crate::core::error::{BindError, Result};
use crate::core::types::{FieldValue, ScalarKind, ValueType};

/// Coerce a raw value to the declared type
///
/// `Ok(None)` means the input carried no usable value (an empty list,
/// blank text): the field stays unfilled without being an error.
pub fn coerce(target: &ValueType, raw: &Value) -> Result<Option<FieldValue>> {
    match target.unwrap_optional() {
        ValueType::Array(element) => coerce_array(element, raw),
        ValueType::Enum { name, members } => coerce_enum(name, members, raw),
        ValueType::Scalar(kind) => coerce_single(*kind, raw),
        // `unwrap_optional` strips all `Optional` wrappers, so this arm
        // can never be reached
        ValueType::Optional(_) => unreachable!("unwrap_optional never returns Optional"),
    }
}

fn coerce_array(element: &ValueType, raw: &Value) -> Result<Option<FieldValue>> {
    let items: Vec<FieldValue> = match raw {
        // A structured list is used directly
        Value::Array(values) => {
            let mut items = Vec::with_capacity(values.len());
            for value in values {
                if let Some(item) = coerce(element, value)? {
                    items.push(item);
                }
            }
            items
        }
        // A scalar text value splits on commas, one element per token
        other => {
            let text = raw_text(other)?;
            let mut items = Vec::new();
            for token in text.split(',') {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                if let Some(item) = coerce(element, &Value::String(token.to_string()))? {
                    items.push(item);
                }
            }
            items
        }
    };

    if items.is_empty() {
        return Ok(None);
    }
    Ok(Some(FieldValue::List(items)))
}

fn coerce_enum(name: &str, members: &[String], raw: &Value) -> Result<Option<FieldValue>> {
    let raw = match unwrap_singleton(raw)? {
        Some(raw) => raw,
        None => return Ok(None),
    };
    let symbol = raw_text(raw)?;
    if symbol.is_empty() {
        return Ok(None);
    }
    // Exact case-sensitive member match
    members
        .iter()
        .find(|m| **m == symbol)
        .map(|m| Some(FieldValue::Symbol(m.clone())))
        .ok_or_else(|| {
            BindError::Format(format!("'{}' is not a member of enum {}", symbol, name))
        })
}

fn coerce_single(kind: ScalarKind, raw: &Value) -> Result<Option<FieldValue>> {
    let raw = match unwrap_singleton(raw)? {
        Some(raw) => raw,
        None => return Ok(None),
    };

    // Accept JSON values that already carry the right shape
    match (kind, raw) {
        (ScalarKind::Integer, Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(FieldValue::Integer(i)));
            }
        }
        (ScalarKind::Float, Value::Number(n)) => {
            if let Some(f) = n.as_f64() {
                return Ok(Some(FieldValue::Float(f)));
            }
        }
        (ScalarKind::Boolean, Value::Bool(b)) => return Ok(Some(FieldValue::Boolean(*b))),
        _ => {}
    }

    let text = raw_text(raw)?;
    if text.is_empty() {
        return Ok(None);
    }
    coerce_scalar_text(kind, &text).map(Some)
}

/// Parse a scalar from its canonical text rendering
fn coerce_scalar_text(kind: ScalarKind, text: &str) -> Result<FieldValue> {
    match kind {
        ScalarKind::Text => Ok(FieldValue::Text(text.to_string())),
        ScalarKind::Integer => text
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|_| BindError::Format(format!("'{}' is not an integer", text))),
        ScalarKind::Float => text
            .parse::<f64>()
            .map(FieldValue::Float)
            .map_err(|_| BindError::Format(format!("'{}' is not a number", text))),
        ScalarKind::Boolean => text
            .parse::<bool>()
            .map(FieldValue::Boolean)
            .map_err(|_| BindError::Format(format!("'{}' is not a boolean", text))),
        ScalarKind::Date => text
            .parse::<NaiveDate>()
            .map(FieldValue::Date)
            .map_err(|_| BindError::Format(format!("'{}' is not a date", text))),
    }
}

/// Reduce a list-shaped raw value for a single-valued target
///
/// A one-element list is not ambiguous and unwraps to its element; an
/// empty list carries no value (`None`); several alternative
/// representations for a single-valued field are a format error, never
/// a silent pick.
fn unwrap_singleton(raw: &Value) -> Result<Option<&Value>> {
    match raw {
        Value::Array(values) => match values.as_slice() {
            [single] => unwrap_singleton(single),
            [] => Ok(None),
            _ => Err(BindError::Format(
                "cannot assign multiple values to a single-valued field".into(),
            )),
        },
        other => Ok(Some(other)),
    }
}

/// Text rendering of a scalar-shaped JSON value
fn raw_text(raw: &Value) -> Result<String> {
    match raw {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(BindError::Format(format!(
            "cannot interpret structured value as a scalar: {}",
            other
        ))),
    }
}
