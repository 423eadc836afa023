//! Core type definitions used throughout the codebase

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for action instances
///
/// Used to correlate log events for one instance across the several
/// binding passes of a multi-turn form-fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Declared type of an action parameter
///
/// Drives coercion: each variant has exactly one coercion rule
/// (see `crate::coerce`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueType {
    /// A single primitive value
    Scalar(ScalarKind),
    /// A closed set of symbolic members, matched case-sensitively
    Enum { name: String, members: Vec<String> },
    /// An ordered sequence with a uniform element type
    Array(Box<ValueType>),
    /// A nullable wrapper; unwrapped before coercion
    Optional(Box<ValueType>),
}

impl ValueType {
    /// Strip `Optional` wrappers down to the underlying type
    pub fn unwrap_optional(&self) -> &ValueType {
        let mut ty = self;
        while let ValueType::Optional(inner) = ty {
            ty = inner;
        }
        ty
    }

    /// True if the (unwrapped) declared type is an array
    pub fn is_array(&self) -> bool {
        matches!(self.unwrap_optional(), ValueType::Array(_))
    }
}

/// Primitive kinds a scalar parameter can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarKind {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
}

/// A strongly-typed field value after coercion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(NaiveDate),
    /// A matched enum member name
    Symbol(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Canonical string rendering, the inverse of scalar coercion
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::Symbol(s) => s.clone(),
            FieldValue::List(items) => items
                .iter()
                .map(FieldValue::to_text)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Aggregate outcome of one binding pass
///
/// `success` is false whenever at least one parameter stayed unbound.
/// Partial binding is a normal outcome driving multi-turn slot filling,
/// not a failure state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingResult {
    pub success: bool,
}

/// Outcome of a context-switch-aware single-parameter re-query
#[derive(Debug, Clone)]
pub struct ResolutionOutcome {
    /// Whether the named parameter was bound from the re-query result
    pub bound: bool,
    /// Populated when the re-query detected a switch to another intent
    pub new_schema: Option<std::sync::Arc<crate::schema::ActionSchema>>,
    pub new_intent: Option<String>,
}

impl ResolutionOutcome {
    pub fn is_context_switch(&self) -> bool {
        self.new_intent.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_optional_nested() {
        let ty = ValueType::Optional(Box::new(ValueType::Optional(Box::new(
            ValueType::Scalar(ScalarKind::Integer),
        ))));
        assert_eq!(ty.unwrap_optional(), &ValueType::Scalar(ScalarKind::Integer));
    }

    #[test]
    fn test_is_array_through_optional() {
        let ty = ValueType::Optional(Box::new(ValueType::Array(Box::new(
            ValueType::Scalar(ScalarKind::Text),
        ))));
        assert!(ty.is_array());
        assert!(!ValueType::Scalar(ScalarKind::Text).is_array());
    }

    #[test]
    fn test_field_value_to_text() {
        assert_eq!(FieldValue::Integer(42).to_text(), "42");
        assert_eq!(FieldValue::Boolean(true).to_text(), "true");
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(FieldValue::Date(date).to_text(), "2024-05-01");
        let list = FieldValue::List(vec![FieldValue::Integer(1), FieldValue::Integer(2)]);
        assert_eq!(list.to_text(), "1, 2");
    }
}
