//! Argument values attached to response field descriptors.

use crate::variables::Variables;
use serde_json::Value;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// A GraphQL input literal or a reference to an operation variable.
#[derive(Debug, Clone)]
pub enum InputValue {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Enum(String),
    List(Vec<InputValue>),
    Object(BTreeMap<String, InputValue>),
    /// `$name` in the document.
    Variable(String),
}

impl InputValue {
    /// Creates a variable reference.
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Returns true if this value, or any nested value, references a variable.
    pub fn has_variables(&self) -> bool {
        match self {
            Self::Variable(_) => true,
            Self::List(items) => items.iter().any(Self::has_variables),
            Self::Object(fields) => fields.values().any(Self::has_variables),
            _ => false,
        }
    }

    /// Resolves variable references against bound variables.
    ///
    /// Unbound variables resolve to `null`, matching how an omitted nullable
    /// variable reaches a server.
    pub fn resolve(&self, variables: &Variables) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Boolean(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
            Self::String(s) | Self::Enum(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(|v| v.resolve(variables)).collect()),
            Self::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.resolve(variables)))
                    .collect(),
            ),
            Self::Variable(name) => variables.get(name).cloned().unwrap_or(Value::Null),
        }
    }
}

// Float literals compare by bit pattern so descriptors stay usable as map keys.
impl PartialEq for InputValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b))
            | (Self::Enum(a), Self::Enum(b))
            | (Self::Variable(a), Self::Variable(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for InputValue {}

impl Hash for InputValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Null => {}
            Self::Boolean(b) => b.hash(state),
            Self::Int(i) => i.hash(state),
            Self::Float(f) => f.to_bits().hash(state),
            Self::String(s) | Self::Enum(s) | Self::Variable(s) => s.hash(state),
            Self::List(items) => items.hash(state),
            Self::Object(fields) => fields.hash(state),
        }
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for InputValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<bool> for InputValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_variables() {
        let variables = Variables::new().with("episode", json!("JEDI"));
        let mut object = BTreeMap::new();
        object.insert("episode".to_string(), InputValue::variable("episode"));
        object.insert("first".to_string(), InputValue::Int(10));
        object.insert("after".to_string(), InputValue::variable("cursor"));

        let value = InputValue::Object(object);
        assert!(value.has_variables());
        assert_eq!(
            value.resolve(&variables),
            json!({"after": null, "episode": "JEDI", "first": 10})
        );
    }

    #[test]
    fn test_float_equality_is_bitwise() {
        assert_eq!(InputValue::Float(1.5), InputValue::Float(1.5));
        assert_ne!(InputValue::Float(0.0), InputValue::Float(-0.0));
        assert_ne!(InputValue::String("A".into()), InputValue::Enum("A".into()));
    }
}
