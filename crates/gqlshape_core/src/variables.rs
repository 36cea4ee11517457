//! Operation variables.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Encoded operation variables, kept in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables {
    values: IndexMap<String, Value>,
}

impl Variables {
    /// Creates an empty set of variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a variable, keeping its first declaration position.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Binds a variable in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the encoded value of a variable.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns a variable as a boolean, if bound to one.
    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(Value::as_bool)
    }

    /// Iterates in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns true if no variables are bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of bound variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Serializes the variables as a JSON object in declaration order.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_declaration_order_is_kept() {
        let variables = Variables::new()
            .with("episode", "JEDI")
            .with("first", 3)
            .with("withFriends", true);

        let names: Vec<_> = variables.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["episode", "first", "withFriends"]);
        assert_eq!(
            serde_json::to_string(&variables).unwrap(),
            r#"{"episode":"JEDI","first":3,"withFriends":true}"#
        );
    }

    #[test]
    fn test_boolean_lookup() {
        let variables = Variables::new().with("flag", true).with("count", 1);
        assert_eq!(variables.boolean("flag"), Some(true));
        assert_eq!(variables.boolean("count"), None);
        assert_eq!(variables.boolean("missing"), None);
        assert_eq!(variables.to_json(), json!({"flag": true, "count": 1}));
    }
}
