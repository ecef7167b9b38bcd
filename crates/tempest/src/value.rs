// File: src/value.rs
// Purpose: Template value types and the accessor trait for structured data

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Structured data that templates can walk into
///
/// Implement this for domain types instead of converting them into maps.
/// `field` answers `{{ user.name }}`, `call` answers `{{ user.full_name() }}`.
///
/// ```
/// use tempest::{Bindable, Value};
///
/// #[derive(Debug)]
/// struct User { first: String, last: String }
///
/// impl Bindable for User {
///     fn field(&self, name: &str) -> Option<Value> {
///         match name {
///             "first" => Some(self.first.as_str().into()),
///             "last" => Some(self.last.as_str().into()),
///             _ => None,
///         }
///     }
///
///     fn call(&self, method: &str) -> Option<Value> {
///         match method {
///             "full_name" => Some(format!("{} {}", self.first, self.last).into()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Bindable: fmt::Debug + Send + Sync {
    /// Property lookup
    fn field(&self, name: &str) -> Option<Value>;

    /// Zero-argument method call
    fn call(&self, _method: &str) -> Option<Value> {
        None
    }

    /// Text used when the record itself is substituted; `None` makes that an error
    fn display(&self) -> Option<String> {
        None
    }
}

/// Supported value types in templates
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
    Record(Arc<dyn Bindable>),
}

impl Value {
    /// Wraps a structured value
    pub fn record<T: Bindable + 'static>(record: T) -> Self {
        Value::Record(Arc::new(record))
    }

    /// Builds an `Object` from key/value pairs
    ///
    /// ```
    /// use tempest::Value;
    ///
    /// let data = Value::object([("name", "World")]);
    /// assert_eq!(data.get("name"), Some(&Value::from("World")));
    /// ```
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Key lookup on an `Object`
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Arrays and objects cannot be substituted into text
    pub fn is_collection(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }
}

/// Formats a number without a trailing `.0` for integral values
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

impl From<HashMap<String, Value>> for Value {
    fn from(obj: HashMap<String, Value>) -> Self {
        Value::Object(obj)
    }
}

impl From<HashMap<String, String>> for Value {
    fn from(obj: HashMap<String, String>) -> Self {
        Value::Object(obj.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Point;

    impl Bindable for Point {
        fn field(&self, _name: &str) -> Option<Value> {
            None
        }
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({
            "name": "Alice",
            "age": 30,
            "tags": ["a", "b"],
            "manager": null
        }));

        assert_eq!(value.get("name"), Some(&Value::from("Alice")));
        assert_eq!(value.get("age"), Some(&Value::Number(30.0)));
        assert!(value.get("tags").unwrap().is_collection());
        assert!(value.get("manager").unwrap().is_null());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(30.0), "30");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<&str>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    #[test]
    fn test_record_equality_is_identity() {
        let a = Value::record(Point);
        let b = Value::record(Point);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }
}
