//! Dynamic scalar/collection type shared by request attributes and the
//! assertion evaluator (§9 design note: "Dynamic field mappings").

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A null | bool | integer | float | string | list | mapping sum type.
///
/// Integers and floats compare and widen against each other (§4.6:
/// "numeric widening between integer and floating kinds") but are kept
/// as distinct variants so callers can tell which shape a span attribute
/// actually carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric-widened equality: an `Int` and a `Float` carrying the same
    /// magnitude compare equal even though their variants differ.
    pub fn numeric_eq(&self, other: &Value) -> Option<bool> {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => Some(a == b),
            _ => None,
        }
    }

    /// Total ordering for numeric values; `None` if either side isn't numeric.
    pub fn numeric_cmp(&self, other: &Value) -> Option<std::cmp::Ordering> {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Map(_) => write!(f, "<object>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_widening_compares_int_and_float() {
        let a = Value::Int(2);
        let b = Value::Float(2.0);
        assert_eq!(a.numeric_eq(&b), Some(true));
    }

    #[test]
    fn non_numeric_has_no_numeric_cmp() {
        let a = Value::Str("x".into());
        let b = Value::Int(1);
        assert_eq!(a.numeric_cmp(&b), None);
    }
}
