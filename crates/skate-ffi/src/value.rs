//! Owned, safe representation of a decoded engine response.

use std::fmt;

/// A fully materialized engine response.
///
/// Maps preserve the server's entry order as key/value pairs rather than
/// re-hashing them; keys are not guaranteed to be hashable values.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absent value (RESP nil).
    Nil,
    /// The `+OK` simple-string sentinel.
    Ok,
    Int(i64),
    Double(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
    /// A per-slot server error inside a non-atomic batch reply.
    ServerError(String),
}

impl Value {
    /// Short tag name used in error messages.
    pub fn kind_str(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Ok => "ok",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Bool(_) => "bool",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::ServerError(_) => "error",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Bytes interpreted as UTF-8, if this is a string value.
    pub fn into_string(self) -> Option<String> {
        match self {
            Value::Bytes(bytes) => String::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            Value::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_map(self) -> Option<Vec<(Value, Value)>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Ok => write!(f, "OK"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Bytes(v) => match std::str::from_utf8(v) {
                Ok(text) => write!(f, "{text}"),
                Err(_) => write!(f, "bytes(len={})", v.len()),
            },
            Value::Array(items) => write!(f, "array(len={})", items.len()),
            Value::Map(entries) => write!(f, "map(len={})", entries.len()),
            Value::Set(items) => write!(f, "set(len={})", items.len()),
            Value::ServerError(msg) => write!(f, "error({msg})"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Bytes(value.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Bytes(value.into_bytes())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Value;

    #[test]
    fn accessors_reject_mismatched_kinds() {
        assert_eq!(Value::Int(3).as_int(), Some(3));
        assert_eq!(Value::Bytes(b"3".to_vec()).as_int(), None);
        assert_eq!(Value::from("abc").into_string().as_deref(), Some("abc"));
        assert_eq!(Value::Nil.into_bytes(), None);
    }

    #[test]
    fn sets_read_back_as_arrays() {
        let set = Value::Set(vec![Value::from("a"), Value::from("b")]);
        assert_eq!(set.into_array().map(|v| v.len()), Some(2));
    }
}
