//! Dynamic values for defaults and parsed arguments

use serde::Serialize;
use std::fmt;

/// A value flowing between a signature, the parser and a command body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

/// Scalar coercion applied to raw command-line text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Str,
    Int,
    Float,
    Bool,
}

impl ValueType {
    /// The type of a default value, if it has a scalar one.
    #[must_use]
    pub fn of(value: &Value) -> Option<ValueType> {
        match value {
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Int(_) => Some(ValueType::Int),
            Value::Float(_) => Some(ValueType::Float),
            Value::Str(_) => Some(ValueType::Str),
            Value::None | Value::List(_) => None,
        }
    }

    /// Short lowercase name, as used in type expressions.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Str => "str",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
        }
    }

    /// Convert raw argument text into a typed value.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message when the text is not a valid literal
    /// of this type.
    pub fn coerce(self, raw: &str) -> Result<Value, String> {
        match self {
            ValueType::Str => Ok(Value::Str(raw.to_string())),
            ValueType::Int => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| format!("invalid int value: '{raw}'")),
            ValueType::Float => raw
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| format!("invalid float value: '{raw}'")),
            ValueType::Bool => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                _ => Err(format!("invalid bool value: '{raw}'")),
            },
        }
    }
}

impl Value {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, with ints widened.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Name of the variant, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "none"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
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

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_int() {
        assert_eq!(ValueType::Int.coerce("42"), Ok(Value::Int(42)));
        assert_eq!(ValueType::Int.coerce("-7"), Ok(Value::Int(-7)));
        assert!(ValueType::Int.coerce("4.2").is_err());
    }

    #[test]
    fn test_coerce_bool_spellings() {
        for raw in ["true", "Yes", "ON", "1"] {
            assert_eq!(ValueType::Bool.coerce(raw), Ok(Value::Bool(true)), "{raw}");
        }
        for raw in ["false", "no", "Off", "0"] {
            assert_eq!(ValueType::Bool.coerce(raw), Ok(Value::Bool(false)), "{raw}");
        }
        assert!(ValueType::Bool.coerce("maybe").is_err());
    }

    #[test]
    fn test_coerce_error_message_names_type() {
        let err = ValueType::Float.coerce("abc").unwrap_err();
        assert_eq!(err, "invalid float value: 'abc'");
    }

    #[test]
    fn test_type_of_default() {
        assert_eq!(ValueType::of(&Value::Int(1)), Some(ValueType::Int));
        assert_eq!(ValueType::of(&Value::from("x")), Some(ValueType::Str));
        assert_eq!(ValueType::of(&Value::None), None);
        assert_eq!(ValueType::of(&Value::from(vec![1, 2])), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("plain").to_string(), "plain");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::None.to_string(), "none");
        assert_eq!(Value::from(vec![1, 2, 3]).to_string(), "[1, 2, 3]");
    }

    #[test]
    fn test_serialize_untagged() {
        let value = Value::from(vec![Value::from("a"), Value::Int(2), Value::None]);
        let json = serde_json::to_string(&value).unwrap_or_default();
        assert_eq!(json, r#"["a",2,null]"#);
    }
}
