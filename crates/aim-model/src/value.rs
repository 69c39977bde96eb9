//! Scalar field values carried through the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::ModelError;

/// A single scalar value of a normalized record.
///
/// Records never hold containers once parsed, so arrays and objects have no
/// representation here. On the JSON boundary the value serializes as the
/// plain JSON scalar.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True for null and for text that is empty after trimming.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Float(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric view of integer and float values only.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view that also accepts numeric text such as `"1500.5"`.
    pub fn coerce_f64(&self) -> Option<f64> {
        match self {
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            other => other.as_f64(),
        }
    }

    /// Name used in type-mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
        }
    }
}

/// Display form is the lookup key used by value-mapping tables.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl TryFrom<Value> for FieldValue {
    type Error = ModelError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(value) => Ok(Self::Bool(value)),
            Value::Number(number) => Ok(number_to_field(&number)),
            Value::String(text) => Ok(Self::Text(text)),
            Value::Array(_) => Err(ModelError::CompositeValue { kind: "array" }),
            Value::Object(_) => Err(ModelError::CompositeValue { kind: "object" }),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(value) => Value::Bool(value),
            FieldValue::Integer(value) => Value::Number(value.into()),
            FieldValue::Float(value) => Number::from_f64(value).map_or(Value::Null, Value::Number),
            FieldValue::Text(value) => Value::String(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Converts a JSON number, preferring the integer representation.
pub fn number_to_field(number: &Number) -> FieldValue {
    if let Some(value) = number.as_i64() {
        FieldValue::Integer(value)
    } else {
        FieldValue::Float(number.as_f64().unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_lookup_keys() {
        assert_eq!(FieldValue::from("M").to_string(), "M");
        assert_eq!(FieldValue::Integer(42).to_string(), "42");
        assert_eq!(FieldValue::Float(1000.0).to_string(), "1000");
        assert_eq!(FieldValue::Float(12.5).to_string(), "12.5");
        assert_eq!(FieldValue::Bool(true).to_string(), "true");
        assert_eq!(FieldValue::Null.to_string(), "");
    }

    #[test]
    fn composite_json_is_rejected() {
        let err = FieldValue::try_from(serde_json::json!([1, 2])).unwrap_err();
        assert_eq!(err, ModelError::CompositeValue { kind: "array" });
    }

    #[test]
    fn missing_covers_blank_text() {
        assert!(FieldValue::Null.is_missing());
        assert!(FieldValue::from("   ").is_missing());
        assert!(!FieldValue::Integer(0).is_missing());
    }
}
