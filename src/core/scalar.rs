//! Scalar types: leaf types with wire conversions
//!
//! A scalar converts native [`FieldValue`]s into their JSON wire form
//! (`serialize`) and parses JSON input (argument literals) back into native
//! values (`parse_input`). The built-ins follow the usual GraphQL coercion
//! rules; custom scalars supply their own pair of functions.

use super::error::ScalarError;
use super::field::FieldValue;
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;

type SerializeFn = dyn Fn(&FieldValue) -> Result<Value, ScalarError> + Send + Sync;
type ParseFn = dyn Fn(&Value) -> Result<FieldValue, ScalarError> + Send + Sync;

pub const STRING: &str = "String";
pub const INT: &str = "Int";
pub const FLOAT: &str = "Float";
pub const BOOLEAN: &str = "Boolean";
pub const ID: &str = "ID";

/// A named leaf type
#[derive(Clone)]
pub struct ScalarType {
    name: String,
    description: Option<String>,
    serialize: Arc<SerializeFn>,
    parse_input: Arc<ParseFn>,
}

impl ScalarType {
    /// Create a custom scalar
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let scalar = ScalarType::new(
    ///     "CustomScalarType",
    ///     |value| match value.downcast_ref::<CustomId>() {
    ///         Some(id) => Ok(json!(id.as_str())),
    ///         None => Err(ScalarError::serialize("CustomScalarType", "not a CustomId")),
    ///     },
    ///     |input| match input.as_str() {
    ///         Some(s) => Ok(FieldValue::custom(CustomId::new(s))),
    ///         None => Err(ScalarError::parse("CustomScalarType", "expected a string")),
    ///     },
    /// );
    /// ```
    pub fn new<S, P>(name: impl Into<String>, serialize: S, parse_input: P) -> Self
    where
        S: Fn(&FieldValue) -> Result<Value, ScalarError> + Send + Sync + 'static,
        P: Fn(&Value) -> Result<FieldValue, ScalarError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            serialize: Arc::new(serialize),
            parse_input: Arc::new(parse_input),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Native value → wire value
    pub fn serialize(&self, value: &FieldValue) -> Result<Value, ScalarError> {
        (self.serialize)(value)
    }

    /// Wire value → native value
    pub fn parse_input(&self, input: &Value) -> Result<FieldValue, ScalarError> {
        (self.parse_input)(input)
    }

    pub fn string() -> Self {
        Self::new(STRING, serialize_string, parse_string)
            .with_description("UTF-8 character sequence")
    }

    pub fn int() -> Self {
        Self::new(INT, serialize_int, parse_int).with_description("Signed 32-bit integer")
    }

    pub fn float() -> Self {
        Self::new(FLOAT, serialize_float, parse_float)
            .with_description("Double-precision floating-point value")
    }

    pub fn boolean() -> Self {
        Self::new(BOOLEAN, serialize_boolean, parse_boolean).with_description("true or false")
    }

    pub fn id() -> Self {
        Self::new(ID, serialize_id, parse_id)
            .with_description("Unique identifier, serialized as a string")
    }

    /// All built-in scalars
    pub fn builtins() -> Vec<ScalarType> {
        vec![
            Self::string(),
            Self::int(),
            Self::float(),
            Self::boolean(),
            Self::id(),
        ]
    }
}

impl fmt::Debug for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarType")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

fn serialize_string(value: &FieldValue) -> Result<Value, ScalarError> {
    match value {
        FieldValue::String(s) | FieldValue::Id(s) => Ok(json!(s)),
        FieldValue::Integer(i) => Ok(json!(i.to_string())),
        FieldValue::Float(f) => Ok(json!(f.to_string())),
        FieldValue::Boolean(b) => Ok(json!(b.to_string())),
        other => Err(ScalarError::serialize(STRING, format!("got {}", other.kind()))),
    }
}

fn parse_string(input: &Value) -> Result<FieldValue, ScalarError> {
    match input {
        Value::String(s) => Ok(FieldValue::String(s.clone())),
        other => Err(ScalarError::parse(STRING, format!("expected a string, got {}", other))),
    }
}

fn serialize_int(value: &FieldValue) -> Result<Value, ScalarError> {
    let int = match value {
        FieldValue::Integer(i) => *i,
        FieldValue::Float(f) if f.fract() == 0.0 && f.is_finite() => *f as i64,
        FieldValue::Boolean(b) => i64::from(*b),
        FieldValue::String(s) => s
            .parse::<i64>()
            .map_err(|_| ScalarError::serialize(INT, format!("non-integer string \"{}\"", s)))?,
        other => return Err(ScalarError::serialize(INT, format!("got {}", other.kind()))),
    };
    let int = i32::try_from(int)
        .map_err(|_| ScalarError::serialize(INT, format!("{} is outside the 32-bit range", int)))?;
    Ok(json!(int))
}

fn parse_int(input: &Value) -> Result<FieldValue, ScalarError> {
    let int = input
        .as_i64()
        .ok_or_else(|| ScalarError::parse(INT, format!("expected an integer, got {}", input)))?;
    i32::try_from(int)
        .map(|i| FieldValue::Integer(i64::from(i)))
        .map_err(|_| ScalarError::parse(INT, format!("{} is outside the 32-bit range", int)))
}

fn serialize_float(value: &FieldValue) -> Result<Value, ScalarError> {
    let float = match value {
        FieldValue::Float(f) => *f,
        FieldValue::Integer(i) => *i as f64,
        FieldValue::String(s) => s
            .parse::<f64>()
            .map_err(|_| ScalarError::serialize(FLOAT, format!("non-numeric string \"{}\"", s)))?,
        other => return Err(ScalarError::serialize(FLOAT, format!("got {}", other.kind()))),
    };
    serde_json::Number::from_f64(float)
        .map(Value::Number)
        .ok_or_else(|| ScalarError::serialize(FLOAT, "value is not finite"))
}

fn parse_float(input: &Value) -> Result<FieldValue, ScalarError> {
    input
        .as_f64()
        .map(FieldValue::Float)
        .ok_or_else(|| ScalarError::parse(FLOAT, format!("expected a number, got {}", input)))
}

fn serialize_boolean(value: &FieldValue) -> Result<Value, ScalarError> {
    match value {
        FieldValue::Boolean(b) => Ok(json!(b)),
        FieldValue::Integer(i) => Ok(json!(*i != 0)),
        FieldValue::String(s) if s == "true" || s == "false" => Ok(json!(s == "true")),
        other => Err(ScalarError::serialize(BOOLEAN, format!("got {}", other.kind()))),
    }
}

fn parse_boolean(input: &Value) -> Result<FieldValue, ScalarError> {
    input
        .as_bool()
        .map(FieldValue::Boolean)
        .ok_or_else(|| ScalarError::parse(BOOLEAN, format!("expected a boolean, got {}", input)))
}

fn serialize_id(value: &FieldValue) -> Result<Value, ScalarError> {
    match value {
        FieldValue::Id(s) | FieldValue::String(s) => Ok(json!(s)),
        FieldValue::Integer(i) => Ok(json!(i.to_string())),
        other => Err(ScalarError::serialize(ID, format!("got {}", other.kind()))),
    }
}

fn parse_id(input: &Value) -> Result<FieldValue, ScalarError> {
    match input {
        Value::String(s) => Ok(FieldValue::Id(s.clone())),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(FieldValue::Id(n.to_string())),
        other => Err(ScalarError::parse(ID, format!("expected a string or integer, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(scalar: &ScalarType, value: FieldValue) {
        let wire = scalar.serialize(&value).expect("serialize");
        let parsed = scalar.parse_input(&wire).expect("parse");
        assert_eq!(parsed, value, "{} round trip through {}", scalar.name(), wire);
    }

    #[test]
    fn test_builtin_round_trips() {
        round_trip(&ScalarType::string(), FieldValue::string("world"));
        round_trip(&ScalarType::string(), FieldValue::string(""));
        round_trip(&ScalarType::int(), FieldValue::Integer(42));
        round_trip(&ScalarType::int(), FieldValue::Integer(-2147483648));
        round_trip(&ScalarType::float(), FieldValue::Float(1.5));
        round_trip(&ScalarType::float(), FieldValue::Float(2.0));
        round_trip(&ScalarType::boolean(), FieldValue::Boolean(true));
        round_trip(&ScalarType::boolean(), FieldValue::Boolean(false));
        round_trip(&ScalarType::id(), FieldValue::id("user-1"));
    }

    #[test]
    fn test_string_coerces_numbers_on_output() {
        let scalar = ScalarType::string();
        assert_eq!(scalar.serialize(&FieldValue::Integer(7)).unwrap(), json!("7"));
        assert_eq!(scalar.serialize(&FieldValue::Boolean(true)).unwrap(), json!("true"));
    }

    #[test]
    fn test_string_rejects_non_string_input() {
        let err = ScalarType::string().parse_input(&json!(1)).unwrap_err();
        assert!(matches!(err, ScalarError::Parse { .. }));
    }

    #[test]
    fn test_int_range_is_enforced() {
        let scalar = ScalarType::int();
        assert!(scalar.parse_input(&json!(2147483648i64)).is_err());
        assert!(scalar.serialize(&FieldValue::Integer(1 << 40)).is_err());
        assert!(scalar.parse_input(&json!(1.5)).is_err());
    }

    #[test]
    fn test_id_accepts_integer_input() {
        assert_eq!(ScalarType::id().parse_input(&json!(7)).unwrap(), FieldValue::id("7"));
    }

    #[test]
    fn test_object_cannot_be_serialized_as_scalar() {
        let value = FieldValue::Object(Default::default());
        let err = ScalarType::string().serialize(&value).unwrap_err();
        assert_eq!(err.to_string(), "String cannot represent value: got object");
    }
}
