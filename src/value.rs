//! Raw inputs and validated outputs.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// The raw input for one key: a single string or an ordered list of strings
/// (multi-select inputs, repeated query keys).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// One raw string
    Single(String),
    /// Several raw strings, in submission order
    Multiple(Vec<String>),
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Single(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Single(value.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        FieldValue::Multiple(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

/// A scalar handed to the validator.
///
/// Request fields are always [`RawValue::Str`]; the other variants come
/// from decoded JSON, where numbers and booleans arrive already typed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    /// A string
    Str(&'a str),
    /// A JSON integer
    Integer(i64),
    /// A JSON number with a fractional part or exponent
    Float(f64),
    /// A JSON boolean
    Boolean(bool),
}

impl<'a> RawValue<'a> {
    /// Renders the value as text, borrowing when it is already a string.
    pub(crate) fn to_text(self) -> Cow<'a, str> {
        match self {
            RawValue::Str(s) => Cow::Borrowed(s),
            RawValue::Integer(n) => n.to_string().into(),
            RawValue::Float(x) => x.to_string().into(),
            RawValue::Boolean(b) => Cow::Borrowed(if b { "true" } else { "false" }),
        }
    }
}

impl<'a> From<&'a str> for RawValue<'a> {
    fn from(value: &'a str) -> Self {
        RawValue::Str(value)
    }
}

/// A normalized, typed value produced by a successful validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer types
    Integer(i64),
    /// Float types
    Float(f64),
    /// Boolean types
    Boolean(bool),
    /// Every string-valued type (Varname, Url, Email, Text, HTML, custom patterns)
    Text(String),
    /// DateTime types, normalized to UTC
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Returns the integer, if this is an integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the number as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the timestamp, if this is a date/time value.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Text(s) => f.write_str(s),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

/// The output for one key.
///
/// A multi-valued field keeps only the elements that passed, in their
/// original order; rejected elements leave no gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Validated {
    /// Output for a single raw value
    Scalar(Value),
    /// Surviving outputs for a multi-valued field
    List(Vec<Value>),
}

impl Validated {
    /// Returns the scalar value, if the field was single-valued.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Validated::Scalar(v) => Some(v),
            Validated::List(_) => None,
        }
    }

    /// Returns the surviving elements, if the field was multi-valued.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Validated::Scalar(_) => None,
            Validated::List(values) => Some(values),
        }
    }
}

/// The validated mapping produced by the field-set and JSON processors.
///
/// A key is present only when its value passed validation, so presence
/// (not the value) is the signal that a field was accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedFields {
    fields: HashMap<String, Validated>,
}

impl ValidatedFields {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: String, value: Validated) {
        self.fields.insert(key, value);
    }

    /// Returns the validated output for `key`.
    pub fn get(&self, key: &str) -> Option<&Validated> {
        self.fields.get(key)
    }

    /// Returns the scalar output for `key`, if it is single-valued.
    pub fn scalar(&self, key: &str) -> Option<&Value> {
        self.get(key).and_then(Validated::as_scalar)
    }

    /// Returns the surviving elements for `key`, if it is multi-valued.
    pub fn list(&self, key: &str) -> Option<&[Value]> {
        self.get(key).and_then(Validated::as_list)
    }

    /// Returns `true` if `key` passed validation.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of accepted fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field was accepted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over accepted fields in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Validated)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Consumes the set and returns the underlying map.
    pub fn into_inner(self) -> HashMap<String, Validated> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_accessors_match_variant() {
        assert_eq!(Value::Integer(7).as_i64(), Some(7));
        assert_eq!(Value::Integer(7).as_f64(), Some(7.0));
        assert_eq!(Value::Float(2.5).as_i64(), None);
        assert_eq!(Value::Boolean(true).as_bool(), Some(true));
        assert_eq!(Value::Text("hi".to_string()).as_str(), Some("hi"));
        assert_eq!(Value::Text("hi".to_string()).as_bool(), None);
    }

    #[test]
    fn values_serialize_untagged() {
        let mut fields = ValidatedFields::new();
        fields.insert("id".to_string(), Validated::Scalar(Value::Integer(913298)));
        fields.insert(
            "tags".to_string(),
            Validated::List(vec![Value::Integer(1), Value::Integer(2)]),
        );

        let json = serde_json::to_value(&fields).expect("serializable");
        assert_eq!(json["id"], serde_json::json!(913298));
        assert_eq!(json["tags"], serde_json::json!([1, 2]));
    }

    #[test]
    fn field_value_conversions() {
        assert_eq!(
            FieldValue::from("one"),
            FieldValue::Single("one".to_string())
        );
        assert_eq!(
            FieldValue::from(vec!["1", "2"]),
            FieldValue::Multiple(vec!["1".to_string(), "2".to_string()])
        );
    }

    #[test]
    fn presence_is_the_acceptance_signal() {
        let mut fields = ValidatedFields::new();
        fields.insert("flag".to_string(), Validated::Scalar(Value::Boolean(false)));

        assert!(fields.contains_key("flag"));
        assert_eq!(fields.scalar("flag"), Some(&Value::Boolean(false)));
        assert!(!fields.contains_key("missing"));
        assert_eq!(fields.len(), 1);
    }
}
