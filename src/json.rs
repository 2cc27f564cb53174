//! Validation of JSON payloads against a [`ValidationMap`].

use serde_json::{Map, Value as Json};

use crate::error::{DecodeError, Error, Rejection, RejectionKind};
use crate::html::SanitizerPolicy;
use crate::map::ValidationMap;
use crate::validator::Validator;
use crate::value::{RawValue, Validated, ValidatedFields};

/// Applies the field-set rules to the top-level fields of a JSON object.
///
/// Strings, numbers and booleans are validated as scalars; an array is
/// treated like a multi-valued field. Nested objects, `null`, and objects
/// or arrays inside an array are not validated at this layer and are
/// dropped.
///
/// # Examples
///
/// ```
/// use safe_input::{BuiltinType, JsonValidator, ValidationMap, Value};
///
/// let map = ValidationMap::builder()
///     .field("event_id", BuiltinType::Integer)
///     .field("title", BuiltinType::Text)
///     .build();
///
/// let out = JsonValidator::default()
///     .validate_json(r#"{"event_id": "913298", "title": "Talk"}"#, &map, false)
///     .unwrap();
///
/// assert_eq!(out.scalar("event_id"), Some(&Value::Integer(913298)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonValidator {
    validator: Validator,
}

impl JsonValidator {
    /// Creates a JSON validator that validates with `validator`.
    pub fn new(validator: Validator) -> Self {
        Self { validator }
    }

    /// Creates a JSON validator whose HTML sanitizer uses `policy`.
    pub fn with_policy(policy: SanitizerPolicy) -> Self {
        Self::new(Validator::with_policy(policy))
    }

    /// Decodes `payload` and validates its top-level fields against `map`.
    ///
    /// Fields that fail validation are omitted from the result. Top-level
    /// keys that `map` does not name are dropped, unless `strict` is set.
    ///
    /// # Errors
    ///
    /// - [`Error::Decode`] if `payload` is not valid JSON or its top level
    ///   is not an object.
    /// - [`Error::UnknownField`] if `strict` is set and the payload has a
    ///   top-level key with no rule in `map`.
    pub fn validate_json(
        &self,
        payload: &str,
        map: &ValidationMap,
        strict: bool,
    ) -> Result<ValidatedFields, Error> {
        let object = decode_object(payload).inspect_err(|err| {
            tracing::warn!(error = %err, "JSON payload rejected");
        })?;

        if strict {
            if let Some(key) = object.keys().find(|key| !map.contains_key(key)) {
                tracing::warn!(field = %key, "strict JSON validation found an unmapped field");
                return Err(Error::UnknownField { key: key.clone() });
            }
        }

        let mut out = ValidatedFields::new();
        for (key, spec) in map.iter() {
            let Some(field) = object.get(key) else {
                continue;
            };
            let result = match field {
                Json::Array(items) => Ok(Validated::List(
                    self.validator
                        .validate_elements(items.iter().filter_map(scalar), spec),
                )),
                other => match scalar(other) {
                    Some(raw) => self.validator.validate(raw, spec).map(Validated::Scalar),
                    None => Err(Rejection::new(
                        RejectionKind::Unsupported,
                        "nested objects and null are not validated",
                    )),
                },
            };
            match result {
                Ok(validated) => out.insert(key.to_string(), validated),
                Err(rejection) => {
                    tracing::debug!(field = %key, kind = %rejection.kind(), "field rejected");
                }
            }
        }

        tracing::debug!(
            submitted = object.len(),
            accepted = out.len(),
            strict,
            "processed JSON payload"
        );
        Ok(out)
    }
}

fn decode_object(payload: &str) -> Result<Map<String, Json>, DecodeError> {
    match serde_json::from_str::<Json>(payload)? {
        Json::Object(object) => Ok(object),
        _ => Err(DecodeError::new("top-level value is not an object")),
    }
}

/// Reads a JSON scalar as a raw value. Containers and `null` yield `None`.
fn scalar(value: &Json) -> Option<RawValue<'_>> {
    match value {
        Json::String(s) => Some(RawValue::Str(s)),
        Json::Bool(b) => Some(RawValue::Boolean(*b)),
        Json::Number(n) => n
            .as_i64()
            .map(RawValue::Integer)
            .or_else(|| n.as_f64().map(RawValue::Float)),
        Json::Null | Json::Array(_) | Json::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuiltinType, Value};

    fn map(pairs: &[(&str, &str)]) -> ValidationMap {
        ValidationMap::try_from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn string_integer_becomes_integer() {
        let out = JsonValidator::default()
            .validate_json(r#"{"event_id":"913298"}"#, &map(&[("event_id", "Integer")]), false)
            .unwrap();

        assert_eq!(out.scalar("event_id"), Some(&Value::Integer(913298)));
    }

    #[test]
    fn typed_json_scalars_are_accepted() {
        let rules = map(&[("n", "Integer"), ("x", "Float"), ("b", "Boolean"), ("t", "Text")]);
        let out = JsonValidator::default()
            .validate_json(r#"{"n": 5, "x": 1.5, "b": true, "t": 12}"#, &rules, false)
            .unwrap();

        assert_eq!(out.scalar("n"), Some(&Value::Integer(5)));
        assert_eq!(out.scalar("x"), Some(&Value::Float(1.5)));
        assert_eq!(out.scalar("b"), Some(&Value::Boolean(true)));
        assert_eq!(out.scalar("t"), Some(&Value::Text("12".to_string())));
    }

    #[test]
    fn malformed_payload_is_a_decode_error() {
        let err = JsonValidator::default()
            .validate_json("{not json", &ValidationMap::new(), false)
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn non_object_payload_is_a_decode_error() {
        for payload in ["[1, 2]", "\"text\"", "42", "null"] {
            let err = JsonValidator::default()
                .validate_json(payload, &ValidationMap::new(), false)
                .unwrap_err();
            assert!(matches!(err, Error::Decode(_)), "{}", payload);
        }
    }

    #[test]
    fn unknown_keys_are_dropped_when_lenient() {
        let out = JsonValidator::default()
            .validate_json(r#"{"a": "1", "b": "2"}"#, &map(&[("a", "Integer")]), false)
            .unwrap();

        assert_eq!(out.len(), 1);
        assert!(!out.contains_key("b"));
    }

    #[test]
    fn unknown_keys_fail_when_strict() {
        let err = JsonValidator::default()
            .validate_json(r#"{"a": "1", "b": "2"}"#, &map(&[("a", "Integer")]), true)
            .unwrap_err();

        assert!(matches!(err, Error::UnknownField { ref key } if key == "b"));
    }

    #[test]
    fn strict_mode_passes_when_every_key_is_mapped() {
        let out = JsonValidator::default()
            .validate_json(r#"{"a": "1"}"#, &map(&[("a", "Integer"), ("z", "Text")]), true)
            .unwrap();
        assert_eq!(out.scalar("a"), Some(&Value::Integer(1)));
    }

    #[test]
    fn arrays_validate_scalar_elements() {
        let rules = map(&[("ids", "Array_Integers")]);
        let out = JsonValidator::default()
            .validate_json(r#"{"ids": ["1", 2, "The Fox", {"x": 1}, null, 3]}"#, &rules, false)
            .unwrap();

        assert_eq!(
            out.list("ids"),
            Some(&[Value::Integer(1), Value::Integer(2), Value::Integer(3)][..])
        );
    }

    #[test]
    fn nested_objects_and_null_are_omitted() {
        let rules = map(&[("obj", "Text"), ("nothing", "Text")]);
        let out = JsonValidator::default()
            .validate_json(r#"{"obj": {"a": "b"}, "nothing": null}"#, &rules, false)
            .unwrap();

        assert!(out.is_empty());
    }

    #[test]
    fn empty_strings_fail_strict_types() {
        let rules = map(&[("url", "Url"), ("email", "Email"), ("title", "Text")]);
        let out = JsonValidator::default()
            .validate_json(r#"{"url": "", "email": "", "title": ""}"#, &rules, false)
            .unwrap();

        assert!(!out.contains_key("url"));
        assert!(!out.contains_key("email"));
        assert_eq!(out.scalar("title"), Some(&Value::Text(String::new())));
    }

    #[test]
    fn javascript_anchor_is_neutralized() {
        let rules = ValidationMap::builder().field("txt", BuiltinType::Html).build();
        let out = JsonValidator::default()
            .validate_json(
                r#"{"txt": "<a href=\"javascript:alert('test')\">click</a>"}"#,
                &rules,
                false,
            )
            .unwrap();

        let txt = out.scalar("txt").and_then(Value::as_str).unwrap();
        assert!(!txt.contains("javascript"));
        assert_eq!(txt, "<a>click</a>");
    }
}
