//! Key → rule tables.

use std::collections::HashMap;

use serde::Deserialize;

use crate::catalog::{BuiltinType, TypeSpec};
use crate::Error;

/// The rules applied to a field set: field key → [`TypeSpec`].
///
/// A map is supplied wholesale. Keys it does not name are never validated
/// and never reach the output. Every type name and pattern is resolved when
/// the map is built, so a bad pattern fails here rather than mid-request.
///
/// # Examples
///
/// ```
/// use safe_input::{BuiltinType, TypeSpec, ValidationMap};
///
/// let map = ValidationMap::builder()
///     .field("event_id", BuiltinType::Integer)
///     .rule("phone", r"\([0-9]{3}\)[0-9]{3}-[0-9]{4}")
///     .unwrap()
///     .build();
///
/// assert_eq!(map.get("event_id"), Some(&TypeSpec::Builtin(BuiltinType::Integer)));
/// assert!(map.get("unknown").is_none());
///
/// // Maps can also come from configuration.
/// let map: ValidationMap = serde_json::from_str(r#"{ "id": "int", "tags": "Array_Varnames" }"#).unwrap();
/// assert_eq!(map.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "HashMap<String, String>")]
pub struct ValidationMap {
    rules: HashMap<String, TypeSpec>,
}

impl ValidationMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a [`ValidationMapBuilder`].
    pub fn builder() -> ValidationMapBuilder {
        ValidationMapBuilder::default()
    }

    /// Builds a map from `(key, type name or pattern)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for the first spec that is neither
    /// a catalog name nor a compilable pattern.
    pub fn try_from_pairs<I, K, S>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: AsRef<str>,
    {
        let mut rules = HashMap::new();
        for (key, spec) in pairs {
            rules.insert(key.into(), TypeSpec::parse(spec.as_ref())?);
        }
        Ok(Self { rules })
    }

    /// Sets the rule for `key`, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, spec: impl Into<TypeSpec>) {
        self.rules.insert(key.into(), spec.into());
    }

    /// Returns the rule for `key`.
    pub fn get(&self, key: &str) -> Option<&TypeSpec> {
        self.rules.get(key)
    }

    /// Returns `true` if `key` has a rule.
    pub fn contains_key(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if the map has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates over `(key, rule)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeSpec)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl TryFrom<HashMap<String, String>> for ValidationMap {
    type Error = Error;

    fn try_from(raw: HashMap<String, String>) -> Result<Self, Self::Error> {
        Self::try_from_pairs(raw)
    }
}

impl FromIterator<(String, TypeSpec)> for ValidationMap {
    fn from_iter<I: IntoIterator<Item = (String, TypeSpec)>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

/// Builder for [`ValidationMap`].
#[derive(Debug, Default)]
pub struct ValidationMapBuilder {
    rules: HashMap<String, TypeSpec>,
}

impl ValidationMapBuilder {
    /// Adds a built-in type rule.
    pub fn field(mut self, key: impl Into<String>, ty: BuiltinType) -> Self {
        self.rules.insert(key.into(), TypeSpec::Builtin(ty));
        self
    }

    /// Adds a multi-valued rule whose elements are of type `ty`.
    pub fn array(mut self, key: impl Into<String>, ty: BuiltinType) -> Self {
        self.rules.insert(key.into(), TypeSpec::Array(ty));
        self
    }

    /// Adds a rule from a type name or pattern string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if `spec` does not compile.
    pub fn rule(mut self, key: impl Into<String>, spec: &str) -> Result<Self, Error> {
        self.rules.insert(key.into(), TypeSpec::parse(spec)?);
        Ok(self)
    }

    /// Finishes the map.
    pub fn build(self) -> ValidationMap {
        ValidationMap { rules: self.rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_resolve_names_and_patterns() {
        let map = ValidationMap::try_from_pairs([
            ("event_id", "Integer"),
            ("title", "Text"),
            ("summary", "HTML"),
            ("path", "/20[0-9][0-9][1-3]/[0-9]{5}"),
        ])
        .unwrap();

        assert_eq!(map.len(), 4);
        assert_eq!(
            map.get("summary"),
            Some(&TypeSpec::Builtin(BuiltinType::Html))
        );
        assert!(matches!(map.get("path"), Some(TypeSpec::Pattern(_))));
    }

    #[test]
    fn bad_pattern_fails_the_whole_map() {
        let err = ValidationMap::try_from_pairs([("ok", "Integer"), ("bad", "[unclosed")])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn deserializes_from_json_object() {
        let map: ValidationMap =
            serde_json::from_str(r#"{"ids": "Array_Integers", "name": "varname"}"#).unwrap();

        assert_eq!(map.get("ids"), Some(&TypeSpec::Array(BuiltinType::Integer)));
        assert_eq!(map.get("name"), Some(&TypeSpec::Builtin(BuiltinType::Varname)));
    }

    #[test]
    fn deserialization_reports_bad_patterns() {
        let result: Result<ValidationMap, _> = serde_json::from_str(r#"{"x": "(oops"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn builder_and_insert_agree() {
        let built = ValidationMap::builder()
            .field("a", BuiltinType::Email)
            .array("b", BuiltinType::Float)
            .build();

        let mut manual = ValidationMap::new();
        manual.insert("a", BuiltinType::Email);
        manual.insert("b", TypeSpec::Array(BuiltinType::Float));

        assert_eq!(built, manual);
    }
}
