//! The seam between request-carrying types and the field-set processor.

use std::collections::HashMap;

use crate::tainted::Tainted;
use crate::value::FieldValue;

/// Raw request fields, keyed by name, each marked untrusted.
///
/// Whatever carries the request (a query string, a form body, server
/// metadata) fills a `FieldSource`; the processor reads it back through the
/// validators only.
///
/// # Examples
///
/// ```
/// use safe_input::FieldSource;
///
/// let mut source = FieldSource::new();
/// source.add("event_id", "913298");
/// source.add_multiple("categories", vec!["1".to_string(), "2".to_string()]);
///
/// assert_eq!(source.len(), 2);
/// assert!(source.contains_key("event_id"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldSource {
    fields: HashMap<String, Tainted<FieldValue>>,
}

impl FieldSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields
            .insert(key.into(), Tainted::new(value.into()));
    }

    /// Sets a single-valued field.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, FieldValue::Single(value.into()));
    }

    /// Sets a multi-valued field.
    pub fn add_multiple(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.insert(key, FieldValue::Multiple(values));
    }

    /// Returns the tainted value for `key`.
    pub fn get(&self, key: &str) -> Option<&Tainted<FieldValue>> {
        self.fields.get(key)
    }

    /// Returns `true` if `key` was submitted.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of submitted fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if nothing was submitted.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over submitted keys and their tainted values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tainted<FieldValue>)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for FieldSource
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut source = FieldSource::new();
        for (key, value) in iter {
            source.insert(key, value);
        }
        source
    }
}

/// Hands a request's raw fields to the processor.
///
/// Implement this for a framework's request type to validate its query
/// string, form body or server metadata.
///
/// # Examples
///
/// ```
/// use safe_input::{ExtractFields, FieldSource};
///
/// struct QueryString(Vec<(String, String)>);
///
/// impl ExtractFields for QueryString {
///     fn extract_fields(&self) -> FieldSource {
///         let mut source = FieldSource::new();
///         for (k, v) in &self.0 {
///             source.add(k.clone(), v.clone());
///         }
///         source
///     }
/// }
///
/// let query = QueryString(vec![("page".to_string(), "2".to_string())]);
/// assert!(query.extract_fields().contains_key("page"));
/// ```
pub trait ExtractFields {
    /// Collects every raw field as untrusted input.
    fn extract_fields(&self) -> FieldSource;
}

impl ExtractFields for FieldSource {
    fn extract_fields(&self) -> FieldSource {
        self.clone()
    }
}

impl ExtractFields for HashMap<String, String> {
    fn extract_fields(&self) -> FieldSource {
        self.iter()
            .map(|(k, v)| (k.clone(), FieldValue::Single(v.clone())))
            .collect()
    }
}

impl ExtractFields for HashMap<String, Vec<String>> {
    fn extract_fields(&self) -> FieldSource {
        self.iter()
            .map(|(k, v)| (k.clone(), FieldValue::Multiple(v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_insert_replaces_earlier() {
        let mut source = FieldSource::new();
        source.add("k", "first");
        source.add("k", "second");

        assert_eq!(source.len(), 1);
        assert_eq!(
            source.get("k").map(Tainted::as_inner),
            Some(&FieldValue::Single("second".to_string()))
        );
    }

    #[test]
    fn string_maps_extract_as_single_values() {
        let mut query = HashMap::new();
        query.insert("search".to_string(), "user input".to_string());

        let source = query.extract_fields();
        assert_eq!(
            source.get("search").map(Tainted::as_inner),
            Some(&FieldValue::Single("user input".to_string()))
        );
    }

    #[test]
    fn list_maps_extract_as_multiple_values() {
        let mut form = HashMap::new();
        form.insert("pick".to_string(), vec!["1".to_string(), "2".to_string()]);

        let source = form.extract_fields();
        assert_eq!(
            source.get("pick").map(Tainted::as_inner),
            Some(&FieldValue::Multiple(vec!["1".to_string(), "2".to_string()]))
        );
    }

    #[test]
    fn debug_output_never_shows_values() {
        let source: FieldSource = [("password", "hunter2")].into_iter().collect();
        assert!(!format!("{:?}", source).contains("hunter2"));
    }
}
