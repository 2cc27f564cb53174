//! Map-driven validation of a whole request field set.

use crate::html::SanitizerPolicy;
use crate::inference::resolve;
use crate::map::ValidationMap;
use crate::source::ExtractFields;
use crate::validator::Validator;
use crate::value::ValidatedFields;

/// Applies a [`ValidationMap`] (explicit or inferred) to a set of request
/// fields.
///
/// Only keys named by the effective map and present in the source reach the
/// output. A field that fails its rule is omitted; a list field keeps only
/// its passing elements. Nothing here returns an error: the output map is
/// the whole result.
///
/// # Examples
///
/// ```
/// use safe_input::{BuiltinType, FieldSetProcessor, FieldSource, ValidationMap, Value};
///
/// let mut source = FieldSource::new();
/// source.add("id", "42");
/// source.add("name", "'; DROP TABLE users; --");
/// source.add("sneaky", "unlisted");
///
/// let map = ValidationMap::builder()
///     .field("id", BuiltinType::Integer)
///     .field("name", BuiltinType::Varname)
///     .build();
///
/// let out = FieldSetProcessor::default().process(&source, Some(&map));
/// assert_eq!(out.scalar("id"), Some(&Value::Integer(42)));
/// assert!(!out.contains_key("name"));
/// assert!(!out.contains_key("sneaky"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldSetProcessor {
    validator: Validator,
}

impl FieldSetProcessor {
    /// Creates a processor that validates with `validator`.
    pub fn new(validator: Validator) -> Self {
        Self { validator }
    }

    /// Creates a processor whose HTML sanitizer uses `policy`.
    pub fn with_policy(policy: SanitizerPolicy) -> Self {
        Self::new(Validator::with_policy(policy))
    }

    /// Returns the underlying validator.
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Validates the fields of `request` against `map`, or against inferred
    /// rules when `map` is `None`.
    pub fn process<S>(&self, request: &S, map: Option<&ValidationMap>) -> ValidatedFields
    where
        S: ExtractFields + ?Sized,
    {
        let source = request.extract_fields();
        let effective = resolve(&source, map);
        let mut out = ValidatedFields::new();

        for (key, spec) in effective.iter() {
            let Some(raw) = source.get(key) else {
                continue;
            };
            match self.validator.validate_field(raw.as_inner(), spec) {
                Ok(validated) => out.insert(key.to_string(), validated),
                Err(rejection) => {
                    tracing::debug!(field = %key, kind = %rejection.kind(), "field rejected");
                }
            }
        }

        tracing::debug!(
            submitted = source.len(),
            accepted = out.len(),
            inferred = map.is_none(),
            "processed field set"
        );
        out
    }
}
