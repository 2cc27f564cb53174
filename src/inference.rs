//! Default rule inference for fields submitted without an explicit map.
//!
//! Each value falls into exactly one bucket. The checks run in a fixed
//! order and the first match wins:
//!
//! | order | shape of the value                              | rule      |
//! |-------|--------------------------------------------------|-----------|
//! | 1     | optional sign and digits                         | Integer   |
//! | 2     | optional sign, digits with exactly one dot       | Float     |
//! | 3     | `true` or `false`, any case                      | Boolean   |
//! | 4     | absolute `http://` or `https://` URL             | Url       |
//! | 5     | email address                                    | Email     |
//! | 6     | identifier key and identifier-shaped value       | Varname   |
//! | 7     | contains `<` or `>`                              | HTML      |
//! | 8     | anything else                                    | Text      |
//!
//! `1`/`0` infer as Integer, not Boolean. The Integer, Float, Url and
//! Email buckets also require the value to pass that type's own rule, so a
//! value that only looks like one (an overflowing digit run, a host with an
//! underscore, an address with a doubled dot) moves on down the list
//! instead of being inferred into a rule that rejects it.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::{BuiltinType, TypeSpec};
use crate::map::ValidationMap;
use crate::source::FieldSource;
use crate::validator::{EmailRule, FloatRule, IntegerRule, UrlRule, Validate};
use crate::value::{FieldValue, RawValue};

static RE_INTEGER_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+$").expect("static regex"));

static RE_FLOAT_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:[0-9]+\.[0-9]*|\.[0-9]+)$").expect("static regex")
});

static RE_URL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i:https?)://[^\s/?#]+\.[^\s]+$").expect("static regex"));

static RE_EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"));

static RE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"));

static RE_VARNAME_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("static regex"));

/// Infers the built-in type for one raw value submitted under `key`.
///
/// # Examples
///
/// ```
/// use safe_input::{infer_type, BuiltinType};
///
/// assert_eq!(infer_type("int", "1"), BuiltinType::Integer);
/// assert_eq!(infer_type("html", "This is a <b>html</b>."), BuiltinType::Html);
/// assert_eq!(infer_type("seven-eight", "Seven and eight."), BuiltinType::Text);
/// ```
pub fn infer_type(key: &str, value: &str) -> BuiltinType {
    if RE_INTEGER_SHAPE.is_match(value) && accepts(IntegerRule, value) {
        BuiltinType::Integer
    } else if RE_FLOAT_SHAPE.is_match(value) && accepts(FloatRule, value) {
        BuiltinType::Float
    } else if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
        BuiltinType::Boolean
    } else if RE_URL_SHAPE.is_match(value) && accepts(UrlRule, value) {
        BuiltinType::Url
    } else if RE_EMAIL_SHAPE.is_match(value) && accepts(EmailRule, value) {
        BuiltinType::Email
    } else if RE_IDENTIFIER.is_match(key) && RE_VARNAME_SHAPE.is_match(value) {
        BuiltinType::Varname
    } else if value.contains(['<', '>']) {
        BuiltinType::Html
    } else {
        BuiltinType::Text
    }
}

fn accepts(rule: impl Validate, value: &str) -> bool {
    rule.validate(RawValue::Str(value)).is_ok()
}

/// Infers the rule for a whole field.
///
/// A list whose elements all infer to the same type gets an `Array_` rule
/// of that type. Mixed lists fall back to HTML if any element looks like
/// markup, otherwise to Text, so no element is rejected for disagreeing with
/// its neighbours. An empty list is Text.
pub fn infer_field(key: &str, value: &FieldValue) -> TypeSpec {
    match value {
        FieldValue::Single(s) => TypeSpec::Builtin(infer_type(key, s)),
        FieldValue::Multiple(items) => {
            let mut types = items.iter().map(|s| infer_type(key, s));
            let Some(first) = types.next() else {
                return TypeSpec::Array(BuiltinType::Text);
            };
            let mut any_html = first == BuiltinType::Html;
            let mut uniform = true;
            for ty in types {
                uniform &= ty == first;
                any_html |= ty == BuiltinType::Html;
            }
            let element = if uniform {
                first
            } else if any_html {
                BuiltinType::Html
            } else {
                BuiltinType::Text
            };
            TypeSpec::Array(element)
        }
    }
}

/// Builds the inferred map for every field in `source`.
pub fn default_validation_map(source: &FieldSource) -> ValidationMap {
    source
        .iter()
        .map(|(key, value)| (key.to_string(), infer_field(key, value.as_inner())))
        .collect()
}

/// Returns the map to apply to `source`.
///
/// An explicit map is used as is; fields it does not name are dropped.
/// Without one, every field gets an inferred rule.
pub fn resolve<'m>(
    source: &FieldSource,
    explicit: Option<&'m ValidationMap>,
) -> Cow<'m, ValidationMap> {
    match explicit {
        Some(map) => Cow::Borrowed(map),
        None => Cow::Owned(default_validation_map(source)),
    }
}
