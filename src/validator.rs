//! Type-directed validation of single values.
//!
//! Each built-in type is a small rule object. Rules that can refuse input
//! implement [`Validate`]; rules that map every input to some value
//! implement [`Coerce`] instead, so the asymmetry is visible in the types
//! rather than hidden in a shared function. [`Validator`] dispatches a
//! resolved [`TypeSpec`] to the right rule.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::catalog::{BuiltinType, MatchMode, Pattern, TypeSpec};
use crate::error::{Rejection, RejectionKind};
use crate::html::{HtmlSanitizer, SanitizerPolicy};
use crate::temporal::parse_strict;
use crate::value::{FieldValue, RawValue, Validated, Value};

static RE_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+$").expect("static regex"));

static RE_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[-+]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$").expect("static regex")
});

static RE_VARNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("static regex"));

/// Absolute http(s) URL: host labels, optional port, optional path/query/fragment.
static RE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?i:https?)://[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*(?::[0-9]{1,5})?(?:[/?#]\S*)?$",
    )
    .expect("static regex")
});

/// Scheme-less `host.domain[:port][/path]`, eligible for `http://` repair.
static RE_BARE_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+(?::[0-9]{1,5})?(?:[/?#]\S*)?$",
    )
    .expect("static regex")
});

/// Dot-atom or quoted-string local part, one `@`, two or more domain labels.
static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*|"(?:[^"\\\r\n]|\\.)*")@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?$"#,
    )
    .expect("static regex")
});

/// A rule that either accepts a value (possibly normalizing it) or rejects it.
pub trait Validate {
    /// Checks `raw`, returning its normalized form on success.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] describing why the value does not satisfy the rule.
    fn validate(&self, raw: RawValue<'_>) -> Result<Value, Rejection>;
}

/// A rule that maps every input to a value and never rejects.
pub trait Coerce {
    /// Converts `raw` into the rule's output type.
    fn coerce(&self, raw: RawValue<'_>) -> Value;
}

fn malformed(ty: BuiltinType) -> Rejection {
    Rejection::new(RejectionKind::Malformed, format!("not a valid {}", ty))
}

fn type_mismatch(ty: BuiltinType) -> Rejection {
    Rejection::new(
        RejectionKind::TypeMismatch,
        format!("{} requires a string value", ty),
    )
}

/// Requires a string, for types that never accept numbers or booleans.
fn require_str(raw: RawValue<'_>, ty: BuiltinType) -> Result<&str, Rejection> {
    match raw {
        RawValue::Str(s) => Ok(s),
        _ => Err(type_mismatch(ty)),
    }
}

/// Signed decimal integers that fit in 64 bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerRule;

impl Validate for IntegerRule {
    fn validate(&self, raw: RawValue<'_>) -> Result<Value, Rejection> {
        let text = match raw {
            RawValue::Integer(n) => return Ok(Value::Integer(n)),
            RawValue::Str(s) => s,
            RawValue::Float(_) | RawValue::Boolean(_) => {
                return Err(Rejection::new(
                    RejectionKind::TypeMismatch,
                    "Integer requires an integral value",
                ))
            }
        };
        if !RE_INTEGER.is_match(text) {
            return Err(malformed(BuiltinType::Integer));
        }
        text.parse::<i64>().map(Value::Integer).map_err(|_| {
            Rejection::new(RejectionKind::OutOfRange, "integer does not fit in 64 bits")
        })
    }
}

/// Signed decimals with an optional fractional part.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatRule;

impl Validate for FloatRule {
    fn validate(&self, raw: RawValue<'_>) -> Result<Value, Rejection> {
        let text = match raw {
            RawValue::Integer(n) => return Ok(Value::Float(n as f64)),
            RawValue::Float(x) => return Ok(Value::Float(x)),
            RawValue::Str(s) => s,
            RawValue::Boolean(_) => {
                return Err(Rejection::new(
                    RejectionKind::TypeMismatch,
                    "Float requires a numeric value",
                ))
            }
        };
        if !RE_FLOAT.is_match(text) {
            return Err(malformed(BuiltinType::Float));
        }
        match text.parse::<f64>() {
            Ok(x) if x.is_finite() => Ok(Value::Float(x)),
            _ => Err(Rejection::new(
                RejectionKind::OutOfRange,
                "number is not representable as a float",
            )),
        }
    }
}

/// `true`/`1` become `true`; everything else becomes `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanRule;

impl Coerce for BooleanRule {
    fn coerce(&self, raw: RawValue<'_>) -> Value {
        let truthy = match raw {
            RawValue::Boolean(b) => b,
            other => {
                let text = other.to_text();
                let text = text.trim();
                text.eq_ignore_ascii_case("true") || text == "1"
            }
        };
        Value::Boolean(truthy)
    }
}

/// Identifier-safe names: ASCII letters, digits and underscore.
#[derive(Debug, Clone, Copy, Default)]
pub struct VarnameRule;

impl Validate for VarnameRule {
    fn validate(&self, raw: RawValue<'_>) -> Result<Value, Rejection> {
        let text = require_str(raw, BuiltinType::Varname)?;
        if RE_VARNAME.is_match(text) {
            Ok(Value::Text(text.to_string()))
        } else {
            Err(malformed(BuiltinType::Varname))
        }
    }
}

/// Comma-separated varnames. One leading `$` per element is stripped.
#[derive(Debug, Clone, Copy, Default)]
pub struct VarnameListRule;

impl Validate for VarnameListRule {
    fn validate(&self, raw: RawValue<'_>) -> Result<Value, Rejection> {
        let text = require_str(raw, BuiltinType::VarnameList)?;
        let mut names = Vec::new();
        for element in text.split(',') {
            let name = element.strip_prefix('$').unwrap_or(element);
            if !RE_VARNAME.is_match(name) {
                return Err(malformed(BuiltinType::VarnameList));
            }
            names.push(name);
        }
        Ok(Value::Text(names.join(",")))
    }
}

/// Absolute http/https URLs.
///
/// A value with no scheme that looks like `host.domain` is repaired once by
/// prepending `http://`. Values that already carry a scheme are never
/// repaired, so `htp://host` is rejected rather than becoming
/// `http://htp://host`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlRule;

impl Validate for UrlRule {
    fn validate(&self, raw: RawValue<'_>) -> Result<Value, Rejection> {
        let text = require_str(raw, BuiltinType::Url)?;
        if RE_URL.is_match(text) {
            return Ok(Value::Text(text.to_string()));
        }
        if !text.contains("://") && RE_BARE_HOST.is_match(text) {
            let repaired = format!("http://{}", text);
            if RE_URL.is_match(&repaired) {
                return Ok(Value::Text(repaired));
            }
        }
        Err(malformed(BuiltinType::Url))
    }
}

/// Email addresses with dot-atom or quoted-string local parts.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailRule;

impl Validate for EmailRule {
    fn validate(&self, raw: RawValue<'_>) -> Result<Value, Rejection> {
        let text = require_str(raw, BuiltinType::Email)?;
        if RE_EMAIL.is_match(text) {
            Ok(Value::Text(text.to_string()))
        } else {
            Err(malformed(BuiltinType::Email))
        }
    }
}

/// Dates and times accepted by [`parse_strict`], normalized to UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeRule;

impl Validate for DateTimeRule {
    fn validate(&self, raw: RawValue<'_>) -> Result<Value, Rejection> {
        let text = require_str(raw, BuiltinType::DateTime)?;
        Ok(Value::Timestamp(parse_strict(text)?))
    }
}

/// Any value, returned as text without filtering.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRule;

impl Coerce for TextRule {
    fn coerce(&self, raw: RawValue<'_>) -> Value {
        Value::Text(raw.to_text().into_owned())
    }
}

/// Any value, returned as sanitized markup.
#[derive(Debug, Clone, Copy)]
pub struct HtmlRule<'a> {
    sanitizer: &'a HtmlSanitizer,
}

impl<'a> HtmlRule<'a> {
    /// Creates a rule that sanitizes through `sanitizer`.
    pub fn new(sanitizer: &'a HtmlSanitizer) -> Self {
        Self { sanitizer }
    }
}

impl Coerce for HtmlRule<'_> {
    fn coerce(&self, raw: RawValue<'_>) -> Value {
        Value::Text(self.sanitizer.sanitize(&raw.to_text()))
    }
}

/// A custom pattern applied with a given [`MatchMode`].
#[derive(Debug, Clone, Copy)]
pub struct PatternRule<'a> {
    pattern: &'a Pattern,
    mode: MatchMode,
}

impl<'a> PatternRule<'a> {
    /// Creates a rule for `pattern` in `mode`.
    pub fn new(pattern: &'a Pattern, mode: MatchMode) -> Self {
        Self { pattern, mode }
    }
}

impl Validate for PatternRule<'_> {
    fn validate(&self, raw: RawValue<'_>) -> Result<Value, Rejection> {
        let text = raw.to_text();
        if self.pattern.is_match(&text, self.mode) {
            Ok(Value::Text(text.into_owned()))
        } else {
            Err(Rejection::new(
                RejectionKind::PatternMismatch,
                "value does not match the field pattern",
            ))
        }
    }
}

/// Applies [`TypeSpec`] rules to raw values.
///
/// Holds the HTML sanitizer used by the `HTML` type. Cloning is cheap; the
/// sanitizer is shared.
///
/// # Examples
///
/// ```
/// use safe_input::{BuiltinType, TypeSpec, Validator, Value};
///
/// let validator = Validator::default();
///
/// let url = validator.validate("www.example.com", &TypeSpec::from(BuiltinType::Url));
/// assert_eq!(url, Ok(Value::Text("http://www.example.com".to_string())));
///
/// let flag = validator.validate("blahblah", &TypeSpec::from(BuiltinType::Boolean));
/// assert_eq!(flag, Ok(Value::Boolean(false)));
///
/// let int = validator.validate("12 3", &TypeSpec::from(BuiltinType::Integer));
/// assert!(int.is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    sanitizer: Arc<HtmlSanitizer>,
}

impl Validator {
    /// Creates a validator that sanitizes `HTML` values with `sanitizer`.
    pub fn new(sanitizer: HtmlSanitizer) -> Self {
        Self {
            sanitizer: Arc::new(sanitizer),
        }
    }

    /// Creates a validator whose sanitizer uses `policy`.
    pub fn with_policy(policy: SanitizerPolicy) -> Self {
        Self::new(HtmlSanitizer::new(policy))
    }

    /// Returns the sanitizer used for `HTML` values.
    pub fn sanitizer(&self) -> &HtmlSanitizer {
        &self.sanitizer
    }

    /// Validates one value; custom patterns must match the whole string.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] when the value fails its rule, or
    /// [`RejectionKind::NotASequence`] when `spec` declares a multi-valued
    /// field.
    pub fn validate<'a>(
        &self,
        raw: impl Into<RawValue<'a>>,
        spec: &TypeSpec,
    ) -> Result<Value, Rejection> {
        self.validate_with(raw, spec, MatchMode::Full)
    }

    /// Validates one value, choosing how much of it a custom pattern must
    /// cover. Built-in types ignore `mode`.
    ///
    /// # Errors
    ///
    /// Same as [`Validator::validate`].
    pub fn validate_with<'a>(
        &self,
        raw: impl Into<RawValue<'a>>,
        spec: &TypeSpec,
        mode: MatchMode,
    ) -> Result<Value, Rejection> {
        let raw = raw.into();
        match spec {
            TypeSpec::Builtin(ty) => self.validate_builtin(raw, *ty),
            TypeSpec::Array(_) => Err(not_a_sequence()),
            TypeSpec::Pattern(pattern) => PatternRule::new(pattern, mode).validate(raw),
        }
    }

    /// Validates a whole field: one value, or each element of a list.
    ///
    /// Rejected list elements are dropped and survivors keep their order;
    /// a list never fails as a whole.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] when a single value fails, or when a single
    /// value is supplied for an `Array_` type.
    pub fn validate_field(&self, value: &FieldValue, spec: &TypeSpec) -> Result<Validated, Rejection> {
        match value {
            FieldValue::Single(s) => {
                if spec.is_multi_valued() {
                    return Err(not_a_sequence());
                }
                self.validate(s.as_str(), spec).map(Validated::Scalar)
            }
            FieldValue::Multiple(items) => Ok(Validated::List(
                self.validate_elements(items.iter().map(|s| RawValue::Str(s)), spec),
            )),
        }
    }

    /// Validates each element against the element rule of `spec`, keeping
    /// the survivors in order.
    pub(crate) fn validate_elements<'a>(
        &self,
        items: impl IntoIterator<Item = RawValue<'a>>,
        spec: &TypeSpec,
    ) -> Vec<Value> {
        items
            .into_iter()
            .filter_map(|raw| {
                let result = match spec {
                    TypeSpec::Builtin(ty) | TypeSpec::Array(ty) => self.validate_builtin(raw, *ty),
                    TypeSpec::Pattern(pattern) => {
                        PatternRule::new(pattern, MatchMode::Full).validate(raw)
                    }
                };
                result.ok()
            })
            .collect()
    }

    fn validate_builtin(&self, raw: RawValue<'_>, ty: BuiltinType) -> Result<Value, Rejection> {
        if ty.requires_string() && !matches!(raw, RawValue::Str(_)) {
            return Err(type_mismatch(ty));
        }
        match ty {
            BuiltinType::Integer => IntegerRule.validate(raw),
            BuiltinType::Float => FloatRule.validate(raw),
            BuiltinType::Boolean => Ok(BooleanRule.coerce(raw)),
            BuiltinType::Varname => VarnameRule.validate(raw),
            BuiltinType::VarnameList => VarnameListRule.validate(raw),
            BuiltinType::Url => UrlRule.validate(raw),
            BuiltinType::Email => EmailRule.validate(raw),
            BuiltinType::Text => Ok(TextRule.coerce(raw)),
            BuiltinType::Html => Ok(HtmlRule::new(&self.sanitizer).coerce(raw)),
            BuiltinType::DateTime => DateTimeRule.validate(raw),
        }
    }
}

fn not_a_sequence() -> Rejection {
    Rejection::new(
        RejectionKind::NotASequence,
        "a single value was supplied for a multi-valued field",
    )
}
