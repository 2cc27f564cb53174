//! Typed validation and HTML sanitization for untrusted input.
//!
//! Request fields and JSON payloads are validated against a map of field
//! key → rule. Each rule is either a built-in type or a custom pattern.
//! A field that passes comes back as a typed [`Value`]. A field that fails
//! is left out of the output. Markup fields are reduced to a safe
//! whitelist of tags, attributes and URI schemes.
//!
//! # Core Types
//!
//! - [`TypeSpec`]: the rule for one field (built-in type, `Array_` type, or pattern)
//! - [`ValidationMap`]: key → [`TypeSpec`], explicit or inferred
//! - [`Validator`]: applies one rule to one value
//! - [`HtmlSanitizer`]: whitelist sanitizer behind the `HTML` type
//! - [`FieldSetProcessor`]: validates a request's fields against a map
//! - [`JsonValidator`]: validates a JSON object's top-level fields
//! - [`parse_strict`]: date/time parsing that fails instead of defaulting
//!
//! # Failure model
//!
//! Per-field failures are absorbed: the key is simply missing from
//! [`ValidatedFields`], so presence is the acceptance signal. Only whole-call
//! failures return an [`Error`]: malformed JSON, an unmapped key in strict
//! mode, an unparseable date, or a pattern that does not compile.
//!
//! # Examples
//!
//! ```
//! use safe_input::{BuiltinType, FieldSetProcessor, FieldSource, ValidationMap, Value};
//!
//! let mut source = FieldSource::new();
//! source.add("event_id", "913298");
//! source.add("summary", r#"<p onclick="x()">Hi</p><script>steal()</script>"#);
//! source.insert("categories", vec!["1", "2", "The Fox"]);
//!
//! let map = ValidationMap::try_from_pairs([
//!     ("event_id", "Integer"),
//!     ("summary", "HTML"),
//!     ("categories", "Array_Integers"),
//! ])
//! .unwrap();
//!
//! let out = FieldSetProcessor::default().process(&source, Some(&map));
//!
//! assert_eq!(out.scalar("event_id"), Some(&Value::Integer(913298)));
//! assert_eq!(out.scalar("summary"), Some(&Value::Text("<p>Hi</p>".to_string())));
//! assert_eq!(out.list("categories"), Some(&[Value::Integer(1), Value::Integer(2)][..]));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod error;
mod html;
mod inference;
mod json;
mod map;
mod processor;
mod source;
mod tainted;
mod temporal;
mod validator;
mod value;

#[cfg(test)]
mod test_utils;

pub use catalog::{BuiltinType, MatchMode, Pattern, TypeSpec};
pub use error::{DecodeError, Error, ParseError, Rejection, RejectionKind};
pub use html::{fix_html_quotes, utf2html, HtmlSanitizer, SanitizerPolicy};
pub use inference::{default_validation_map, infer_field, infer_type, resolve};
pub use json::JsonValidator;
pub use map::{ValidationMap, ValidationMapBuilder};
pub use processor::FieldSetProcessor;
pub use source::{ExtractFields, FieldSource};
pub use tainted::{RawLen, Tainted};
pub use temporal::parse_strict;
pub use validator::{
    BooleanRule, Coerce, DateTimeRule, EmailRule, FloatRule, HtmlRule, IntegerRule, PatternRule,
    TextRule, UrlRule, Validate, Validator, VarnameListRule, VarnameRule,
};
pub use value::{FieldValue, RawValue, Validated, ValidatedFields, Value};
