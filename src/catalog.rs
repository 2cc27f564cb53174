//! The catalog of built-in type names and the [`TypeSpec`] rule selector.
//!
//! Type names are resolved once, when a [`TypeSpec`] is built. Validation
//! then dispatches on the resolved enum and never looks at the name again.

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::Error;

/// A type from the built-in catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    /// Optional sign followed by digits; yields an integer.
    Integer,
    /// Signed decimal with optional fractional part; yields a float.
    Float,
    /// `true`/`1` and `false`/`0`, case-insensitive. Never rejects: any other
    /// input coerces to `false`.
    Boolean,
    /// Letters, digits and underscore only.
    Varname,
    /// Comma-separated varnames, each with an optional leading `$` that is
    /// stripped from the result.
    VarnameList,
    /// Absolute http/https URL. A bare `host.domain` gets `http://` prepended.
    Url,
    /// Email address with a dot-atom or quoted local part.
    Email,
    /// Any string, returned as is. Never rejects.
    Text,
    /// Any string, returned sanitized. Never rejects.
    Html,
    /// A date/time, normalized to UTC.
    DateTime,
}

impl BuiltinType {
    /// Every catalog entry.
    pub const ALL: [BuiltinType; 10] = [
        BuiltinType::Integer,
        BuiltinType::Float,
        BuiltinType::Boolean,
        BuiltinType::Varname,
        BuiltinType::VarnameList,
        BuiltinType::Url,
        BuiltinType::Email,
        BuiltinType::Text,
        BuiltinType::Html,
        BuiltinType::DateTime,
    ];

    /// Looks up a type by name, ignoring ASCII case.
    ///
    /// # Examples
    ///
    /// ```
    /// use safe_input::BuiltinType;
    ///
    /// assert_eq!(BuiltinType::from_name("html"), Some(BuiltinType::Html));
    /// assert_eq!(BuiltinType::from_name("Integer"), Some(BuiltinType::Integer));
    /// assert_eq!(BuiltinType::from_name("[0-9]+"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name.to_ascii_lowercase().as_str() {
            "integer" | "int" => BuiltinType::Integer,
            "float" | "double" => BuiltinType::Float,
            "boolean" | "bool" => BuiltinType::Boolean,
            "varname" => BuiltinType::Varname,
            "varname_list" | "varnamelist" => BuiltinType::VarnameList,
            "url" => BuiltinType::Url,
            "email" => BuiltinType::Email,
            "text" => BuiltinType::Text,
            "html" => BuiltinType::Html,
            "datetime" | "date" | "timestamp" => BuiltinType::DateTime,
            _ => return None,
        };
        Some(ty)
    }

    /// The canonical name of this type.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinType::Integer => "Integer",
            BuiltinType::Float => "Float",
            BuiltinType::Boolean => "Boolean",
            BuiltinType::Varname => "Varname",
            BuiltinType::VarnameList => "Varname_List",
            BuiltinType::Url => "Url",
            BuiltinType::Email => "Email",
            BuiltinType::Text => "Text",
            BuiltinType::Html => "HTML",
            BuiltinType::DateTime => "DateTime",
        }
    }

    /// Returns `true` for types that map every string to a value instead of
    /// rejecting it (Boolean, Text, HTML).
    pub fn is_lenient(self) -> bool {
        matches!(
            self,
            BuiltinType::Boolean | BuiltinType::Text | BuiltinType::Html
        )
    }

    /// Types that refuse non-string raw values outright.
    pub(crate) fn requires_string(self) -> bool {
        matches!(
            self,
            BuiltinType::Varname
                | BuiltinType::VarnameList
                | BuiltinType::Url
                | BuiltinType::Email
                | BuiltinType::DateTime
        )
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How much of the input a custom pattern has to cover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// The pattern must match the entire string.
    #[default]
    Full,
    /// A match anywhere in the string is enough.
    Partial,
}

/// A caller-supplied regular expression used as a validation rule.
///
/// Both the anchored and the unanchored forms are compiled up front, so a
/// bad pattern is reported when the rule is built rather than per value.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    full: Regex,
    partial: Regex,
}

impl Pattern {
    /// Compiles `source` as a validation pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if `source` is not a valid regular
    /// expression.
    pub fn new(source: &str) -> Result<Self, Error> {
        let compile = |re: &str| {
            Regex::new(re).map_err(|err| Error::InvalidPattern {
                pattern: source.to_string(),
                source: err,
            })
        };
        let partial = compile(source)?;
        let full = compile(&format!("^(?:{})$", source))?;
        Ok(Self {
            source: source.to_string(),
            full,
            partial,
        })
    }

    /// Returns the pattern as supplied.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Tests `text` against the pattern.
    pub fn is_match(&self, text: &str, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Full => self.full.is_match(text),
            MatchMode::Partial => self.partial.is_match(text),
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// The validation rule for one field.
///
/// Built from a type name (case-insensitive), an `Array_<Type>` name, or,
/// when neither matches, a raw pattern.
///
/// # Examples
///
/// ```
/// use safe_input::{BuiltinType, TypeSpec};
///
/// let spec: TypeSpec = "Integer".parse().unwrap();
/// assert_eq!(spec, TypeSpec::Builtin(BuiltinType::Integer));
///
/// let spec: TypeSpec = "Array_Integers".parse().unwrap();
/// assert_eq!(spec, TypeSpec::Array(BuiltinType::Integer));
///
/// let spec: TypeSpec = r"\([0-9]{3}\)[0-9]{3}-[0-9]{4}".parse().unwrap();
/// assert!(matches!(spec, TypeSpec::Pattern(_)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    /// A single value of a built-in type
    Builtin(BuiltinType),
    /// A multi-valued field whose elements are of a built-in type
    Array(BuiltinType),
    /// A custom pattern; accepted values are returned unchanged
    Pattern(Pattern),
}

impl TypeSpec {
    /// Resolves a type name or pattern string into a rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] when `spec` is neither a catalog
    /// name nor a compilable pattern.
    pub fn parse(spec: &str) -> Result<Self, Error> {
        if let Some(ty) = BuiltinType::from_name(spec) {
            return Ok(TypeSpec::Builtin(ty));
        }
        if let Some(ty) = array_element(spec) {
            return Ok(TypeSpec::Array(ty));
        }
        Pattern::new(spec).map(TypeSpec::Pattern)
    }

    /// Returns `true` if the rule declares a multi-valued field.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, TypeSpec::Array(_))
    }

    /// The built-in type applied to each value, if any.
    pub fn builtin(&self) -> Option<BuiltinType> {
        match self {
            TypeSpec::Builtin(ty) | TypeSpec::Array(ty) => Some(*ty),
            TypeSpec::Pattern(_) => None,
        }
    }
}

impl From<BuiltinType> for TypeSpec {
    fn from(ty: BuiltinType) -> Self {
        TypeSpec::Builtin(ty)
    }
}

impl FromStr for TypeSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeSpec::parse(s)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Builtin(ty) => write!(f, "{}", ty),
            TypeSpec::Array(ty) => write!(f, "Array_{}", ty),
            TypeSpec::Pattern(p) => f.write_str(p.source()),
        }
    }
}

/// Resolves `Array_<Type>` (a plural `s` on the element name is allowed).
fn array_element(spec: &str) -> Option<BuiltinType> {
    const PREFIX: &str = "array_";
    if spec.len() <= PREFIX.len() || !spec.is_char_boundary(PREFIX.len()) {
        return None;
    }
    let (prefix, element) = spec.split_at(PREFIX.len());
    if !prefix.eq_ignore_ascii_case(PREFIX) {
        return None;
    }
    BuiltinType::from_name(element).or_else(|| {
        element
            .strip_suffix(['s', 'S'])
            .and_then(BuiltinType::from_name)
    })
}
