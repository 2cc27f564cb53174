use std::fmt;

/// Errors that fail a whole call.
///
/// Per-field validation failures are NOT represented here: they surface as
/// a [`Rejection`] from the single-value API and as an omitted key from the
/// field-set processors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The JSON payload could not be decoded into an object.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Strict JSON validation found a top-level key with no rule.
    #[error("field '{key}' has no validation rule")]
    UnknownField {
        /// The offending top-level key
        key: String,
    },

    /// A custom pattern in a type spec does not compile.
    #[error("invalid validation pattern '{pattern}'")]
    InvalidPattern {
        /// The pattern as supplied by the caller
        pattern: String,
        /// Compiler diagnostic from the regex engine
        #[source]
        source: regex::Error,
    },
}

/// A JSON payload that is not well-formed, or not an object at the top level.
#[derive(Debug, thiserror::Error)]
#[error("malformed JSON payload: {message}")]
pub struct DecodeError {
    message: String,
}

impl DecodeError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the decoder's description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        // serde_json messages carry line/column only, never payload text
        Self::new(err.to_string())
    }
}

/// A date/time string that matches none of the accepted layouts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unparseable date/time ({len} bytes)")]
pub struct ParseError {
    len: usize,
}

impl ParseError {
    pub(crate) fn new(input: &str) -> Self {
        Self { len: input.len() }
    }
}

impl From<ParseError> for Rejection {
    fn from(err: ParseError) -> Self {
        Rejection::new(RejectionKind::Malformed, err.to_string())
    }
}

/// A single value that failed its type rule.
///
/// Rejections never carry the rejected input, so they are safe to log.
///
/// # Examples
///
/// ```
/// use safe_input::{Rejection, RejectionKind};
///
/// let rejection = Rejection::new(RejectionKind::Malformed, "not an integer");
/// assert_eq!(rejection.kind(), RejectionKind::Malformed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rejected ({kind}): {message}")]
pub struct Rejection {
    kind: RejectionKind,
    message: String,
}

impl Rejection {
    /// Creates a new rejection.
    pub fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the rejection kind.
    pub fn kind(&self) -> RejectionKind {
        self.kind
    }

    /// Returns the rejection message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Why a value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// The text does not have the shape the type requires.
    Malformed,
    /// A non-string value was supplied where only a string is accepted.
    TypeMismatch,
    /// A custom pattern did not match.
    PatternMismatch,
    /// The text has the right shape but the number does not fit.
    OutOfRange,
    /// A single value was supplied for a multi-valued type.
    NotASequence,
    /// The value has a structure this layer does not validate (nested objects, null).
    Unsupported,
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed"),
            Self::TypeMismatch => write!(f, "type mismatch"),
            Self::PatternMismatch => write!(f, "pattern mismatch"),
            Self::OutOfRange => write!(f, "out of range"),
            Self::NotASequence => write!(f, "not a sequence"),
            Self::Unsupported => write!(f, "unsupported structure"),
        }
    }
}
