use std::fmt;

/// A raw value from an untrusted source, readable only by this crate's
/// validators.
///
/// Request fields enter the crate wrapped in `Tainted` and leave it only as
/// validated [`Value`](crate::Value)s. The wrapper has no `Deref`, `AsRef` or
/// accessor, so callers cannot read the raw value back out and use it
/// unvalidated by accident.
///
/// # Examples
///
/// ```
/// use safe_input::{FieldValue, Tainted};
///
/// let raw = Tainted::new(FieldValue::from("'; DROP TABLE users; --"));
///
/// // Debug shows the length only.
/// assert_eq!(format!("{:?}", raw), "Tainted(<23 bytes>)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Tainted<T> {
    // Private: the only way out is through a validator.
    inner: T,
}

impl<T> Tainted<T> {
    /// Marks `value` as untrusted.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Borrows the raw value for validation.
    pub(crate) fn as_inner(&self) -> &T {
        &self.inner
    }
}

/// Size in bytes of the raw content, used in place of the content in
/// debug output.
pub trait RawLen {
    /// Total bytes of raw text held.
    fn raw_len(&self) -> usize;
}

impl RawLen for String {
    fn raw_len(&self) -> usize {
        self.len()
    }
}

impl RawLen for crate::FieldValue {
    fn raw_len(&self) -> usize {
        match self {
            crate::FieldValue::Single(s) => s.len(),
            crate::FieldValue::Multiple(items) => items.iter().map(String::len).sum(),
        }
    }
}

// Raw input never reaches logs through Debug.
impl<T: RawLen> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tainted(<{} bytes>)", self.inner.raw_len())
    }
}
