//! Whitelist tables for the HTML sanitizer.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Default set of HTML tags that survive sanitization.
const DEFAULT_TAGS: &[&str] = &[
    "a",
    "abbr",
    "b",
    "blockquote",
    "br",
    "cite",
    "code",
    "dd",
    "div",
    "dl",
    "dt",
    "em",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "i",
    "img",
    "li",
    "ol",
    "p",
    "pre",
    "q",
    "small",
    "span",
    "strong",
    "sub",
    "sup",
    "u",
    "ul",
];

/// Attributes allowed on any surviving tag.
const DEFAULT_GLOBAL_ATTRIBUTES: &[&str] = &["href", "title", "alt"];

/// Attributes allowed only on specific tags (tag, attr).
const DEFAULT_TAG_ATTRIBUTES: &[(&str, &str)] = &[
    ("img", "src"),
    ("img", "width"),
    ("img", "height"),
    ("blockquote", "cite"),
    ("q", "cite"),
];

/// Attributes whose value is a URI and is therefore scheme-checked.
const DEFAULT_URI_ATTRIBUTES: &[&str] = &[
    "href",
    "src",
    "cite",
    "action",
    "formaction",
    "background",
    "poster",
    "longdesc",
];

const DEFAULT_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Elements removed together with everything between their tags.
const DEFAULT_DROP_WITH_CONTENT: &[&str] = &["script"];

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The sanitizer's allow-lists.
///
/// All names are compared lowercase. `style` is not in any default
/// attribute table. Fields missing from a deserialized policy take their
/// default values.
///
/// # Examples
///
/// ```
/// use safe_input::SanitizerPolicy;
///
/// let policy: SanitizerPolicy = serde_json::from_str(
///     r#"{ "allowed_tags": ["p", "a"], "allowed_schemes": ["https"] }"#,
/// ).unwrap();
///
/// assert!(policy.allows_tag("a"));
/// assert!(!policy.allows_tag("div"));
/// assert!(policy.allows_scheme("https"));
/// assert!(!policy.allows_scheme("http"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizerPolicy {
    /// Tags kept in the output (markers of any other tag are stripped)
    pub allowed_tags: BTreeSet<String>,
    /// Attributes kept on every allowed tag
    pub global_attributes: BTreeSet<String>,
    /// Extra attributes kept on specific tags
    pub tag_attributes: BTreeMap<String, BTreeSet<String>>,
    /// Attributes whose values are checked for an allowed URI scheme
    pub uri_attributes: BTreeSet<String>,
    /// URI schemes permitted in URI attributes
    pub allowed_schemes: BTreeSet<String>,
    /// Elements dropped along with their content
    pub drop_with_content: BTreeSet<String>,
}

impl Default for SanitizerPolicy {
    fn default() -> Self {
        let mut tag_attributes: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (tag, attr) in DEFAULT_TAG_ATTRIBUTES {
            tag_attributes
                .entry(tag.to_string())
                .or_default()
                .insert(attr.to_string());
        }
        Self {
            allowed_tags: set(DEFAULT_TAGS),
            global_attributes: set(DEFAULT_GLOBAL_ATTRIBUTES),
            tag_attributes,
            uri_attributes: set(DEFAULT_URI_ATTRIBUTES),
            allowed_schemes: set(DEFAULT_SCHEMES),
            drop_with_content: set(DEFAULT_DROP_WITH_CONTENT),
        }
    }
}

impl SanitizerPolicy {
    /// Normalizes every table to lowercase.
    ///
    /// Called by the sanitizer on construction so that hand-built or
    /// deserialized policies compare the same way as the defaults.
    pub(crate) fn normalized(self) -> Self {
        let lower = |s: BTreeSet<String>| -> BTreeSet<String> {
            s.into_iter().map(|v| v.to_ascii_lowercase()).collect()
        };
        let mut tag_attributes: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (tag, attrs) in self.tag_attributes {
            tag_attributes
                .entry(tag.to_ascii_lowercase())
                .or_default()
                .extend(lower(attrs));
        }
        Self {
            allowed_tags: lower(self.allowed_tags),
            global_attributes: lower(self.global_attributes),
            tag_attributes,
            uri_attributes: lower(self.uri_attributes),
            allowed_schemes: lower(self.allowed_schemes),
            drop_with_content: lower(self.drop_with_content),
        }
    }

    /// Returns `true` if `tag` (lowercase) is kept.
    pub fn allows_tag(&self, tag: &str) -> bool {
        self.allowed_tags.contains(tag)
    }

    /// Returns `true` if `attr` (lowercase) is kept on `tag` (lowercase).
    pub fn allows_attribute(&self, tag: &str, attr: &str) -> bool {
        self.global_attributes.contains(attr)
            || self
                .tag_attributes
                .get(tag)
                .is_some_and(|attrs| attrs.contains(attr))
    }

    /// Returns `true` if `attr` (lowercase) carries a URI.
    pub fn is_uri_attribute(&self, attr: &str) -> bool {
        self.uri_attributes.contains(attr)
    }

    /// Returns `true` if `scheme` (lowercase) is permitted.
    pub fn allows_scheme(&self, scheme: &str) -> bool {
        self.allowed_schemes.contains(scheme)
    }

    /// Returns `true` if `tag` (lowercase) is removed with its content.
    pub fn drops_content_of(&self, tag: &str) -> bool {
        self.drop_with_content.contains(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_secure() {
        let policy = SanitizerPolicy::default();

        for tag in ["a", "b", "i", "p", "br", "div"] {
            assert!(policy.allows_tag(tag), "{} should be allowed", tag);
        }
        for tag in ["script", "iframe", "object", "style", "form"] {
            assert!(!policy.allows_tag(tag), "{} should be stripped", tag);
        }
        assert!(policy.allows_attribute("a", "href"));
        assert!(policy.allows_attribute("a", "title"));
        assert!(policy.allows_attribute("img", "alt"));
        assert!(policy.allows_attribute("img", "src"));
        assert!(!policy.allows_attribute("a", "src"));
        assert!(policy.drops_content_of("script"));
        assert!(!policy.drops_content_of("style"));
        assert!(policy.allows_scheme("http"));
        assert!(policy.allows_scheme("https"));
        assert!(!policy.allows_scheme("javascript"));
        assert!(!policy.allows_scheme("data"));
    }

    #[test]
    fn style_is_never_a_default_attribute() {
        let policy = SanitizerPolicy::default();
        for tag in &policy.allowed_tags {
            assert!(!policy.allows_attribute(tag, "style"));
        }
    }

    #[test]
    fn event_handlers_are_never_default_attributes() {
        let policy = SanitizerPolicy::default();
        let all_attrs = policy
            .global_attributes
            .iter()
            .chain(policy.tag_attributes.values().flatten());
        for attr in all_attrs {
            assert!(!attr.starts_with("on"), "{} looks like a handler", attr);
        }
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let policy: SanitizerPolicy =
            serde_json::from_str(r#"{ "allowed_schemes": ["https", "ftp"] }"#).unwrap();

        assert!(policy.allows_scheme("ftp"));
        assert!(!policy.allows_scheme("http"));
        assert!(policy.allows_tag("p"));
        assert!(policy.drops_content_of("script"));
    }

    #[test]
    fn normalization_lowercases_tables() {
        let mut policy = SanitizerPolicy::default();
        policy.allowed_tags.insert("TABLE".to_string());
        policy
            .tag_attributes
            .insert("TD".to_string(), set(&["ColSpan"]));

        let policy = policy.normalized();
        assert!(policy.allows_tag("table"));
        assert!(policy.allows_attribute("td", "colspan"));
    }
}
