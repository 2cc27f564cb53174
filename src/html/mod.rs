//! Whitelist-based sanitizer for HTML fragments.
//!
//! [`HtmlSanitizer::sanitize`] applies four passes in order, each of which
//! is also exposed on its own:
//!
//! 1. [`fix_html_quotes`]: `"` in text becomes `&quot;`; quotes inside tags
//!    are left alone.
//! 2. [`HtmlSanitizer::strip_attributes`]: markers of tags outside the
//!    whitelist are removed (their text stays), `script` elements are removed
//!    with their content, and attributes outside the whitelist are dropped.
//! 3. [`HtmlSanitizer::strip_unsafe_uris`]: URI attributes whose scheme is not
//!    allowed are removed from the tag.
//! 4. [`utf2html`]: legacy punctuation entities are repaired and every
//!    non-ASCII character is written as an entity.
//!
//! Sanitization never fails. Its output is a fixed point: sanitizing it
//! again returns it unchanged.
//!
//! # Examples
//!
//! ```
//! use safe_input::HtmlSanitizer;
//!
//! let sanitizer = HtmlSanitizer::default();
//! let clean = sanitizer.sanitize(
//!     r#"<script>steal()</script><a href="javascript:go()" title="x">Go</a>"#,
//! );
//! assert_eq!(clean, r#"<a title="x">Go</a>"#);
//! ```

mod entities;
mod policy;
mod tokenizer;

pub use policy::SanitizerPolicy;

use tokenizer::{tokenize, Attribute, Tag, Token};

/// Replaces every `"` in text content with `&quot;`.
///
/// Quotes that delimit attribute values inside a tag are not touched.
///
/// # Examples
///
/// ```
/// use safe_input::fix_html_quotes;
///
/// assert_eq!(
///     fix_html_quotes(r#"Test of "quotes" before <a href="http://example.com">link</a>."#),
///     r#"Test of &quot;quotes&quot; before <a href="http://example.com">link</a>."#,
/// );
/// ```
pub fn fix_html_quotes(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    for token in tokenize(fragment) {
        match token {
            Token::Text(text) => push_quoted_text(text, &mut out),
            Token::Tag(tag) => out.push_str(tag.raw),
            Token::Markup(raw) => out.push_str(raw),
        }
    }
    out
}

/// Repairs legacy entity encoding and writes non-ASCII characters as entities.
///
/// Smart-punctuation entities (`&ldquo;`, `&rsquo;`, ... and their
/// double-encoded `&amp;ldquo;` forms) are decoded first, then every
/// non-ASCII character is emitted as a named (Latin-1) or numeric entity.
/// Text-content quotes are normalized as in [`fix_html_quotes`]. ASCII markup
/// passes through untouched.
///
/// # Examples
///
/// ```
/// use safe_input::utf2html;
///
/// assert_eq!(
///     utf2html("<a href=\"#jim\">Jim</a> said, \u{201C}Université\u{201D}"),
///     "<a href=\"#jim\">Jim</a> said, &#8220;Universit&eacute;&#8221;",
/// );
/// ```
pub fn utf2html(fragment: &str) -> String {
    let repaired = entities::decode_punctuation(fragment);
    let mut out = String::with_capacity(repaired.len());
    for token in tokenize(&repaired) {
        match token {
            Token::Text(text) => {
                let mut quoted = String::with_capacity(text.len());
                push_quoted_text(text, &mut quoted);
                entities::encode_non_ascii(&quoted, &mut out);
            }
            Token::Tag(tag) => entities::encode_non_ascii(tag.raw, &mut out),
            Token::Markup(raw) => entities::encode_non_ascii(raw, &mut out),
        }
    }
    out
}

fn push_quoted_text(text: &str, out: &mut String) {
    for c in text.chars() {
        if c == '"' {
            out.push_str("&quot;");
        } else {
            out.push(c);
        }
    }
}

/// Text written back by the filtering passes: a bare `<` is escaped so
/// that removing a tag can never join two pieces of text into a new one.
fn push_text(text: &str, out: &mut String) {
    for c in text.chars() {
        if c == '<' {
            out.push_str("&lt;");
        } else {
            out.push(c);
        }
    }
}

fn push_attribute_value(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Writes a tag in canonical form: lowercase names, double-quoted values.
fn write_tag(name: &str, tag: &Tag<'_>, attrs: &[Attribute<'_>], out: &mut String) {
    if tag.closing {
        out.push_str("</");
        out.push_str(name);
        out.push('>');
        return;
    }
    out.push('<');
    out.push_str(name);
    for attr in attrs {
        out.push(' ');
        out.push_str(&attr.name.to_ascii_lowercase());
        if let Some(value) = attr.value {
            out.push_str("=\"");
            push_attribute_value(value, out);
            out.push('"');
        }
    }
    if tag.self_closing {
        out.push_str(" />");
    } else {
        out.push('>');
    }
}

/// Whitelist sanitizer for HTML fragments.
///
/// Built once from a [`SanitizerPolicy`] and then only read, so one
/// instance can be shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct HtmlSanitizer {
    policy: SanitizerPolicy,
}

impl HtmlSanitizer {
    /// Creates a sanitizer from a policy. Table entries are lowercased.
    pub fn new(policy: SanitizerPolicy) -> Self {
        Self {
            policy: policy.normalized(),
        }
    }

    /// Returns the active policy.
    pub fn policy(&self) -> &SanitizerPolicy {
        &self.policy
    }

    /// Reduces `fragment` to its safe subset.
    ///
    /// Runs quote normalization, tag/attribute filtering, unsafe-URI
    /// stripping and entity cleanup, in that order.
    pub fn sanitize(&self, fragment: &str) -> String {
        let quoted = fix_html_quotes(fragment);
        let filtered = self.strip_attributes(&quoted);
        let safe = self.strip_unsafe_uris(&filtered);
        utf2html(&safe)
    }

    /// Removes tags and attributes outside the whitelist.
    ///
    /// Elements in the policy's drop-with-content set (`script` by default)
    /// are removed together with everything up to their closing tag, or to
    /// the end of the fragment if it is never closed. For any other
    /// disallowed tag only the tag itself goes; its text stays. Comments and
    /// declarations are removed. Surviving tags are rewritten in canonical
    /// form with only their allowed attributes, first occurrence winning.
    ///
    /// # Examples
    ///
    /// ```
    /// use safe_input::HtmlSanitizer;
    ///
    /// let sanitizer = HtmlSanitizer::default();
    /// assert_eq!(
    ///     sanitizer.strip_attributes(
    ///         r#"<div><a href="mylink.html" title="fred" style="font-size:20">Fred</a></div>"#,
    ///     ),
    ///     r#"<div><a href="mylink.html" title="fred">Fred</a></div>"#,
    /// );
    /// ```
    pub fn strip_attributes(&self, fragment: &str) -> String {
        let mut out = String::with_capacity(fragment.len());
        let mut dropping: Option<String> = None;

        for token in tokenize(fragment) {
            if let Some(element) = &dropping {
                if let Token::Tag(tag) = &token {
                    if tag.closing && tag.lower_name() == *element {
                        dropping = None;
                    }
                }
                continue;
            }
            match token {
                Token::Text(text) => push_text(text, &mut out),
                Token::Markup(_) => {}
                Token::Tag(tag) => {
                    let name = tag.lower_name();
                    if self.policy.drops_content_of(&name) {
                        tracing::trace!(tag = %name, "removed element with content");
                        if !tag.closing && !tag.self_closing {
                            dropping = Some(name);
                        }
                        continue;
                    }
                    if !self.policy.allows_tag(&name) {
                        tracing::trace!(tag = %name, "stripped disallowed tag");
                        continue;
                    }
                    let mut kept: Vec<Attribute<'_>> = Vec::with_capacity(tag.attrs.len());
                    for attr in &tag.attrs {
                        let attr_name = attr.name.to_ascii_lowercase();
                        if !self.policy.allows_attribute(&name, &attr_name) {
                            tracing::trace!(tag = %name, attribute = %attr_name, "dropped attribute");
                            continue;
                        }
                        if kept.iter().any(|k| k.name.eq_ignore_ascii_case(attr.name)) {
                            continue;
                        }
                        kept.push(attr.clone());
                    }
                    write_tag(&name, &tag, &kept, &mut out);
                }
            }
        }
        out
    }

    /// Removes URI attributes whose scheme is not in the allowed set.
    ///
    /// Values without a scheme (relative paths, `#anchors`) are kept. The
    /// scheme is read after decoding character references and dropping
    /// whitespace and control characters, so quoting style, case and
    /// `java&#115;cript:` tricks make no difference. Tags that lose an
    /// attribute are rewritten in canonical form; everything else is
    /// copied through.
    pub fn strip_unsafe_uris(&self, fragment: &str) -> String {
        let mut out = String::with_capacity(fragment.len());
        for token in tokenize(fragment) {
            match token {
                Token::Text(text) => out.push_str(text),
                Token::Markup(raw) => out.push_str(raw),
                Token::Tag(tag) => {
                    let kept: Vec<Attribute<'_>> = tag
                        .attrs
                        .iter()
                        .filter(|attr| self.is_safe_attribute(attr))
                        .cloned()
                        .collect();
                    if kept.len() == tag.attrs.len() {
                        out.push_str(tag.raw);
                    } else {
                        tracing::trace!(tag = %tag.lower_name(), "removed unsafe URI attribute");
                        write_tag(&tag.lower_name(), &tag, &kept, &mut out);
                    }
                }
            }
        }
        out
    }

    fn is_safe_attribute(&self, attr: &Attribute<'_>) -> bool {
        if !self
            .policy
            .is_uri_attribute(&attr.name.to_ascii_lowercase())
        {
            return true;
        }
        match attr.value.and_then(entities::uri_scheme) {
            None => true,
            Some(scheme) => self.policy.allows_scheme(&scheme),
        }
    }
}
