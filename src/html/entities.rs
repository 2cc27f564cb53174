//! Character-reference handling: legacy entity repair, non-ASCII encoding,
//! and the decoding needed to read a URI scheme the way a browser does.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Named entities for U+00A0..=U+00FF, in code point order.
const LATIN1_NAMES: &[&str] = &[
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect",
    "uml", "copy", "ordf", "laquo", "not", "shy", "reg", "macr",
    "deg", "plusmn", "sup2", "sup3", "acute", "micro", "para", "middot",
    "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest",
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil",
    "Egrave", "Eacute", "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml",
    "ETH", "Ntilde", "Ograve", "Oacute", "Ocirc", "Otilde", "Ouml", "times",
    "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute", "THORN", "szlig",
    "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil",
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml",
    "eth", "ntilde", "ograve", "oacute", "ocirc", "otilde", "ouml", "divide",
    "oslash", "ugrave", "uacute", "ucirc", "uuml", "yacute", "thorn", "yuml",
];

/// Smart punctuation entities, optionally double-encoded as `&amp;name;`.
static RE_PUNCTUATION_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:amp;)?(ldquo|rdquo|lsquo|rsquo|sbquo|bdquo|ndash|mdash|hellip);")
        .expect("static regex")
});

/// Numeric character references, with or without the trailing `;`.
static RE_NUMERIC_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)&#(?:x([0-9a-f]+)|([0-9]+));?").expect("static regex")
});

/// Named references that browsers decode inside URLs to hide a scheme.
static RE_URI_NAMED_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)&(colon|tab|newline);").expect("static regex"));

fn punctuation_char(name: &str) -> char {
    match name {
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "sbquo" => '\u{201A}',
        "bdquo" => '\u{201E}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        _ => '\u{2026}',
    }
}

/// Replaces legacy smart-punctuation entities with the code points they
/// name, so they can be re-encoded uniformly.
pub(crate) fn decode_punctuation(input: &str) -> Cow<'_, str> {
    RE_PUNCTUATION_ENTITY.replace_all(input, |caps: &Captures| {
        punctuation_char(&caps[1]).to_string()
    })
}

/// Encodes every non-ASCII character: Latin-1 by name, the rest by number.
pub(crate) fn encode_non_ascii(input: &str, out: &mut String) {
    for c in input.chars() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        let code = c as u32;
        match code
            .checked_sub(0xA0)
            .and_then(|offset| LATIN1_NAMES.get(offset as usize))
        {
            Some(name) => {
                out.push('&');
                out.push_str(name);
                out.push(';');
            }
            None => {
                out.push_str("&#");
                out.push_str(&code.to_string());
                out.push(';');
            }
        }
    }
}

/// Extracts the URI scheme of an attribute value the way a browser reads it.
///
/// Character references are decoded and ASCII whitespace/control characters
/// removed first. Returns `Some("")` for a colon-bearing prefix that is not
/// a well-formed scheme; callers treat that as disallowed.
pub(crate) fn uri_scheme(value: &str) -> Option<String> {
    let decoded = RE_NUMERIC_REFERENCE.replace_all(value, |caps: &Captures| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse::<u32>().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map_or_else(String::new, |c| c.to_string())
    });
    let decoded = RE_URI_NAMED_REFERENCE.replace_all(&decoded, |caps: &Captures| {
        if caps[1].eq_ignore_ascii_case("colon") {
            ":"
        } else {
            ""
        }
    });

    let compact: String = decoded
        .chars()
        .filter(|c| !(c.is_ascii_whitespace() || c.is_control()))
        .collect();
    let end = compact.find([':', '/', '?', '#'])?;
    if !compact[end..].starts_with(':') {
        return None;
    }
    let scheme = &compact[..end];
    let well_formed = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if well_formed {
        Some(scheme.to_ascii_lowercase())
    } else {
        Some(String::new())
    }
}
