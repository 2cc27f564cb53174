//! Shared proptest strategies.

use proptest::prelude::*;

/// Pieces of markup that exercise every tokenizer path.
fn arb_piece() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 .,;:!?&#\"'=/()-]{0,12}",
        "[éü“”’€ ]{1,4}",
        Just("<b>".to_string()),
        Just("</b>".to_string()),
        Just("<br/>".to_string()),
        Just("<P>".to_string()),
        Just("<script>".to_string()),
        Just("</script>".to_string()),
        Just("<!-- c -->".to_string()),
        Just("<".to_string()),
        Just(">".to_string()),
        Just("&ldquo;".to_string()),
        Just("&amp;rsquo;".to_string()),
        (
            "(a|img|div|span|font|iframe)",
            "(href|src|title|style|onclick|alt)",
            "[a-zA-Z0-9 :/.#&;\"'<>()]{0,16}",
            "[\"']?",
        )
            .prop_map(|(tag, attr, value, quote)| {
                format!("<{} {}={}{}{}>", tag, attr, quote, value, quote)
            }),
    ]
}

/// Arbitrary HTML-ish fragments built from text and tag pieces.
pub fn arb_fragment() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_piece(), 0..12).prop_map(|pieces| pieces.concat())
}

/// An opening `<a>` tag whose href uses `javascript:` in some quoting and
/// casing style.
pub fn arb_javascript_href() -> impl Strategy<Value = String> {
    (
        "(javascript|JavaScript|JAVASCRIPT|jaVasCript)",
        prop_oneof![Just("\""), Just("'"), Just("")],
        "[ ]{0,2}",
        "[a-z]{1,8}",
    )
        .prop_map(|(scheme, quote, space, func)| {
            format!("<a {space}href={quote}{scheme}:{func}(1){quote}>")
        })
}
