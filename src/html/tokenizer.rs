//! Forward scanner that splits a markup fragment into text and tags.
//!
//! This is not an HTML parser: there is no tree, no implied end tags and no
//! character-reference decoding. It only needs to know, at every byte,
//! whether the cursor is in text or inside `<...>`, and to read attributes
//! the way a browser would so that what we keep is what the browser sees.
//! Every split happens on an ASCII byte, so slices stay on char boundaries.

/// One lexical unit of a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Character data between tags
    Text(&'a str),
    /// An opening, closing or self-closing tag
    Tag(Tag<'a>),
    /// Comments, `<!...>` declarations, `<?...>` instructions, and tags cut
    /// off by the end of input
    Markup(&'a str),
}

/// A tag as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tag<'a> {
    pub raw: &'a str,
    pub name: &'a str,
    pub closing: bool,
    pub self_closing: bool,
    pub attrs: Vec<Attribute<'a>>,
}

impl Tag<'_> {
    /// Lowercased tag name.
    pub fn lower_name(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

/// An attribute with its value exactly as written (quotes removed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attribute<'a> {
    pub name: &'a str,
    pub value: Option<&'a str>,
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C')
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b':' || b == b'_'
}

/// Splits `input` into tokens. Adjacent text is merged into one token.
pub(crate) fn tokenize(input: &str) -> Vec<Token<'_>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'<' {
            if let Some((token, end)) = markup_at(input, i) {
                if text_start < i {
                    tokens.push(Token::Text(&input[text_start..i]));
                }
                tokens.push(token);
                i = end;
                text_start = end;
                continue;
            }
        }
        i += 1;
    }
    if text_start < bytes.len() {
        tokens.push(Token::Text(&input[text_start..]));
    }
    tokens
}

/// Reads the construct starting at the `<` at `start`, or `None` if that
/// `<` is plain text.
fn markup_at(input: &str, start: usize) -> Option<(Token<'_>, usize)> {
    let bytes = input.as_bytes();
    match bytes.get(start + 1).copied()? {
        b'!' if input[start..].starts_with("<!--") => {
            let end = input[start + 4..]
                .find("-->")
                .map_or(input.len(), |pos| start + 4 + pos + 3);
            Some((Token::Markup(&input[start..end]), end))
        }
        b'!' | b'?' => {
            let end = input[start..]
                .find('>')
                .map_or(input.len(), |pos| start + pos + 1);
            Some((Token::Markup(&input[start..end]), end))
        }
        b'/' if bytes.get(start + 2).is_some_and(u8::is_ascii_alphabetic) => {
            Some(parse_tag(input, start, start + 2, true))
        }
        b if b.is_ascii_alphabetic() => Some(parse_tag(input, start, start + 1, false)),
        _ => None,
    }
}

fn parse_tag(input: &str, start: usize, name_start: usize, closing: bool) -> (Token<'_>, usize) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let unterminated = (Token::Markup(&input[start..]), len);

    let mut j = name_start;
    while j < len && is_name_byte(bytes[j]) {
        j += 1;
    }
    let name = &input[name_start..j];
    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        while j < len && is_space(bytes[j]) {
            j += 1;
        }
        if j >= len {
            return unterminated;
        }
        match bytes[j] {
            b'>' => {
                j += 1;
                break;
            }
            b'/' => {
                if bytes.get(j + 1) == Some(&b'>') {
                    self_closing = true;
                    j += 2;
                    break;
                }
                j += 1;
                continue;
            }
            _ => {}
        }

        // A leading '=' belongs to the name, which also guarantees progress.
        let name_begin = j;
        j += 1;
        while j < len && !is_space(bytes[j]) && !matches!(bytes[j], b'=' | b'>' | b'/') {
            j += 1;
        }
        let attr_name = &input[name_begin..j];

        let mut k = j;
        while k < len && is_space(bytes[k]) {
            k += 1;
        }
        if k >= len || bytes[k] != b'=' {
            attrs.push(Attribute {
                name: attr_name,
                value: None,
            });
            continue;
        }
        k += 1;
        while k < len && is_space(bytes[k]) {
            k += 1;
        }
        if k >= len {
            return unterminated;
        }
        let value = match bytes[k] {
            quote @ (b'"' | b'\'') => {
                let Some(close) = input[k + 1..].find(quote as char) else {
                    return unterminated;
                };
                let value = &input[k + 1..k + 1 + close];
                j = k + 1 + close + 1;
                value
            }
            _ => {
                let value_start = k;
                while k < len && !is_space(bytes[k]) && bytes[k] != b'>' {
                    k += 1;
                }
                j = k;
                &input[value_start..k]
            }
        };
        attrs.push(Attribute {
            name: attr_name,
            value: Some(value),
        });
    }

    let tag = Tag {
        raw: &input[start..j],
        name,
        closing,
        self_closing,
        attrs,
    };
    (Token::Tag(tag), j)
}
