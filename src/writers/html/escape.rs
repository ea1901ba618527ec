//! HTML text and attribute escaping.

use std::borrow::Cow;

use memchr::memchr3;

/// Escape `& < > " @` for use in HTML text.
///
/// `@` becomes `&#64;` so that addresses in text are not harvested verbatim.
/// Text without any of these characters is returned borrowed.
///
/// ```
/// use docweave::writers::html::encode;
///
/// assert_eq!(encode("Hello & welcome"), "Hello &amp; welcome");
/// assert_eq!(encode("a@b"), "a&#64;b");
/// assert_eq!(encode("plain"), "plain");
/// ```
pub fn encode(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    if memchr3(b'&', b'<', b'>', bytes).is_none() && memchr::memchr2(b'"', b'@', bytes).is_none()
    {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '@' => out.push_str("&#64;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape an attribute value; newlines and tabs become spaces.
pub fn attval(text: &str) -> String {
    let flattened: String = text
        .chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect();
    encode(&flattened).into_owned()
}

/// Make text safe inside `<!-- ... -->`.
///
/// Every `-` followed by another `-` gains a trailing space, so no run of
/// dashes can close the comment early.
///
/// ```
/// use docweave::writers::html::comment;
///
/// assert_eq!(comment("a ---> b"), "a - - -> b");
/// ```
pub fn comment(text: &str) -> Cow<'_, str> {
    if memchr::memmem::find(text.as_bytes(), b"--").is_none() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '-' && chars.peek() == Some(&'-') {
            out.push(' ');
        }
    }
    Cow::Owned(out)
}
