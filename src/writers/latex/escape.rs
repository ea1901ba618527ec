//! LaTeX escaping.

use std::borrow::Cow;

use memchr::memchr3;

/// Where escaped text ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Running text: every special character is replaced.
    Text,
    /// Inside `alltt`: only `\ { }` are special.
    Verbatim,
}

/// Escaped text plus whether it used a `textcomp` symbol macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escaped<'a> {
    pub text: Cow<'a, str>,
    pub textcomp: bool,
}

/// Text symbols without an ASCII spelling, provided by `textcomp`.
fn text_symbol(c: char) -> Option<&'static str> {
    Some(match c {
        'µ' => r"\textmu{}",
        '©' => r"\textcopyright{}",
        '®' => r"\textregistered{}",
        '°' => r"\textdegree{}",
        '€' => r"\texteuro{}",
        '±' => r"\textpm{}",
        '™' => r"\texttrademark{}",
        '¢' => r"\textcent{}",
        '½' => r"\textonehalf{}",
        '¼' => r"\textonequarter{}",
        '¾' => r"\textthreequarters{}",
        '×' => r"\texttimes{}",
        '÷' => r"\textdiv{}",
        _ => return None,
    })
}

fn special(c: char, mode: Mode) -> Option<&'static str> {
    let replacement = match (mode, c) {
        (_, '\\') => r"\textbackslash{}",
        (_, '{') => r"\{",
        (_, '}') => r"\}",
        (Mode::Verbatim, _) => return None,
        (Mode::Text, '#') => r"\#",
        (Mode::Text, '$') => r"\$",
        (Mode::Text, '%') => r"\%",
        (Mode::Text, '&') => r"\&",
        (Mode::Text, '_') => r"\_",
        (Mode::Text, '~') => r"\textasciitilde{}",
        (Mode::Text, '^') => r"\textasciicircum{}",
        // a bare [ would be read as an optional argument of \\ or \item
        (Mode::Text, '[') => "{[}",
        (Mode::Text, ']') => "{]}",
        (Mode::Text, '<') => r"\textless{}",
        (Mode::Text, '>') => r"\textgreater{}",
        (Mode::Text, '|') => r"\textbar{}",
        (Mode::Text, '\u{a0}') => "~",
        _ => return None,
    };
    Some(replacement)
}

/// ASCII characters special in running text besides `\ { }`.
const TEXT_SPECIALS: [[u8; 3]; 4] = [*b"#$%", *b"&_~", *b"^[]", *b"<>|"];

/// Whether `text` can be emitted unchanged.
fn is_clean(text: &str, mode: Mode) -> bool {
    let bytes = text.as_bytes();
    if memchr3(b'\\', b'{', b'}', bytes).is_some() {
        return false;
    }
    if !text.is_ascii() {
        return !text
            .chars()
            .any(|c| special(c, mode).is_some() || text_symbol(c).is_some());
    }
    match mode {
        Mode::Verbatim => true,
        Mode::Text => TEXT_SPECIALS
            .iter()
            .all(|[a, b, c]| memchr3(*a, *b, *c, bytes).is_none()),
    }
}

/// Escape `text` for the given context.
pub fn escape(text: &str, mode: Mode) -> Escaped<'_> {
    if is_clean(text, mode) {
        return Escaped {
            text: Cow::Borrowed(text),
            textcomp: false,
        };
    }

    let mut out = String::with_capacity(text.len() + 16);
    let mut textcomp = false;
    for c in text.chars() {
        if let Some(replacement) = special(c, mode) {
            out.push_str(replacement);
        } else if let Some(symbol) = text_symbol(c) {
            out.push_str(symbol);
            textcomp = true;
        } else {
            out.push(c);
        }
    }
    Escaped {
        text: Cow::Owned(out),
        textcomp,
    }
}

/// Escape running text.
///
/// ```
/// use docweave::writers::latex::encode;
///
/// assert_eq!(encode("50% off [now]"), r"50\% off {[}now{]}");
/// assert_eq!(encode("plain"), "plain");
/// ```
pub fn encode(text: &str) -> Cow<'_, str> {
    escape(text, Mode::Text).text
}

/// Escape a URI for `\url` and `\href`.
pub fn url(uri: &str) -> String {
    let mut out = String::with_capacity(uri.len());
    for c in uri.chars() {
        match c {
            '\\' => out.push_str(r"\\"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '%' => out.push_str(r"\%"),
            '#' => out.push_str(r"\#"),
            _ => out.push(c),
        }
    }
    out
}
