//! Embedding source text as a JavaScript template literal.
//!
//! The literal lives inside an inline `<script>`, so besides the template
//! delimiters (`` ` ``, `${`, `\`) it must not contain `</` (closes the
//! script element early), `<!` (switches the HTML tokenizer into escaped
//! script data) or a raw `\r` (template literals normalize line endings).
//! [`unescape`] implements the cooked-value decoding JavaScript applies, so
//! `unescape(&escape(s)) == s` for every `s`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LiteralError {
    #[error("unterminated template literal")]
    Unterminated,
    #[error("invalid escape sequence at byte {0}")]
    InvalidEscape(usize),
    #[error("substitution `${{` is not allowed at byte {0}")]
    Substitution(usize),
}

/// Escape `source` for use between backticks inside an inline script.
pub fn escape(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + source.len() / 16 + 8);
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            '\r' => out.push_str("\\r"),
            // `<\/` cooks to `</`
            '<' if chars.peek() == Some(&'/') => out.push_str("<\\"),
            '<' if chars.peek() == Some(&'!') => out.push_str("\\x3C"),
            _ => out.push(c),
        }
    }
    out
}

/// Raw body of the first template literal following `marker` in `text`.
///
/// `marker` must end right before the opening backtick.
pub fn extract<'a>(text: &'a str, marker: &str) -> Result<&'a str, LiteralError> {
    let start = text
        .find(marker)
        .map(|i| i + marker.len())
        .ok_or(LiteralError::Unterminated)?;
    let body = text[start..]
        .strip_prefix('`')
        .ok_or(LiteralError::Unterminated)?;

    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => return Ok(&body[..i]),
            _ => i += 1,
        }
    }
    Err(LiteralError::Unterminated)
}

/// Decode a raw template literal body into its cooked string value.
pub fn unescape(raw: &str) -> Result<String, LiteralError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '\\' => {
                let Some((_, esc)) = chars.next() else {
                    return Err(LiteralError::InvalidEscape(pos));
                };
                match esc {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'b' => out.push('\u{8}'),
                    'f' => out.push('\u{c}'),
                    'v' => out.push('\u{b}'),
                    '0' => out.push('\0'),
                    'x' => {
                        let code = take_hex(&mut chars, 2).ok_or(LiteralError::InvalidEscape(pos))?;
                        out.push(char::from_u32(code).ok_or(LiteralError::InvalidEscape(pos))?);
                    }
                    'u' => {
                        let code = if chars.peek().map(|&(_, c)| c) == Some('{') {
                            chars.next();
                            let mut code = 0u32;
                            loop {
                                match chars.next() {
                                    Some((_, '}')) => break,
                                    Some((_, d)) => {
                                        let v = d.to_digit(16).ok_or(LiteralError::InvalidEscape(pos))?;
                                        code = code
                                            .checked_mul(16)
                                            .and_then(|c| c.checked_add(v))
                                            .ok_or(LiteralError::InvalidEscape(pos))?;
                                    }
                                    None => return Err(LiteralError::InvalidEscape(pos)),
                                }
                            }
                            code
                        } else {
                            take_hex(&mut chars, 4).ok_or(LiteralError::InvalidEscape(pos))?
                        };
                        out.push(char::from_u32(code).ok_or(LiteralError::InvalidEscape(pos))?);
                    }
                    // Line continuation
                    '\n' | '\u{2028}' | '\u{2029}' => {}
                    '\r' => {
                        if chars.peek().map(|&(_, c)| c) == Some('\n') {
                            chars.next();
                        }
                    }
                    other => out.push(other),
                }
            }
            '$' if chars.peek().map(|&(_, c)| c) == Some('{') => {
                return Err(LiteralError::Substitution(pos));
            }
            '`' => return Err(LiteralError::Unterminated),
            '\r' => {
                // Cooked values normalize CRLF and CR to LF
                if chars.peek().map(|&(_, c)| c) == Some('\n') {
                    chars.next();
                }
                out.push('\n');
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn take_hex(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    n: usize,
) -> Option<u32> {
    let mut code = 0u32;
    for _ in 0..n {
        let (_, d) = chars.next()?;
        code = code * 16 + d.to_digit(16)?;
    }
    Some(code)
}
