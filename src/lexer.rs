//! Per-line tokenizer for assembly source text.
//!
//! The lexer splits one source line into owned [`String`] tokens.
//! Interpretation is deferred: a token may later turn out to be a mnemonic,
//! a register, a literal, a label definition, or a symbol reference, but at
//! this stage it is just text. Three lexical shapes get special treatment:
//!
//! - A `"`-delimited string is a single token (kept verbatim, quotes
//!   included); backslash escapes follow C-string conventions and only
//!   matter here insofar as `\"` does not terminate the literal.
//! - Parentheses bracketing a register mnemonic (`4(sp)`) split into
//!   separate tokens `4`, `(`, `sp`, `)`. Any other parenthesis is an
//!   ordinary character inside its token.
//! - The first occurrence of the ISA's comment delimiter ends the line.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::Error;

/// The tokens of one source line, in order.
pub type LineTokens = Vec<String>;

/// Number of bytes in the UTF-8 sequence introduced by `leading`.
#[inline]
fn utf8_width(leading: u8) -> usize {
    match leading {
        0xF0..=0xF7 => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}

/// Split one source line into tokens.
///
/// Whitespace and commas separate tokens. `is_register` decides whether a
/// parenthesized substring is a register mnemonic (and thus a token
/// boundary); the comment delimiter cuts the line short.
///
/// # Errors
///
/// Returns an [`Error`] attributed to `source_line` when a quoted string
/// literal is not terminated before the end of the line.
pub fn tokenize(
    line: &str,
    source_line: u32,
    comment_delimiter: char,
    is_register: impl Fn(&str) -> bool,
) -> Result<LineTokens, Error> {
    let bytes = line.as_bytes();
    let len = bytes.len();
    let mut tokens: LineTokens = Vec::new();
    let mut current = String::new();
    let mut pos = 0;

    while pos < len {
        let ch = bytes[pos];

        // Comment: everything from the delimiter on is discarded.
        if line[pos..].starts_with(comment_delimiter) {
            break;
        }

        // Multi-byte UTF-8 sequences carry no lexical meaning; copy them
        // through so `pos` stays on a character boundary.
        if ch >= 0x80 {
            let width = utf8_width(ch).min(len - pos);
            current.push_str(core::str::from_utf8(&bytes[pos..pos + width]).unwrap_or(""));
            pos += width;
            continue;
        }

        // Token separators.
        if ch == b' ' || ch == b'\t' || ch == b',' {
            flush(&mut tokens, &mut current);
            pos += 1;
            continue;
        }

        // Quoted string literal — one token, quotes retained.
        if ch == b'"' {
            flush(&mut tokens, &mut current);
            let start = pos;
            pos += 1;
            let mut terminated = false;
            while pos < len {
                if bytes[pos] == b'\\' && pos + 1 < len {
                    pos += 2;
                    continue;
                }
                if bytes[pos] == b'"' {
                    terminated = true;
                    pos += 1;
                    break;
                }
                pos += 1;
            }
            if !terminated {
                return Err(Error::new(source_line, "Unterminated string literal"));
            }
            tokens.push(String::from(&line[start..pos]));
            continue;
        }

        // Parenthesis bracketing a register mnemonic splits the token.
        if ch == b'(' {
            if let Some(rel) = line[pos + 1..].find(')') {
                let inner = &line[pos + 1..pos + 1 + rel];
                if !inner.is_empty() && is_register(inner) {
                    flush(&mut tokens, &mut current);
                    tokens.push(String::from("("));
                    tokens.push(String::from(inner));
                    tokens.push(String::from(")"));
                    pos += rel + 2;
                    continue;
                }
            }
            current.push('(');
            pos += 1;
            continue;
        }

        current.push(ch as char);
        pos += 1;
    }

    flush(&mut tokens, &mut current);
    Ok(tokens)
}

#[inline]
fn flush(tokens: &mut LineTokens, current: &mut String) {
    if !current.is_empty() {
        tokens.push(core::mem::take(current));
    }
}

/// Decode a quoted string token into its byte content.
///
/// The token must start and end with `"`. Recognized escapes are `\n`,
/// `\t`, `\\`, `\"`, `\0`, and `\xHH`.
///
/// # Errors
///
/// Returns a message (without a line number — the caller attaches one) when
/// the token is not a quoted literal or contains an unknown escape.
pub fn unescape(token: &str) -> Result<Vec<u8>, String> {
    let inner = token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .ok_or_else(|| format!("Invalid string literal {token}"))?;

    let bytes = inner.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] != b'\\' {
            out.push(bytes[pos]);
            pos += 1;
            continue;
        }
        pos += 1;
        let escape = *bytes
            .get(pos)
            .ok_or_else(|| String::from("Trailing backslash in string literal"))?;
        match escape {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'\\' => out.push(b'\\'),
            b'"' => out.push(b'"'),
            b'0' => out.push(0),
            b'x' => {
                let hi = bytes.get(pos + 1).copied().and_then(hex_digit);
                let lo = bytes.get(pos + 2).copied().and_then(hex_digit);
                match (hi, lo) {
                    (Some(h), Some(l)) => {
                        out.push(h * 16 + l);
                        pos += 2;
                    }
                    _ => return Err(String::from("Invalid \\xHH escape sequence")),
                }
            }
            other => return Err(format!("Unknown escape sequence '\\{}'", other as char)),
        }
        pos += 1;
    }
    Ok(out)
}

#[inline]
fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn rv_regs(name: &str) -> bool {
        matches!(name, "sp" | "x2" | "a0" | "t0")
    }

    fn tok(line: &str) -> LineTokens {
        tokenize(line, 1, '#', rv_regs).unwrap()
    }

    #[test]
    fn empty_line() {
        assert!(tok("").is_empty());
    }

    #[test]
    fn whitespace_only() {
        assert!(tok(" \t  ").is_empty());
    }

    #[test]
    fn splits_on_spaces_and_tabs() {
        assert_eq!(tok("addi\tx1 x0  5"), vec!["addi", "x1", "x0", "5"]);
    }

    #[test]
    fn commas_separate_tokens() {
        assert_eq!(tok("addi x1, x0, 5"), vec!["addi", "x1", "x0", "5"]);
    }

    #[test]
    fn comment_discards_rest_of_line() {
        assert_eq!(tok("nop # the rest"), vec!["nop"]);
    }

    #[test]
    fn comment_terminates_current_token() {
        assert_eq!(tok("nop#tail"), vec!["nop"]);
    }

    #[test]
    fn comment_only_line() {
        assert!(tok("# nothing here").is_empty());
    }

    #[test]
    fn register_parens_split() {
        assert_eq!(tok("lw x1, 4(sp)"), vec!["lw", "x1", "4", "(", "sp", ")"]);
    }

    #[test]
    fn non_register_parens_are_literal() {
        assert_eq!(tok("foo(bar)"), vec!["foo(bar)"]);
    }

    #[test]
    fn unmatched_paren_is_literal() {
        assert_eq!(tok("foo(sp"), vec!["foo(sp"]);
    }

    #[test]
    fn parens_at_token_start() {
        assert_eq!(tok("(sp)"), vec!["(", "sp", ")"]);
    }

    #[test]
    fn quoted_string_is_one_token() {
        assert_eq!(tok(".string \"hello world\""), vec![".string", "\"hello world\""]);
    }

    #[test]
    fn escaped_quote_does_not_terminate() {
        assert_eq!(tok(r#""a\"b""#), vec![r#""a\"b""#]);
    }

    #[test]
    fn comment_delimiter_inside_string_is_kept() {
        assert_eq!(tok(".string \"a#b\""), vec![".string", "\"a#b\""]);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize(".string \"oops", 7, '#', rv_regs).unwrap_err();
        assert_eq!(err.line, 7);
        assert!(err.message.contains("Unterminated string literal"));
    }

    #[test]
    fn label_token_keeps_colon() {
        // Symbol splitting happens in pass 0, not here.
        assert_eq!(tok("loop: nop"), vec!["loop:", "nop"]);
    }

    #[test]
    fn unescape_plain() {
        assert_eq!(unescape("\"abc\"").unwrap(), b"abc");
    }

    #[test]
    fn unescape_sequences() {
        assert_eq!(unescape(r#""a\nb\t\\c\0\x41""#).unwrap(), b"a\nb\t\\c\0A");
    }

    #[test]
    fn unescape_rejects_unknown_escape() {
        let err = unescape(r#""\q""#).unwrap_err();
        assert!(err.contains("Unknown escape sequence"));
    }

    #[test]
    fn unescape_rejects_unquoted() {
        assert!(unescape("abc").is_err());
    }
}
