//! Near-JSON as emitted by the campus portal's script endpoints:
//! `{semesters:{y0:[{id:163,schoolYear:"1994-1995",name:'1'}]}}` with raw
//! line breaks inside strings.

use serde_json::Value;

use crate::error::DecodeError;

/// Rewrites near-JSON into JSON.
///
/// Bare object keys are quoted, single-quoted strings become double-quoted
/// and raw line breaks inside strings are removed. Text inside string
/// literals is otherwise left alone, so already-valid JSON passes through
/// unchanged.
pub fn normalize_jsonish(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut chars = text.chars().peekable();
    // true right after `{` or `,`, where an object key may start
    let mut key_position = false;

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                out.push('"');
                copy_string(&mut chars, &mut out, '"');
                key_position = false;
            }
            '\'' => {
                out.push('"');
                copy_string(&mut chars, &mut out, '\'');
                key_position = false;
            }
            '{' | ',' => {
                out.push(c);
                key_position = true;
            }
            c if c.is_whitespace() => out.push(c),
            c if key_position && is_ident_char(c) => {
                let mut ident = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !is_ident_char(next) {
                        break;
                    }
                    ident.push(next);
                    chars.next();
                }

                let mut spacing = String::new();
                while let Some(&next) = chars.peek() {
                    if !next.is_whitespace() {
                        break;
                    }
                    spacing.push(next);
                    chars.next();
                }

                if chars.peek() == Some(&':') {
                    out.push('"');
                    out.push_str(&ident);
                    out.push('"');
                } else {
                    out.push_str(&ident);
                }
                out.push_str(&spacing);
                key_position = false;
            }
            c => {
                out.push(c);
                key_position = false;
            }
        }
    }

    out
}

/// Parses near-JSON bytes, trying them as plain JSON first.
pub fn decode_jsonish(bytes: &[u8]) -> Result<Value, DecodeError> {
    let text = String::from_utf8_lossy(bytes);
    if let Ok(value) = serde_json::from_str(&text) {
        return Ok(value);
    }

    serde_json::from_str(&normalize_jsonish(&text))
        .map_err(|e| DecodeError::MalformedResponse(e.to_string()))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Copies a string body up to and including its closing quote, which is
/// always written as `"`.
fn copy_string(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    out: &mut String,
    quote: char,
) {
    while let Some(c) = chars.next() {
        match c {
            '\n' | '\r' => {}
            '\\' => match chars.next() {
                Some('\'') if quote == '\'' => out.push('\''),
                Some(escaped) => {
                    out.push('\\');
                    out.push(escaped);
                }
                None => out.push('\\'),
            },
            '"' if quote == '\'' => out.push_str("\\\""),
            c if c == quote => {
                out.push('"');
                return;
            }
            c => out.push(c),
        }
    }
}
