// SPDX-License-Identifier: MIT OR Apache-2.0
//! `{name}` message templates rendered against params.
//!
//! Supported syntax: `{name}` (plain text of the value), `{name!r}` (literal
//! form), `{name!s}` (same as `{name}`), and `{{` / `}}` for literal braces.
//! Format specifications such as `{x:>5}` are rejected as malformed.

use crate::Params;
use crate::display::{Literal, Plain};
use crate::error::FormatError;

enum Piece<'a> {
    Text(&'a str),
    Brace(char),
    Field { name: &'a str, literal: bool },
}

fn parse(template: &str) -> Result<Vec<Piece<'_>>, FormatError> {
    let malformed = |position, reason| FormatError::Malformed {
        template: template.to_owned(),
        position,
        reason,
    };

    // Braces are ASCII, so every index we slice at is a char boundary.
    let bytes = template.as_bytes();
    let mut pieces = Vec::new();
    let mut text_start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let doubled = bytes.get(i + 1) == Some(&bytes[i]);
        match bytes[i] {
            b @ (b'{' | b'}') if doubled => {
                if text_start < i {
                    pieces.push(Piece::Text(&template[text_start..i]));
                }
                pieces.push(Piece::Brace(char::from(b)));
                i += 2;
                text_start = i;
            }
            b'}' => return Err(malformed(i, "single '}' outside a placeholder")),
            b'{' => {
                let Some(len) = template[i + 1..].find('}') else {
                    return Err(malformed(i, "unclosed placeholder"));
                };
                let field = &template[i + 1..i + 1 + len];
                if field.contains('{') {
                    return Err(malformed(i, "'{' inside a placeholder"));
                }
                if field.contains(':') {
                    return Err(malformed(i, "format specifications are not supported"));
                }
                let (name, literal) = match field.split_once('!') {
                    None => (field, false),
                    Some((name, "s")) => (name, false),
                    Some((name, "r")) => (name, true),
                    Some(_) => return Err(malformed(i, "unknown conversion, expected !r or !s")),
                };
                if name.is_empty() {
                    return Err(malformed(i, "empty placeholder"));
                }
                if text_start < i {
                    pieces.push(Piece::Text(&template[text_start..i]));
                }
                pieces.push(Piece::Field { name, literal });
                i += len + 2;
                text_start = i;
            }
            _ => i += 1,
        }
    }
    if text_start < bytes.len() {
        pieces.push(Piece::Text(&template[text_start..]));
    }
    Ok(pieces)
}

/// Check that `template` parses, without rendering it.
pub(crate) fn validate(template: &str) -> Result<(), FormatError> {
    parse(template).map(|_| ())
}

/// Render `template`, resolving placeholders from `params`.
///
/// `exclude` (the message key) never resolves, so a message cannot refer to
/// itself.
pub(crate) fn render(template: &str, params: &Params, exclude: &str) -> Result<String, FormatError> {
    let mut out = String::with_capacity(template.len());
    for piece in parse(template)? {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Brace(c) => out.push(c),
            Piece::Field { name, literal } => {
                let value = params
                    .get(name)
                    .filter(|_| name != exclude)
                    .ok_or_else(|| FormatError::MissingKey {
                        template: template.to_owned(),
                        key: name.to_owned(),
                    })?;
                let rendered = if literal {
                    Literal(value).to_string()
                } else {
                    Plain(value).to_string()
                };
                out.push_str(&rendered);
            }
        }
    }
    Ok(out)
}
