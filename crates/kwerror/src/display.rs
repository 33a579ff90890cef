// SPDX-License-Identifier: MIT OR Apache-2.0
//! Short (`Display`) and debug (`Debug`) forms of [`KwError`].
//!
//! Values are written in conventional container-literal form: single-quoted
//! strings, `None`/`True`/`False`, `[a, b]` lists and `{'k': v}` mappings, in
//! insertion order.

use crate::{KwError, Params};
use serde_json::Value;
use std::fmt::{self, Display, Write};

/// Literal form of a value: strings quoted, containers bracketed.
pub struct Literal<'a>(pub &'a Value);

/// Plain-text form of a value: strings verbatim, everything else as
/// [`Literal`].
pub struct Plain<'a>(pub &'a Value);

/// Literal form of a params mapping.
pub struct MapLiteral<'a>(pub &'a Params);

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Null => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write_quoted(f, s),
            Value::Array(items) => {
                f.write_char('[')?;
                write_joined(f, items)?;
                f.write_char(']')
            }
            Value::Object(map) => write_map(f, map),
        }
    }
}

impl fmt::Display for Plain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::String(s) => f.write_str(s),
            other => Literal(other).fmt(f),
        }
    }
}

impl fmt::Display for MapLiteral<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_map(f, self.0)
    }
}

fn write_map(f: &mut fmt::Formatter<'_>, map: &Params) -> fmt::Result {
    f.write_char('{')?;
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write_quoted(f, key)?;
        write!(f, ": {}", Literal(value))?;
    }
    f.write_char('}')
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        Literal(item).fmt(f)?;
    }
    Ok(())
}

// Single quotes unless the text has a single quote and no double quote.
fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    f.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => write!(f, "\\{c}")?,
            c if (c as u32) < 0x20 || c == '\x7f' => write!(f, "\\x{:02x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

// ---------------------------------------------------------------------------
// KwError
// ---------------------------------------------------------------------------

impl fmt::Display for KwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(msg) = self.simplified_msg() {
            return Plain(msg).fmt(f);
        }
        if self.family().options().add_params_to_args {
            return write_map(f, self.params());
        }
        match self.positional() {
            [] => Ok(()),
            [only] => Plain(only).fmt(f),
            many => {
                f.write_char('(')?;
                write_joined(f, many)?;
                f.write_char(')')
            }
        }
    }
}

impl fmt::Debug for KwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        match self.simplified_msg() {
            Some(msg) => Literal(msg).fmt(f)?,
            // Same rendering as the short form; leftover positionals stay in `args`.
            None if self.family().options().add_params_to_args => {
                write_map(f, self.params())?
            }
            None => write_joined(f, self.positional())?,
        }
        f.write_char(')')
    }
}
