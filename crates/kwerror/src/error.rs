// SPDX-License-Identifier: MIT OR Apache-2.0
//! Failures produced while defining families, constructing errors, and
//! converting foreign errors.
//!
//! Display and field access on a [`KwError`](crate::KwError) never fail; every
//! type here is produced either at family definition time ([`ConfigError`]) or
//! at construction time ([`BuildError`], [`NewError`]).

use std::error::Error as StdError;
use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// A family declared an invalid combination of options.
///
/// Detected once, when the family is built, never when an instance is created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The family name was empty or whitespace.
    #[error("family name must not be empty")]
    EmptyName,

    /// The message key was empty.
    #[error("family '{family}': msg_key must not be empty")]
    EmptyMsgKey {
        /// Family being defined.
        family: String,
    },

    /// The message key collides with a key reserved for conversion context.
    #[error("family '{family}': msg_key '{key}' is reserved for conversion context")]
    ReservedMsgKey {
        /// Family being defined.
        family: String,
        /// The offending key.
        key: String,
    },

    /// `set_msg` was not one of `move`, `copy` or `disabled`.
    #[error("unrecognized set_msg value '{value}' (expected move, copy or disabled)")]
    UnknownSetMsg {
        /// The text that failed to parse.
        value: String,
    },

    /// A default message or `formats` entry is not a valid template.
    #[error("family '{family}': invalid template: {source}")]
    InvalidTemplate {
        /// Family being defined.
        family: String,
        /// Why the template was rejected.
        source: FormatError,
    },

    /// A `formats` table was declared while `format_msg` is disabled.
    #[error("family '{family}': formats table declared but format_msg is disabled")]
    FormatsWithoutFormatting {
        /// Family being defined.
        family: String,
    },

    /// The catalog file could not be read.
    #[error("catalog file not found: {path}")]
    FileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The catalog document is not valid TOML or has unknown fields.
    #[error("failed to parse family catalog: {reason}")]
    ParseError {
        /// Human-readable parse error detail.
        reason: String,
    },

    /// A family names a parent that is neither declared nor the base family.
    #[error("family '{family}' extends unknown parent '{parent}'")]
    UnknownParent {
        /// Family being defined.
        family: String,
        /// Parent name that could not be resolved.
        parent: String,
    },

    /// Two families share a name.
    #[error("family '{family}' is defined more than once")]
    DuplicateFamily {
        /// The repeated name.
        family: String,
    },

    /// Parent links loop back on themselves.
    #[error("inheritance cycle through family '{family}'")]
    InheritanceCycle {
        /// A family on the cycle.
        family: String,
    },
}

// ---------------------------------------------------------------------------
// Construction-time errors
// ---------------------------------------------------------------------------

/// Normalization hit a conflict it cannot resolve.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstructionError {
    /// A leading positional would become the message, but the keyword inputs
    /// already carry the message key.
    #[error("{family}: message supplied both positionally and as keyword '{key}'")]
    ConflictingMessage {
        /// Family of the error being constructed.
        family: String,
        /// The family's message key.
        key: String,
    },
}

/// Rendering a message template failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// A placeholder names a key absent from the params.
    #[error("template {template:?} references missing key '{key}'")]
    MissingKey {
        /// The template being rendered.
        template: String,
        /// The unresolved placeholder name.
        key: String,
    },

    /// The template itself is malformed.
    #[error("template {template:?} is malformed at byte {position}: {reason}")]
    Malformed {
        /// The offending template.
        template: String,
        /// Byte offset of the problem.
        position: usize,
        /// What is wrong.
        reason: &'static str,
    },
}

/// Failure while constructing a [`KwError`](crate::KwError).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// Conflicting inputs.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    /// Message template rendering failed.
    #[error(transparent)]
    Format(#[from] FormatError),
}

// ---------------------------------------------------------------------------
// NewError
// ---------------------------------------------------------------------------

/// Outcome of [`Family::new`](crate::Family::new) when no error of the target
/// family could be produced.
#[derive(Debug)]
pub enum NewError<E> {
    /// Conversion is disabled for the family; the source error is handed back
    /// exactly as it was passed in.
    Unconverted(E),
    /// Conversion was attempted but construction failed.
    Build(BuildError),
}

impl<E> NewError<E> {
    /// Recover the source error if it was handed back unconverted.
    pub fn into_unconverted(self) -> Option<E> {
        match self {
            Self::Unconverted(source) => Some(source),
            Self::Build(_) => None,
        }
    }
}

impl<E> From<BuildError> for NewError<E> {
    fn from(err: BuildError) -> Self {
        Self::Build(err)
    }
}

impl<E> From<ConstructionError> for NewError<E> {
    fn from(err: ConstructionError) -> Self {
        Self::Build(err.into())
    }
}

impl<E> From<FormatError> for NewError<E> {
    fn from(err: FormatError) -> Self {
        Self::Build(err.into())
    }
}

impl<E: fmt::Display> fmt::Display for NewError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconverted(source) => fmt::Display::fmt(source, f),
            Self::Build(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl<E: StdError + 'static> StdError for NewError<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Unconverted(source) => source.source(),
            Self::Build(err) => err.source(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn config_error_display_names_family() {
        let err = ConfigError::EmptyMsgKey {
            family: "CoordError".into(),
        };
        assert_eq!(
            err.to_string(),
            "family 'CoordError': msg_key must not be empty"
        );
    }

    #[test]
    fn invalid_template_keeps_format_source() {
        let err = ConfigError::InvalidTemplate {
            family: "F".into(),
            source: FormatError::Malformed {
                template: "{x".into(),
                position: 0,
                reason: "unclosed placeholder",
            },
        };
        let src = err.source().expect("format error is the source");
        assert!(src.to_string().contains("unclosed placeholder"));
    }

    #[test]
    fn build_error_is_transparent() {
        let err: BuildError = FormatError::MissingKey {
            template: "{x}".into(),
            key: "x".into(),
        }
        .into();
        assert_eq!(err.to_string(), r#"template "{x}" references missing key 'x'"#);
    }

    #[test]
    fn unconverted_displays_as_source() {
        let err: NewError<io::Error> = NewError::Unconverted(io::Error::other("disk gone"));
        assert_eq!(err.to_string(), "disk gone");
        let back = err.into_unconverted().expect("source handed back");
        assert_eq!(back.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn build_variant_has_no_unconverted_source() {
        let err: NewError<io::Error> = ConstructionError::ConflictingMessage {
            family: "F".into(),
            key: "msg".into(),
        }
        .into();
        assert!(matches!(err, NewError::Build(BuildError::Construction(_))));
        assert!(err.into_unconverted().is_none());
    }
}
