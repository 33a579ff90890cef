// SPDX-License-Identifier: MIT OR Apache-2.0
//! Family-wide options and their declarative overlay form.

use crate::error::ConfigError;
use crate::template;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default key under which the message is stored in params.
pub const DEFAULT_MSG_KEY: &str = "msg";

/// Reserved key holding the type name of a converted foreign error.
pub const CONTEXT_ERROR_KEY: &str = "context_error";

/// Reserved key holding the positional arguments of a converted foreign error.
pub const CONTEXT_ARGS_KEY: &str = "context_args";

// ---------------------------------------------------------------------------
// SetMsg
// ---------------------------------------------------------------------------

/// How a leading positional input becomes the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SetMsg {
    /// Remove it from the positionals and store it under the message key.
    #[default]
    Move,
    /// Store it under the message key and keep it among the positionals.
    Copy,
    /// Never promote positionals.
    Disabled,
}

impl SetMsg {
    /// Stable lowercase name, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Copy => "copy",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for SetMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetMsg {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "move" => Ok(Self::Move),
            "copy" => Ok(Self::Copy),
            "disabled" => Ok(Self::Disabled),
            _ => Err(ConfigError::UnknownSetMsg {
                value: s.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// FamilyOptions
// ---------------------------------------------------------------------------

/// Resolved, immutable options shared by every error of a family.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyOptions {
    /// Key under which the message lives in params.
    pub msg_key: String,
    /// Fallback message when none is supplied.
    pub default_msg: Option<Value>,
    /// How a leading positional becomes the message.
    pub set_msg: SetMsg,
    /// Whether params is appended to args.
    pub add_params_to_args: bool,
    /// Whether a sole positional mapping becomes params.
    pub single_dict_as_params: bool,
    /// Whether message-only errors display as plain text.
    pub simplify_display: bool,
    /// Whether the message is a template rendered against params.
    pub format_msg: bool,
    /// Message → template lookup, consulted only when `format_msg` is on.
    pub formats: Option<BTreeMap<String, String>>,
    /// `new` merges with update (true) or setdefault (false) semantics.
    pub new_update: bool,
    /// Whether `new` converts foreign errors.
    pub new_convert: bool,
    /// Whether converted errors get `context_error`/`context_args`.
    pub new_context: bool,
}

impl Default for FamilyOptions {
    fn default() -> Self {
        Self {
            msg_key: DEFAULT_MSG_KEY.into(),
            default_msg: None,
            set_msg: SetMsg::Move,
            add_params_to_args: true,
            single_dict_as_params: true,
            simplify_display: true,
            format_msg: false,
            formats: None,
            new_update: true,
            new_convert: true,
            new_context: true,
        }
    }
}

impl FamilyOptions {
    /// Check the options for combinations that can never work.
    pub fn validate(&self, family: &str) -> Result<(), ConfigError> {
        if self.msg_key.is_empty() {
            return Err(ConfigError::EmptyMsgKey {
                family: family.into(),
            });
        }
        if self.msg_key == CONTEXT_ERROR_KEY || self.msg_key == CONTEXT_ARGS_KEY {
            return Err(ConfigError::ReservedMsgKey {
                family: family.into(),
                key: self.msg_key.clone(),
            });
        }
        if !self.format_msg {
            return Ok(());
        }

        let invalid = |source| ConfigError::InvalidTemplate {
            family: family.into(),
            source,
        };
        if let Some(Value::String(default)) = &self.default_msg {
            let lookup = self.formats.as_ref().and_then(|f| f.get(default));
            template::validate(lookup.unwrap_or(default)).map_err(invalid)?;
        }
        for tpl in self.formats.iter().flat_map(|f| f.values()) {
            template::validate(tpl).map_err(invalid)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FamilyDecl
// ---------------------------------------------------------------------------

/// Declarative overlay of [`FamilyOptions`]; unset fields inherit from the
/// parent family.
///
/// This is the shape of one `[families.<Name>]` table in a catalog document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FamilyDecl {
    /// Name of the parent family; the base family when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Key under which the message lives in params.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg_key: Option<String>,
    /// Fallback message when none is supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_msg: Option<Value>,
    /// `move`, `copy` or `disabled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_msg: Option<String>,
    /// Whether params is appended to args.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_params_to_args: Option<bool>,
    /// Whether a sole positional mapping becomes params.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_dict_as_params: Option<bool>,
    /// Whether message-only errors display as plain text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simplify_display: Option<bool>,
    /// Whether the message is a template rendered against params.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_msg: Option<bool>,
    /// Message → template lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<BTreeMap<String, String>>,
    /// Update (true) or setdefault (false) semantics for `new`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_update: Option<bool>,
    /// Whether `new` converts foreign errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_convert: Option<bool>,
    /// Whether converted errors get context metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_context: Option<bool>,
}

impl FamilyDecl {
    /// Overlay the declared fields onto `base`.
    ///
    /// Fails only when `set_msg` is not a recognized mode; semantic checks
    /// happen in [`FamilyOptions::validate`].
    pub fn apply(&self, mut base: FamilyOptions) -> Result<FamilyOptions, ConfigError> {
        if let Some(key) = &self.msg_key {
            base.msg_key = key.clone();
        }
        if let Some(msg) = &self.default_msg {
            base.default_msg = Some(msg.clone());
        }
        if let Some(mode) = &self.set_msg {
            base.set_msg = mode.parse()?;
        }
        if let Some(formats) = &self.formats {
            base.formats = Some(formats.clone());
        }

        let flags = [
            (self.add_params_to_args, &mut base.add_params_to_args),
            (self.single_dict_as_params, &mut base.single_dict_as_params),
            (self.simplify_display, &mut base.simplify_display),
            (self.format_msg, &mut base.format_msg),
            (self.new_update, &mut base.new_update),
            (self.new_convert, &mut base.new_convert),
            (self.new_context, &mut base.new_context),
        ];
        for (declared, slot) in flags {
            if let Some(v) = declared {
                *slot = v;
            }
        }
        Ok(base)
    }
}
