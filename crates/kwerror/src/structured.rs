// SPDX-License-Identifier: MIT OR Apache-2.0
//! The [`KwError`] value and its construction pipeline.

use crate::Params;
use crate::error::{BuildError, ConstructionError};
use crate::family::Family;
use crate::options::SetMsg;
use crate::template;
use serde_json::Value;

// ---------------------------------------------------------------------------
// KwError
// ---------------------------------------------------------------------------

/// An error carrying ordered keyword parameters.
///
/// Built by [`Family::construct`], [`KwErrorBuilder`], or the
/// [`kwerror!`](crate::kwerror) macro. The value is intentionally not
/// `Clone`: whatever [`Family::new`] hands back on its augmentation path is
/// the very instance that was passed in.
///
/// ```
/// use kwerror::{Family, kwerror};
///
/// let err = kwerror!(Family::base(), "Invalid coordinates", x = 11, y = 0).unwrap();
/// assert_eq!(err.to_string(), "{'msg': 'Invalid coordinates', 'x': 11, 'y': 0}");
/// assert_eq!(err.msg().and_then(|m| m.as_str()), Some("Invalid coordinates"));
/// ```
pub struct KwError {
    family: Family,
    params: Params,
    positional: Vec<Value>,
}

impl KwError {
    /// Normalize positional and keyword inputs into a new error of `family`.
    pub(crate) fn construct(
        family: &Family,
        mut positional: Vec<Value>,
        mut keywords: Params,
    ) -> Result<Self, BuildError> {
        let opts = family.options();
        let key = opts.msg_key.as_str();

        if opts.single_dict_as_params
            && keywords.is_empty()
            && matches!(positional.as_slice(), [Value::Object(_)])
        {
            if let Some(Value::Object(map)) = positional.pop() {
                keywords = map;
            }
        }

        if opts.set_msg != SetMsg::Disabled && !positional.is_empty() {
            if keywords.contains_key(key) {
                return Err(ConstructionError::ConflictingMessage {
                    family: family.name().into(),
                    key: key.into(),
                }
                .into());
            }
            let msg = match opts.set_msg {
                SetMsg::Move => positional.remove(0),
                _ => positional[0].clone(),
            };
            keywords = prepend(key, msg, keywords);
        }

        if let Some(default) = &opts.default_msg {
            if !keywords.contains_key(key) {
                keywords = prepend(key, default.clone(), keywords);
            }
        }

        if opts.format_msg {
            let rendered = match keywords.get(key) {
                Some(Value::String(msg)) => {
                    let fmt = opts
                        .formats
                        .as_ref()
                        .and_then(|formats| formats.get(msg))
                        .unwrap_or(msg);
                    Some(template::render(fmt, &keywords, key)?)
                }
                _ => None,
            };
            if let Some(msg) = rendered {
                keywords.insert(key.to_owned(), Value::String(msg));
            }
        }

        Ok(Self {
            family: family.clone(),
            params: keywords,
            positional,
        })
    }

    /// A base-family error with nothing in it; fills the slot an error was
    /// moved out of.
    pub(crate) fn vacant() -> Self {
        Self {
            family: Family::base().clone(),
            params: Params::new(),
            positional: Vec::new(),
        }
    }

    /// The message: `params[msg_key]`, else the family default, else `None`.
    pub fn msg(&self) -> Option<&Value> {
        let opts = self.family.options();
        self.params
            .get(&opts.msg_key)
            .or(opts.default_msg.as_ref())
    }

    /// The message when it is a string.
    pub fn msg_str(&self) -> Option<&str> {
        self.msg().and_then(Value::as_str)
    }

    /// The ordered params.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Direct mutable access to the params.
    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// Consume the error, keeping only its params.
    pub fn into_params(self) -> Params {
        self.params
    }

    /// Look up a single param.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Positional inputs that were not promoted to the message.
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// The args sequence: remaining positionals, then the params mapping when
    /// the family appends it.
    pub fn args(&self) -> Vec<Value> {
        let mut args = self.positional.clone();
        if self.family.options().add_params_to_args {
            args.push(Value::Object(self.params.clone()));
        }
        args
    }

    /// The family this error belongs to.
    pub fn family(&self) -> &Family {
        &self.family
    }

    /// Name of the family, used as the type name in the debug form.
    pub fn name(&self) -> &str {
        self.family.name()
    }

    /// Merge `extra` into the params in place, using this error's family
    /// `new_update` setting.
    pub fn augment(&mut self, extra: Params) -> &mut Self {
        let update = self.family.options().new_update;
        self.merge(extra, update);
        self
    }

    /// Update semantics overwrite existing keys; otherwise only absent keys
    /// are filled.
    pub(crate) fn merge(&mut self, extra: Params, update: bool) {
        for (key, value) in extra {
            if update {
                self.params.insert(key, value);
            } else {
                self.params.entry(key).or_insert(value);
            }
        }
    }

    /// The message, when this error displays in simplified form.
    pub(crate) fn simplified_msg(&self) -> Option<&Value> {
        let opts = self.family.options();
        let message_only = opts.simplify_display
            && opts.add_params_to_args
            && self.positional.is_empty()
            && self.params.len() == 1;
        if message_only {
            self.params.get(&opts.msg_key)
        } else {
            None
        }
    }
}

impl std::error::Error for KwError {}

fn prepend(key: &str, value: Value, rest: Params) -> Params {
    let mut params = Params::with_capacity(rest.len() + 1);
    params.insert(key.to_owned(), value);
    params.extend(rest);
    params
}

// ---------------------------------------------------------------------------
// KwErrorBuilder
// ---------------------------------------------------------------------------

/// Collects positional and keyword inputs for [`Family::construct`].
///
/// ```
/// use kwerror::{Family, KwErrorBuilder};
///
/// let err = KwErrorBuilder::new(Family::base())
///     .arg("disk full")
///     .param("free_bytes", 0)
///     .build()
///     .unwrap();
/// assert_eq!(err.msg_str(), Some("disk full"));
/// ```
#[derive(Debug, Clone)]
pub struct KwErrorBuilder {
    family: Family,
    positional: Vec<Value>,
    keywords: Params,
}

impl KwErrorBuilder {
    /// Start an empty set of inputs for `family`.
    pub fn new(family: &Family) -> Self {
        Self {
            family: family.clone(),
            positional: Vec::new(),
            keywords: Params::new(),
        }
    }

    /// Append a positional input.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword input; a repeated key keeps its first position and takes
    /// the latest value.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keywords.insert(key.into(), value.into());
        self
    }

    /// Set several keyword inputs at once.
    pub fn params(mut self, params: Params) -> Self {
        self.keywords.extend(params);
        self
    }

    /// Run the construction pipeline.
    pub fn build(self) -> Result<KwError, BuildError> {
        KwError::construct(&self.family, self.positional, self.keywords)
    }
}
