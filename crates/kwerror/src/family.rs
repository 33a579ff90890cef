// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error families: named, immutable option sets arranged in a hierarchy,
//! and the `new` conversion/augmentation entry point.

use crate::Params;
use crate::error::{BuildError, ConfigError, NewError};
use crate::options::{CONTEXT_ARGS_KEY, CONTEXT_ERROR_KEY, FamilyDecl, FamilyOptions, SetMsg};
use crate::structured::{KwError, KwErrorBuilder};
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::{debug, trace};

/// Name of the root family every other family descends from.
pub const BASE_FAMILY: &str = "KwError";

static BASE: LazyLock<Family> = LazyLock::new(|| Family {
    inner: Arc::new(FamilyInner {
        name: BASE_FAMILY.into(),
        options: FamilyOptions::default(),
        parent: None,
    }),
});

// ---------------------------------------------------------------------------
// Family
// ---------------------------------------------------------------------------

/// A named error kind with fixed options.
///
/// Cheap to clone; clones share one definition. Two handles are equal when
/// they refer to the same definition, never merely because names match.
#[derive(Clone)]
pub struct Family {
    inner: Arc<FamilyInner>,
}

struct FamilyInner {
    name: String,
    options: FamilyOptions,
    parent: Option<Family>,
}

impl Family {
    /// The root family, named `KwError`, with default options.
    pub fn base() -> &'static Family {
        &BASE
    }

    /// Start defining a family that extends the base family.
    pub fn builder(name: impl Into<String>) -> FamilyBuilder {
        FamilyBuilder {
            name: name.into(),
            parent: Self::base().clone(),
            decl: FamilyDecl::default(),
        }
    }

    /// Family name, used as the type name in debug output.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The resolved options.
    pub fn options(&self) -> &FamilyOptions {
        &self.inner.options
    }

    /// Direct parent, `None` only for the base family.
    pub fn parent(&self) -> Option<&Family> {
        self.inner.parent.as_ref()
    }

    /// This family followed by each ancestor up to the base family.
    pub fn ancestors(&self) -> impl Iterator<Item = &Family> {
        std::iter::successors(Some(self), |&f| f.parent())
    }

    /// Whether this family is `other` or descends from it.
    pub fn is_a(&self, other: &Family) -> bool {
        self.ancestors().any(|f| f == other)
    }

    /// Construct an error from positional and keyword inputs.
    pub fn construct(&self, positional: Vec<Value>, keywords: Params) -> Result<KwError, BuildError> {
        KwError::construct(self, positional, keywords)
    }

    /// Start building an error whose first positional input is `msg`.
    pub fn error(&self, msg: impl Into<Value>) -> KwErrorBuilder {
        KwErrorBuilder::new(self).arg(msg)
    }

    /// Convert or augment `source` into an error of this family.
    ///
    /// * A [`KwError`] of this family or a descendant is returned as-is,
    ///   with `extra` merged in place (update or setdefault per
    ///   `new_update`).
    /// * Anything else becomes a fresh error built from `extra`, annotated
    ///   with `context_error` and `context_args` when `new_context` is on.
    ///   User-supplied values under those keys win.
    /// * With `new_convert` off, foreign errors come back untouched as
    ///   [`NewError::Unconverted`].
    ///
    /// Cause chains are never inspected or altered.
    #[allow(clippy::new_ret_no_self)]
    pub fn new<E>(&self, mut source: E, extra: Params) -> Result<KwError, NewError<E>>
    where
        E: StdError + 'static,
    {
        if let Some(err) = (&mut source as &mut dyn Any).downcast_mut::<KwError>() {
            if err.family().is_a(self) {
                trace!(
                    target: "kwerror.new",
                    family = %self.name(),
                    source_family = %err.name(),
                    keys = extra.len(),
                    "augmenting in place"
                );
                err.merge(extra, self.options().new_update);
                // Moves the error's own allocations out; nothing is cloned.
                return Ok(std::mem::replace(err, KwError::vacant()));
            }
        }
        self.convert(source, extra)
    }

    fn convert<E>(&self, source: E, mut extra: Params) -> Result<KwError, NewError<E>>
    where
        E: StdError + 'static,
    {
        let opts = self.options();
        if !opts.new_convert {
            debug!(
                target: "kwerror.new",
                family = %self.name(),
                "conversion disabled, returning source unchanged"
            );
            return Err(NewError::Unconverted(source));
        }

        if opts.new_context {
            let (type_name, args) = describe(&source);
            trace!(
                target: "kwerror.new",
                family = %self.name(),
                source_type = %type_name,
                "converting foreign error"
            );
            extra
                .entry(CONTEXT_ERROR_KEY)
                .or_insert(Value::String(type_name));
            extra
                .entry(CONTEXT_ARGS_KEY)
                .or_insert(Value::Array(args));
        }
        Ok(self.construct(Vec::new(), extra)?)
    }
}

// Type name and positional arguments of a source error.
fn describe<E: StdError + 'static>(source: &E) -> (String, Vec<Value>) {
    match (source as &dyn Any).downcast_ref::<KwError>() {
        Some(err) => (err.name().to_owned(), err.args()),
        None => (
            short_type_name::<E>().to_owned(),
            vec![Value::String(source.to_string())],
        ),
    }
}

// Last path segment of the type name, generic arguments kept as written.
fn short_type_name<E: ?Sized>() -> &'static str {
    let full = std::any::type_name::<E>();
    let head = full.find('<').unwrap_or(full.len());
    match full[..head].rfind("::") {
        Some(i) => &full[i + 2..],
        None => full,
    }
}

impl PartialEq for Family {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Family {}

impl fmt::Debug for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Family");
        d.field("name", &self.name());
        if let Some(parent) = self.parent() {
            d.field("parent", &parent.name());
        }
        d.field("options", self.options());
        d.finish()
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// FamilyBuilder
// ---------------------------------------------------------------------------

/// Defines a [`Family`]; options not set here are inherited from the parent.
///
/// ```
/// use kwerror::Family;
///
/// let coords = Family::builder("CoordError")
///     .default_msg("x={x} y={y}")
///     .format_msg(true)
///     .build()
///     .unwrap();
/// let err = coords.construct(vec![], kwerror::params!(x = 11, y = 0)).unwrap();
/// assert_eq!(err.msg_str(), Some("x=11 y=0"));
/// ```
#[derive(Debug, Clone)]
pub struct FamilyBuilder {
    name: String,
    parent: Family,
    decl: FamilyDecl,
}

impl FamilyBuilder {
    /// Inherit options from `parent` instead of the base family.
    pub fn extends(mut self, parent: &Family) -> Self {
        self.parent = parent.clone();
        self
    }

    /// Replace every declared override with `decl`. Its `parent` field is
    /// ignored; use [`extends`](Self::extends).
    pub fn declared(mut self, decl: FamilyDecl) -> Self {
        self.decl = decl;
        self
    }

    /// Key under which the message is stored.
    pub fn msg_key(mut self, key: impl Into<String>) -> Self {
        self.decl.msg_key = Some(key.into());
        self
    }

    /// Fallback message when none is supplied.
    pub fn default_msg(mut self, msg: impl Into<Value>) -> Self {
        self.decl.default_msg = Some(msg.into());
        self
    }

    /// How a leading positional becomes the message.
    pub fn set_msg(mut self, mode: SetMsg) -> Self {
        self.decl.set_msg = Some(mode.as_str().to_owned());
        self
    }

    /// Whether params is appended to args.
    pub fn add_params_to_args(mut self, on: bool) -> Self {
        self.decl.add_params_to_args = Some(on);
        self
    }

    /// Whether a sole positional mapping becomes params.
    pub fn single_dict_as_params(mut self, on: bool) -> Self {
        self.decl.single_dict_as_params = Some(on);
        self
    }

    /// Whether message-only errors display as plain text.
    pub fn simplify_display(mut self, on: bool) -> Self {
        self.decl.simplify_display = Some(on);
        self
    }

    /// Whether the message is rendered as a template.
    pub fn format_msg(mut self, on: bool) -> Self {
        self.decl.format_msg = Some(on);
        self
    }

    /// Add a message → template lookup entry.
    pub fn format(mut self, msg: impl Into<String>, template: impl Into<String>) -> Self {
        self.decl
            .formats
            .get_or_insert_with(BTreeMap::new)
            .insert(msg.into(), template.into());
        self
    }

    /// Update (true) or setdefault (false) semantics for [`Family::new`].
    pub fn new_update(mut self, on: bool) -> Self {
        self.decl.new_update = Some(on);
        self
    }

    /// Whether [`Family::new`] converts foreign errors.
    pub fn new_convert(mut self, on: bool) -> Self {
        self.decl.new_convert = Some(on);
        self
    }

    /// Whether converted errors get context metadata.
    pub fn new_context(mut self, on: bool) -> Self {
        self.decl.new_context = Some(on);
        self
    }

    /// Resolve and validate the options; the only place a family can fail.
    pub fn build(self) -> Result<Family, ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        let options = self.decl.apply(self.parent.options().clone())?;
        if self.decl.formats.is_some() && !options.format_msg {
            return Err(ConfigError::FormatsWithoutFormatting { family: self.name });
        }
        options.validate(&self.name)?;
        debug!(
            target: "kwerror.family",
            family = %self.name,
            parent = %self.parent.name(),
            "family defined"
        );
        Ok(Family {
            inner: Arc::new(FamilyInner {
                name: self.name,
                options,
                parent: Some(self.parent),
            }),
        })
    }
}
