// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors that carry ordered keyword parameters instead of an opaque message.
//!
//! Every [`KwError`] holds `params`, an insertion-ordered mapping of names to
//! [`Value`]s. The message is just one entry in that mapping (under the
//! family's `msg_key`, `"msg"` by default), so callers can attach as much
//! structured data as they like and read it back without parsing strings.
//!
//! Behaviour is configured per [`Family`]: a named, immutable option set
//! checked once when it is built. Families form a hierarchy; [`Family::new`]
//! augments errors of the family (or a descendant) in place and wraps any
//! other error with contextual metadata.
//!
//! ```
//! use kwerror::{Family, kwerror, params};
//!
//! let coords = Family::builder("CoordError").build().unwrap();
//!
//! let err = kwerror!(&coords, "Invalid coordinates", x = 11, y = 0).unwrap();
//! assert_eq!(err.to_string(), "{'msg': 'Invalid coordinates', 'x': 11, 'y': 0}");
//! assert_eq!(
//!     format!("{err:?}"),
//!     "CoordError({'msg': 'Invalid coordinates', 'x': 11, 'y': 0})"
//! );
//!
//! let err = kwerror!(&coords, "Invalid coordinates").unwrap();
//! assert_eq!(err.to_string(), "Invalid coordinates");
//! assert_eq!(format!("{err:?}"), "CoordError('Invalid coordinates')");
//!
//! let io = std::io::Error::other("disk gone");
//! let wrapped = coords.new(io, params!(path = "/tmp")).unwrap();
//! assert_eq!(wrapped.get("context_args"), Some(&serde_json::json!(["disk gone"])));
//! ```
//!
//! Instances are not internally synchronized. Augmentation needs `&mut`
//! access, so sharing an error across threads for mutation is left to the
//! caller.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod display;
mod error;
mod family;
mod options;
mod structured;
mod template;

pub use catalog::{CatalogDocument, FamilyCatalog};
pub use display::{Literal, MapLiteral, Plain};
pub use error::{BuildError, ConfigError, ConstructionError, FormatError, NewError};
pub use family::{BASE_FAMILY, Family, FamilyBuilder};
pub use options::{
    CONTEXT_ARGS_KEY, CONTEXT_ERROR_KEY, DEFAULT_MSG_KEY, FamilyDecl, FamilyOptions, SetMsg,
};
pub use serde_json::Value;
pub use structured::{KwError, KwErrorBuilder};

/// Ordered keyword parameters carried by a [`KwError`].
pub type Params = serde_json::Map<String, Value>;

/// Build [`Params`] from `key = value` pairs, keeping their order.
///
/// ```
/// let p = kwerror::params!(x = 11, y = "up");
/// assert_eq!(p.keys().collect::<Vec<_>>(), ["x", "y"]);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($key:ident = $value:expr),+ $(,)?) => {{
        let mut params = $crate::Params::new();
        $(
            params.insert(
                ::std::string::String::from(::std::stringify!($key)),
                $crate::Value::from($value),
            );
        )+
        params
    }};
}

/// Construct a [`KwError`] in keyword-argument style.
///
/// `kwerror!(family, key = value, ...)` passes keyword inputs only;
/// `kwerror!(family, msg, key = value, ...)` also passes `msg` as the leading
/// positional input. Expands to a `Result<KwError, BuildError>`.
#[macro_export]
macro_rules! kwerror {
    ($family:expr $(, $key:ident = $value:expr)* $(,)?) => {
        ($family).construct(::std::vec::Vec::new(), $crate::params!($($key = $value),*))
    };
    ($family:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        ($family).construct(
            ::std::vec![$crate::Value::from($msg)],
            $crate::params!($($key = $value),*),
        )
    };
}
