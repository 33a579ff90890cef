// SPDX-License-Identifier: MIT OR Apache-2.0
//! `Family::new`: in-place augmentation of family members and conversion of
//! foreign errors.

use kwerror::{
    BuildError, CONTEXT_ARGS_KEY, CONTEXT_ERROR_KEY, Family, FormatError, KwError, NewError,
    Params, Value, kwerror, params,
};
use serde_json::json;
use std::error::Error;
use std::fmt;
use std::io;

const MSG: &str = "blort-blort";

// ── Helpers ─────────────────────────────────────────────────────────────

/// Stand-in for a library error type the caller does not own.
#[derive(Debug)]
struct ValueError(String);

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for ValueError {}

fn value_error_context() -> Params {
    let mut p = Params::new();
    p.insert(CONTEXT_ERROR_KEY.into(), Value::from("ValueError"));
    p.insert(CONTEXT_ARGS_KEY.into(), json!([MSG]));
    p
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

// ── Default options ─────────────────────────────────────────────────────

#[test]
fn member_is_updated_in_place() {
    init_tracing();
    let kw = Family::builder("KwDefault").build().unwrap();
    let err = kwerror!(&kw, MSG, a = 1, b = 2).unwrap();

    let out = kw.new(err, params!(c = 33, d = 44, a = -1)).unwrap();
    assert_eq!(
        out.params(),
        &params!(msg = MSG, a = -1, b = 2, c = 33, d = 44)
    );
}

#[test]
fn member_is_moved_not_copied() {
    let kw = Family::builder("KwDefault").build().unwrap();
    let err = kwerror!(&kw, MSG, a = 1).unwrap();
    let msg_ptr = err.msg_str().unwrap().as_ptr();

    let out = kw.new(err, params!(b = 2)).unwrap();
    assert_eq!(out.msg_str().unwrap().as_ptr(), msg_ptr);

    let out = Family::base().new(out, params!(c = 3)).unwrap();
    assert_eq!(out.msg_str().unwrap().as_ptr(), msg_ptr);
    assert_eq!(out.params(), &params!(msg = MSG, a = 1, b = 2, c = 3));
}

#[test]
fn member_keeps_its_family_and_positionals() {
    let kw = Family::builder("KwCopy")
        .set_msg(kwerror::SetMsg::Copy)
        .build()
        .unwrap();
    let err = kwerror!(&kw, MSG).unwrap();
    let out = Family::base().new(err, params!(k = 1)).unwrap();
    assert_eq!(out.family(), &kw);
    assert_eq!(out.positional(), &[json!(MSG)]);
    assert_eq!(out.args(), vec![json!(MSG), json!({"msg": MSG, "k": 1})]);
}

#[test]
fn augment_in_place_through_a_reference() {
    let kw = Family::builder("KwDefault").build().unwrap();
    let mut err = kwerror!(&kw, MSG).unwrap();
    let before: *const KwError = &err;
    let after: *const KwError = err.augment(params!(k = 1));
    assert!(std::ptr::eq(before, after));
    assert_eq!(err.get("k"), Some(&json!(1)));
}

#[test]
fn foreign_error_is_wrapped() {
    init_tracing();
    let kw = Family::builder("KwDefault").build().unwrap();
    let out = kw
        .new(ValueError(MSG.into()), params!(c = 33, d = 44))
        .unwrap();

    let mut expected = params!(c = 33, d = 44);
    expected.extend(value_error_context());
    assert_eq!(out.params(), &expected);
    assert_eq!(out.family(), &kw);
    assert!(out.msg().is_none());
}

#[test]
fn foreign_std_error() {
    let out = Family::base()
        .new(io::Error::new(io::ErrorKind::NotFound, "no such file"), params!())
        .unwrap();
    assert_eq!(out.get(CONTEXT_ERROR_KEY), Some(&json!("Error")));
    assert_eq!(out.get(CONTEXT_ARGS_KEY), Some(&json!(["no such file"])));
}

#[test]
fn user_keys_beat_context() {
    let out = Family::base()
        .new(
            ValueError(MSG.into()),
            params!(context_error = "mine", extra = true),
        )
        .unwrap();
    assert_eq!(out.get(CONTEXT_ERROR_KEY), Some(&json!("mine")));
    assert_eq!(out.get(CONTEXT_ARGS_KEY), Some(&json!([MSG])));
    assert_eq!(out.get("extra"), Some(&json!(true)));
}

#[test]
fn extra_params_run_through_construction() {
    let kw = Family::builder("Wrapped")
        .default_msg("wrapped {context_error}: {detail}")
        .format_msg(true)
        .build()
        .unwrap();
    let out = kw
        .new(ValueError(MSG.into()), params!(detail = "bad input"))
        .unwrap();
    assert_eq!(out.msg_str(), Some("wrapped ValueError: bad input"));
}

#[test]
fn construction_failure_is_reported() {
    let kw = Family::builder("Wrapped")
        .default_msg("needs {detail}")
        .format_msg(true)
        .build()
        .unwrap();
    let err = kw.new(ValueError(MSG.into()), params!()).unwrap_err();
    assert!(matches!(
        err,
        NewError::Build(BuildError::Format(FormatError::MissingKey { ref key, .. })) if key == "detail"
    ));
}

#[test]
fn repeated_update_is_idempotent() {
    let kw = Family::builder("KwDefault").build().unwrap();
    let once = kw
        .new(kwerror!(&kw, MSG, a = 1).unwrap(), params!(a = 2, b = 3))
        .unwrap();
    let snapshot = once.params().clone();
    let twice = kw.new(once, params!(a = 2, b = 3)).unwrap();
    assert_eq!(twice.params(), &snapshot);
}

// ── Hierarchy ───────────────────────────────────────────────────────────

#[test]
fn descendant_is_augmented_by_ancestor() {
    let parent = Family::builder("Parent").build().unwrap();
    let child = Family::builder("Child").extends(&parent).build().unwrap();
    let err = kwerror!(&child, MSG).unwrap();

    let out = parent.new(err, params!(k = 1)).unwrap();
    assert_eq!(out.family(), &child);
    assert_eq!(out.params(), &params!(msg = MSG, k = 1));

    let out = Family::base().new(out, params!(j = 2)).unwrap();
    assert_eq!(out.family(), &child);
}

#[test]
fn ancestor_is_foreign_to_descendant() {
    let parent = Family::builder("Parent").build().unwrap();
    let child = Family::builder("Child").extends(&parent).build().unwrap();
    let err = kwerror!(&parent, MSG, a = 1).unwrap();

    let out = child.new(err, params!(k = 1)).unwrap();
    assert_eq!(out.family(), &child);
    assert_eq!(out.get(CONTEXT_ERROR_KEY), Some(&json!("Parent")));
    assert_eq!(
        out.get(CONTEXT_ARGS_KEY),
        Some(&json!([{"msg": MSG, "a": 1}]))
    );
}

#[test]
fn sibling_families_convert() {
    let left = Family::builder("Left").build().unwrap();
    let right = Family::builder("Right").build().unwrap();
    let out = right.new(kwerror!(&left, "l").unwrap(), params!()).unwrap();
    assert_eq!(out.name(), "Right");
    assert_eq!(out.get(CONTEXT_ERROR_KEY), Some(&json!("Left")));
}

// ── Options ─────────────────────────────────────────────────────────────

#[test]
fn conversion_disabled_returns_source() {
    init_tracing();
    let kw = Family::builder("KwNoNewConvert")
        .new_convert(false)
        .build()
        .unwrap();
    let err = kw
        .new(ValueError(MSG.into()), params!(a = 1))
        .unwrap_err();
    let source = err.into_unconverted().expect("source handed back");
    assert_eq!(source.0, MSG);
}

#[test]
fn conversion_disabled_still_augments_members() {
    let kw = Family::builder("KwNoNewConvert")
        .new_convert(false)
        .build()
        .unwrap();
    let out = kw.new(kwerror!(&kw, MSG).unwrap(), params!(a = 1)).unwrap();
    assert_eq!(out.params(), &params!(msg = MSG, a = 1));
}

#[test]
fn setdefault_semantics() {
    let kw = Family::builder("KwNoNewUpdate")
        .new_update(false)
        .new_context(false)
        .build()
        .unwrap();
    let err = kwerror!(&kw, MSG, a = 1, b = 2).unwrap();
    let out = kw.new(err, params!(c = 33, d = 44, a = -1)).unwrap();
    assert_eq!(
        out.params(),
        &params!(msg = MSG, a = 1, b = 2, c = 33, d = 44)
    );

    let out = kw
        .new(ValueError(MSG.into()), params!(c = 33, d = 44))
        .unwrap();
    assert_eq!(out.params(), &params!(c = 33, d = 44));
}

#[test]
fn target_family_decides_merge_semantics() {
    let lenient = Family::builder("Lenient").new_update(false).build().unwrap();
    let strict = Family::builder("Strict").extends(&lenient).new_update(true).build().unwrap();
    let err = kwerror!(&strict, MSG, a = 1).unwrap();
    let out = lenient.new(err, params!(a = 2)).unwrap();
    assert_eq!(out.get("a"), Some(&json!(1)));
}

// ── Interop ─────────────────────────────────────────────────────────────

#[test]
fn anyhow_roundtrip() {
    let err = kwerror!(Family::base(), "boom", code = 5).unwrap();
    let display = err.to_string();
    let any: anyhow::Error = err.into();
    assert_eq!(any.to_string(), display);
    let back = any.downcast::<KwError>().expect("downcast");
    assert_eq!(back.get("code"), Some(&json!(5)));
    assert!(back.source().is_none());
}

#[test]
fn anyhow_context_keeps_root_cause() {
    let err = Family::base()
        .new(io::Error::other("upstream failed"), params!(step = "fetch"))
        .unwrap();
    let any = anyhow::Error::new(err).context("while syncing");
    assert_eq!(any.to_string(), "while syncing");
    let root = any.root_cause().downcast_ref::<KwError>().expect("root");
    assert_eq!(root.get(CONTEXT_ARGS_KEY), Some(&json!(["upstream failed"])));
    assert_eq!(root.get("step"), Some(&json!("fetch")));
}
