//! The engine-level test harness: `TestAction`/`run_test_actions`,
//! grounded on `boa_engine`'s own test harness of the same names (used
//! throughout its `src/tests/*` modules) — scenarios are expressed as
//! literal source strings run against a single shared [`Context`], with
//! an expected completion value or thrown error, rather than unit-testing
//! individual evaluator methods.

use indoc::indoc;

use crate::{context::Context, error::JsNativeErrorKind, value::JsValue};

mod control_flow;
mod function;
mod object_and_array;
mod promise;

/// One step of a scenario: run a statement for effect, or run an
/// expression and check its completion value or thrown error.
pub enum TestAction {
    Run(String),
    Assert(String),
    AssertEq(String, JsValue),
    AssertNativeError(String, JsNativeErrorKind, String),
}

impl TestAction {
    pub fn run(src: impl Into<String>) -> Self {
        Self::Run(src.into())
    }

    pub fn assert(src: impl Into<String>) -> Self {
        Self::Assert(src.into())
    }

    pub fn assert_eq(src: impl Into<String>, expected: impl Into<JsValue>) -> Self {
        Self::AssertEq(src.into(), expected.into())
    }

    pub fn assert_native_error(src: impl Into<String>, kind: JsNativeErrorKind, message: impl Into<String>) -> Self {
        Self::AssertNativeError(src.into(), kind, message.into())
    }
}

/// Runs every action against one shared [`Context`], in order, so later
/// actions can observe bindings earlier ones created — mirrors
/// `boa_engine::run_test_actions` reusing a single context across an
/// array of `TestAction`s.
pub fn run_test_actions(actions: impl IntoIterator<Item = TestAction>) {
    let mut ctx = Context::new();
    for action in actions {
        match action {
            TestAction::Run(src) => {
                ctx.eval(&src).unwrap_or_else(|e| panic!("unexpected error running {src:?}: {e}"));
            }
            TestAction::Assert(src) => {
                let value = ctx.eval(&src).unwrap_or_else(|e| panic!("unexpected error evaluating {src:?}: {e}"));
                assert!(value.to_boolean(), "expected {src:?} to be truthy, got {value:?}");
            }
            TestAction::AssertEq(src, expected) => {
                let value = ctx.eval(&src).unwrap_or_else(|e| panic!("unexpected error evaluating {src:?}: {e}"));
                assert_eq!(value, expected, "evaluating {src:?}");
            }
            TestAction::AssertNativeError(src, kind, message) => {
                let err = match ctx.eval(&src) {
                    Ok(v) => panic!("expected {src:?} to throw, got {v:?}"),
                    Err(e) => e,
                };
                match err {
                    crate::error::JsError::Native(native) => {
                        assert_eq!(native.kind, kind, "evaluating {src:?}");
                        assert_eq!(native.message, message, "evaluating {src:?}");
                    }
                    other => panic!("expected a native error evaluating {src:?}, got {other}"),
                }
            }
        }
    }
}

#[test]
fn length_correct_value_on_string_literal() {
    run_test_actions([TestAction::assert_eq("'hello'.length", 5)]);
}

#[test]
fn empty_let_decl_undefined() {
    run_test_actions([TestAction::assert_eq("let a; a", JsValue::undefined())]);
}

#[test]
fn semicolon_expression_stop() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var a = 1;
            + 1;
            a
        "#},
        1,
    )]);
}

#[test]
fn identifier_on_global_object_undefined() {
    run_test_actions([TestAction::assert_native_error("bar;", JsNativeErrorKind::ReferenceError, "bar is not defined")]);
}

#[test]
fn object_field_set() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let m = {};
            m['key'] = 22;
            m['key']
        "#},
        22,
    )]);
}
