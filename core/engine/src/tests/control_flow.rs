//! `if`/loops/`try`-`catch`-`finally`/`switch` scenarios.

use indoc::indoc;

use super::{run_test_actions, TestAction};
use crate::error::JsNativeErrorKind;
use crate::value::JsValue;

#[test]
fn for_loop_break_and_continue() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let sum = 0;
            for (let i = 0; i < 10; i = i + 1) {
                if (i === 5) continue;
                if (i === 8) break;
                sum = sum + i;
            }
            sum;
        "#},
        25,
    )]);
}

#[test]
fn while_and_do_while() {
    run_test_actions([
        TestAction::assert_eq(
            indoc! {r#"
                let n = 0;
                while (n < 5) { n = n + 1; }
                n;
            "#},
            5,
        ),
        TestAction::assert_eq(
            indoc! {r#"
                let n = 0;
                do { n = n + 1; } while (n < 3);
                n;
            "#},
            3,
        ),
    ]);
}

#[test]
fn switch_fallthrough_and_default() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function label(n) {
                let result = "";
                switch (n) {
                    case 1:
                    case 2:
                        result = "small";
                        break;
                    case 3:
                        result = "three";
                        break;
                    default:
                        result = "large";
                }
                return result;
            }
            label(2) + "," + label(3) + "," + label(9);
        "#},
        "small,three,large",
    )]);
}

#[test]
fn try_catch_finally_runs_in_order() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let log = [];
            try {
                log.push("try");
                throw new Error("boom");
            } catch (e) {
                log.push("catch:" + e.message);
            } finally {
                log.push("finally");
            }
            log.join(",");
        "#},
        "try,catch:boom,finally",
    )]);
}

#[test]
fn uncaught_throw_propagates_as_native_error_value() {
    run_test_actions([TestAction::assert_native_error(
        "throw new RangeError('out of range');",
        JsNativeErrorKind::RangeError,
        "out of range",
    )]);
}

#[test]
fn for_in_and_for_of() {
    run_test_actions([
        TestAction::assert_eq(
            indoc! {r#"
                let keys = [];
                for (let k in { a: 1, b: 2 }) { keys.push(k); }
                keys.join(",");
            "#},
            "a,b",
        ),
        TestAction::assert_eq(
            indoc! {r#"
                let total = 0;
                for (const v of [1, 2, 3]) { total = total + v; }
                total;
            "#},
            6,
        ),
    ]);
}

#[test]
fn labelled_break_exits_outer_loop() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let found = -1;
            outer: for (let i = 0; i < 3; i = i + 1) {
                for (let j = 0; j < 3; j = j + 1) {
                    if (i === 1 && j === 1) {
                        found = i * 10 + j;
                        break outer;
                    }
                }
            }
            found;
        "#},
        11,
    )]);
}

#[test]
fn conditional_operator_and_logical_short_circuit() {
    run_test_actions([
        TestAction::assert_eq("true ? 1 : 2", 1),
        TestAction::assert_eq("false ? 1 : 2", 2),
        TestAction::assert_eq(
            indoc! {r#"
                let calls = 0;
                function mark(v) { calls = calls + 1; return v; }
                let result = mark(false) && mark(true);
                calls;
            "#},
            1,
        ),
        TestAction::assert_eq("null ?? 'default'", "default"),
        TestAction::assert_eq("0 ?? 'default'", 0),
    ]);
}

#[test]
fn empty_block_result_is_undefined() {
    run_test_actions([TestAction::assert_eq("{}", JsValue::undefined())]);
}

#[test]
fn string_relational_comparison_orders_lexicographically() {
    run_test_actions([
        TestAction::assert("'a' < 'b'"),
        TestAction::assert("'apple' < 'banana'"),
        TestAction::assert("'banana' > 'apple'"),
        TestAction::assert("'abc' <= 'abc'"),
        TestAction::assert("!('b' < 'a')"),
    ]);
}

#[test]
fn annex_b_hoists_block_scoped_function_to_enclosing_scope() {
    run_test_actions([
        TestAction::assert_eq(
            indoc! {r#"
                if (true) {
                    function leaked() { return 1; }
                }
                typeof leaked;
            "#},
            "function",
        ),
        TestAction::assert_eq(
            indoc! {r#"
                function outer() {
                    if (true) {
                        function inner() { return "block"; }
                    }
                    return inner();
                }
                outer();
            "#},
            "block",
        ),
        TestAction::assert_eq(
            indoc! {r#"
                let shadowed = "outer";
                {
                    function shadowed() { return "inner"; }
                }
                typeof shadowed;
            "#},
            "string",
        ),
    ]);
}
