//! End-to-end tests driving whole scripts through [`jsrt_engine::Context::eval`],
//! grounded on the teacher's `boa_engine::tests` style of asserting against a
//! freshly evaluated script result rather than unit-testing individual
//! evaluator methods.

use jsrt_engine::{Context, JsValue};

fn eval_number(src: &str) -> f64 {
    let mut ctx = Context::new();
    match ctx.eval(src) {
        Ok(v) => v.as_number().unwrap_or_else(|| panic!("expected number, got {v:?}")),
        Err(e) => panic!("eval error: {e}"),
    }
}

fn eval_string(src: &str) -> String {
    let mut ctx = Context::new();
    match ctx.eval(src) {
        Ok(v) => v.to_display_string(),
        Err(e) => panic!("eval error: {e}"),
    }
}

fn eval_bool(src: &str) -> bool {
    let mut ctx = Context::new();
    match ctx.eval(src) {
        Ok(v) => v.to_boolean(),
        Err(e) => panic!("eval error: {e}"),
    }
}

#[test]
fn arithmetic_and_operator_precedence() {
    assert_eq!(eval_number("1 + 2 * 3"), 7.0);
    assert_eq!(eval_number("(1 + 2) * 3"), 9.0);
    assert_eq!(eval_number("10 % 3"), 1.0);
    assert_eq!(eval_number("2 ** 10"), 1024.0);
}

#[test]
fn var_let_const_hoisting_and_shadowing() {
    assert_eq!(eval_number("x = 5; var x; x"), 5.0);
    assert_eq!(
        eval_number(
            r#"
            let a = 1;
            {
                let a = 2;
                a;
            }
            "#
        ),
        2.0
    );
    assert_eq!(
        eval_number(
            r#"
            const a = 10;
            let b = a * 2;
            b;
            "#
        ),
        20.0
    );
}

#[test]
fn functions_closures_and_arrows() {
    assert_eq!(
        eval_number(
            r#"
            function makeCounter() {
                let count = 0;
                return function () {
                    count = count + 1;
                    return count;
                };
            }
            let next = makeCounter();
            next();
            next();
            next();
            "#
        ),
        3.0
    );
    assert_eq!(eval_number("const square = x => x * x; square(6)"), 36.0);
}

#[test]
fn object_and_array_literals() {
    assert_eq!(
        eval_number(
            r#"
            let point = { x: 3, y: 4 };
            point.x * point.x + point.y * point.y;
            "#
        ),
        25.0
    );
    assert_eq!(eval_number("let a = [1, 2, 3]; a[1] = 5; a[1]"), 5.0);
    assert_eq!(eval_number("let a = [1, 2, 3]; a[10] = 1; a.length"), 11.0);
}

#[test]
fn array_methods() {
    assert_eq!(eval_number("[1, 2, 3].map(x => x * 2).reduce((a, b) => a + b, 0)"), 12.0);
    assert_eq!(eval_number("[1, 2, 3, 4].filter(x => x % 2 === 0).length"), 2.0);
    assert!(eval_bool("[1, 2, 3].includes(2)"));
    assert_eq!(eval_number("let a = [1, 2]; a.push(3); a.length"), 3.0);
}

#[test]
fn classes_and_inheritance() {
    assert_eq!(
        eval_number(
            r#"
            class Animal {
                constructor(name) {
                    this.name = name;
                }
                speak() {
                    return this.name.length;
                }
            }
            class Dog extends Animal {
                constructor(name) {
                    super(name);
                }
                speak() {
                    return super.speak() + 1;
                }
            }
            new Dog("Rex").speak();
            "#
        ),
        4.0
    );
}

#[test]
fn try_catch_finally_and_throw() {
    assert_eq!(
        eval_number(
            r#"
            let result = 0;
            try {
                throw new TypeError("bad");
            } catch (e) {
                result = e.message.length;
            } finally {
                result = result + 1;
            }
            result;
            "#
        ),
        4.0
    );
}

#[test]
fn template_literals() {
    assert_eq!(eval_string("let a = 10; `value: ${a + 5}`"), "value: 15");
}

#[test]
fn map_and_set_basics() {
    assert_eq!(
        eval_number(
            r#"
            let m = new Map();
            m.set("a", 1);
            m.set("b", 2);
            m.get("a") + m.get("b") + m.size;
            "#
        ),
        5.0
    );
    assert!(eval_bool(
        r#"
        let s = new Set([1, 2, 2, 3]);
        s.size === 3 && s.has(2);
        "#
    ));
}

#[test]
fn promise_then_chain_settles_before_eval_returns() {
    assert_eq!(
        eval_number(
            r#"
            let seen = 0;
            Promise.resolve(41).then(v => {
                seen = v + 1;
            });
            seen;
            "#
        ),
        42.0
    );
}

#[test]
fn promise_all_aggregates_results() {
    assert_eq!(
        eval_number(
            r#"
            let total = 0;
            Promise.all([Promise.resolve(1), Promise.resolve(2), Promise.resolve(3)]).then(values => {
                total = values[0] + values[1] + values[2];
            });
            total;
            "#
        ),
        6.0
    );
}

#[test]
fn async_function_resolves_via_cps_transform() {
    assert_eq!(
        eval_number(
            r#"
            let result = 0;
            async function addOne(n) {
                let v = await Promise.resolve(n);
                return v + 1;
            }
            addOne(9).then(v => {
                result = v;
            });
            result;
            "#
        ),
        10.0
    );
}

#[test]
fn reference_error_on_undeclared_identifier() {
    let mut ctx = Context::new();
    let err = ctx.eval("undeclaredVariable").unwrap_err();
    assert!(err.to_string().contains("not defined"), "unexpected error: {err}");
}

#[test]
fn type_error_calling_non_function() {
    let mut ctx = Context::new();
    let err = ctx.eval("let x = 1; x();").unwrap_err();
    assert!(err.to_string().contains("not a function"), "unexpected error: {err}");
}

#[test]
fn undefined_and_null_are_distinct() {
    let mut ctx = Context::new();
    assert!(matches!(ctx.eval("undefined").unwrap(), JsValue::Undefined));
    assert!(matches!(ctx.eval("null").unwrap(), JsValue::Null));
    assert!(eval_bool("undefined == null"));
    assert!(!eval_bool("undefined === null"));
}

#[test]
fn for_loops_and_loop_control() {
    assert_eq!(
        eval_number(
            r#"
            let sum = 0;
            for (let i = 0; i < 10; i = i + 1) {
                if (i === 5) continue;
                if (i === 8) break;
                sum = sum + i;
            }
            sum;
            "#
        ),
        25.0
    );
}

#[test]
fn spread_and_rest_parameters() {
    assert_eq!(
        eval_number(
            r#"
            function sum(...nums) {
                return nums.reduce((a, b) => a + b, 0);
            }
            let parts = [1, 2, 3];
            sum(...parts, 4);
            "#
        ),
        10.0
    );
}

#[test]
fn destructuring_assignment() {
    assert_eq!(
        eval_number(
            r#"
            let { a, b: renamed } = { a: 1, b: 2 };
            let [first, , third] = [10, 20, 30];
            a + renamed + first + third;
            "#
        ),
        41.0
    );
}
