//! Function declarations, closures, arrow functions, classes, and
//! destructuring/spread parameter forms.

use indoc::indoc;

use super::{run_test_actions, TestAction};

#[test]
fn closures_capture_by_reference() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function makeCounter() {
                let count = 0;
                return function () {
                    count = count + 1;
                    return count;
                };
            }
            let next = makeCounter();
            next(); next(); next();
        "#},
        3,
    )]);
}

#[test]
fn arrow_functions_inherit_this() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function Counter() {
                this.count = 0;
                this.increment = () => { this.count = this.count + 1; };
            }
            let c = new Counter();
            c.increment();
            c.increment();
            c.count;
        "#},
        2,
    )]);
}

#[test]
fn function_decl_hoisting() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let a = hello();
            function hello() { return 5; }
            a;
        "#},
        5,
    )]);
}

#[test]
fn rest_and_spread_parameters() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function sum(...nums) {
                return nums.reduce((a, b) => a + b, 0);
            }
            let parts = [1, 2, 3];
            sum(...parts, 4);
        "#},
        10,
    )]);
}

#[test]
fn default_parameters() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            function greet(name, greeting = "hello") {
                return greeting + " " + name;
            }
            greet("world");
        "#},
        "hello world",
    )]);
}

#[test]
fn destructuring_in_bindings_and_params() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let { a, b: renamed } = { a: 1, b: 2 };
            let [first, , third] = [10, 20, 30];
            function area({ width, height }) { return width * height; }
            a + renamed + first + third + area({ width: 3, height: 4 });
        "#},
        53,
    )]);
}

#[test]
fn classes_fields_and_inheritance() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            class Animal {
                constructor(name) { this.name = name; }
                speak() { return this.name.length; }
            }
            class Dog extends Animal {
                constructor(name) { super(name); }
                speak() { return super.speak() + 1; }
            }
            new Dog("Rex").speak();
        "#},
        4,
    )]);
}

#[test]
fn static_and_private_class_members() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            class Counter {
                static count = 0;
                #secret = 42;
                reveal() { return this.#secret; }
                static next() { Counter.count = Counter.count + 1; return Counter.count; }
            }
            Counter.next();
            Counter.next();
            new Counter().reveal() + Counter.count;
        "#},
        44,
    )]);
}

#[test]
fn calling_a_non_function_throws_type_error() {
    run_test_actions([TestAction::assert_native_error(
        "let x = 1; x();",
        crate::error::JsNativeErrorKind::TypeError,
        "1 is not a function",
    )]);
}
