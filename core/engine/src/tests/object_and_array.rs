//! Object/array literals, prototype-chain operations, `Map`/`Set`, and
//! the `Object`/`Array` intrinsic method surfaces.

use indoc::indoc;

use super::{run_test_actions, TestAction};

#[test]
fn object_literal_field_access_and_update() {
    run_test_actions([
        TestAction::run("let m;"),
        TestAction::assert_eq(
            indoc! {r#"
                m = {};
                m['key'] = 22;
                m['key'];
            "#},
            22,
        ),
    ]);
}

#[test]
fn array_index_assignment_grows_length() {
    run_test_actions([
        TestAction::run("let m;"),
        TestAction::assert_eq(
            indoc! {r#"
                m = [1, 2, 3];
                m[1] = 5;
                m[1];
            "#},
            5,
        ),
        TestAction::assert_eq(
            indoc! {r#"
                m = [1, 2, 3];
                m[10] = 52;
                m.length;
            "#},
            11,
        ),
    ]);
}

#[test]
fn array_higher_order_methods() {
    run_test_actions([
        TestAction::assert_eq("[1, 2, 3].map(x => x * 2).reduce((a, b) => a + b, 0)", 12),
        TestAction::assert_eq("[1, 2, 3, 4].filter(x => x % 2 === 0).length", 2),
        TestAction::assert("[1, 2, 3].includes(2)"),
        TestAction::assert_eq(
            indoc! {r#"
                let a = [1, 2];
                a.push(3);
                a.length;
            "#},
            3,
        ),
        TestAction::assert_eq("[1, 2, 3].indexOf(2)", 1),
        TestAction::assert_eq("[3, 1, 2].slice(1).join(',')", "1,2"),
    ]);
}

#[test]
fn object_keys_values_entries() {
    run_test_actions([
        TestAction::assert_eq("Object.keys({ a: 1, b: 2 }).join(',')", "a,b"),
        TestAction::assert_eq("Object.values({ a: 1, b: 2 }).join(',')", "1,2"),
        TestAction::assert_eq(
            indoc! {r#"
                let pairs = Object.entries({ a: 1 });
                pairs[0][0] + ':' + pairs[0][1];
            "#},
            "a:1",
        ),
    ]);
}

#[test]
fn object_freeze_prevents_writes() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let o = Object.freeze({ a: 1 });
            o.a = 2;
            o.a;
        "#},
        1,
    )]);
}

#[test]
fn object_define_property_and_get_own_property_descriptor() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let o = {};
            Object.defineProperty(o, 'x', { value: 5, writable: false, enumerable: true, configurable: false });
            let d = Object.getOwnPropertyDescriptor(o, 'x');
            o.x + (d.writable ? 1 : 0);
        "#},
        5,
    )]);
}

#[test]
fn map_basic_operations() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let m = new Map();
            m.set("a", 1);
            m.set("b", 2);
            m.get("a") + m.get("b") + m.size;
        "#},
        5,
    )]);
}

#[test]
fn set_deduplicates_values() {
    run_test_actions([TestAction::assert(
        indoc! {r#"
            let s = new Set([1, 2, 2, 3]);
            s.size === 3 && s.has(2) && !s.has(4);
        "#},
    )]);
}

#[test]
fn map_delete_and_clear() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let m = new Map([["a", 1], ["b", 2]]);
            m.delete("a");
            let sizeAfterDelete = m.size;
            m.clear();
            sizeAfterDelete * 10 + m.size;
        "#},
        10,
    )]);
}
