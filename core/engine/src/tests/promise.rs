//! `Promise`/`async`-`await`/`AbortController` scenarios, exercising
//! `Context::run_jobs` draining the microtask queue after `eval`.

use indoc::indoc;

use super::{run_test_actions, TestAction};

#[test]
fn then_runs_after_top_level_script_before_eval_returns() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let seen = 0;
            Promise.resolve(41).then(v => { seen = v + 1; });
            seen;
        "#},
        42,
    )]);
}

#[test]
fn catch_handles_rejection() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let message = "";
            Promise.reject(new Error("nope")).catch(e => { message = e.message; });
            message;
        "#},
        "nope",
    )]);
}

#[test]
fn then_chains_transform_the_value() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let result = 0;
            Promise.resolve(1)
                .then(v => v + 1)
                .then(v => v * 10)
                .then(v => { result = v; });
            result;
        "#},
        20,
    )]);
}

#[test]
fn promise_all_aggregates_in_order() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let total = 0;
            Promise.all([Promise.resolve(1), Promise.resolve(2), Promise.resolve(3)]).then(values => {
                total = values[0] + values[1] + values[2];
            });
            total;
        "#},
        6,
    )]);
}

#[test]
fn promise_race_takes_the_first_settlement() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let winner = 0;
            Promise.race([Promise.resolve(1), Promise.resolve(2)]).then(v => { winner = v; });
            winner;
        "#},
        1,
    )]);
}

#[test]
fn finally_runs_regardless_of_outcome() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let ran = 0;
            Promise.reject(1).catch(() => {}).finally(() => { ran = ran + 1; });
            Promise.resolve(1).finally(() => { ran = ran + 1; });
            ran;
        "#},
        2,
    )]);
}

#[test]
fn async_function_await_resolves_via_cps_transform() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let result = 0;
            async function addOne(n) {
                let v = await Promise.resolve(n);
                return v + 1;
            }
            addOne(9).then(v => { result = v; });
            result;
        "#},
        10,
    )]);
}

#[test]
fn promise_all_settled_reports_a_status_record_per_input() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let summary = "";
            Promise.allSettled([Promise.resolve(1), Promise.reject("boom")]).then(results => {
                summary = results[0].status + ":" + results[0].value + ","
                    + results[1].status + ":" + results[1].reason;
            });
            summary;
        "#},
        "fulfilled:1,rejected:boom",
    )]);
}

#[test]
fn promise_any_resolves_with_the_first_fulfillment() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let winner = 0;
            Promise.any([Promise.reject("nope"), Promise.resolve(7)]).then(v => { winner = v; });
            winner;
        "#},
        7,
    )]);
}

#[test]
fn promise_any_rejects_with_aggregate_error_when_all_reject() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let summary = "";
            Promise.any([Promise.reject("a"), Promise.reject("b")]).catch(e => {
                summary = e.name + ":" + e.errors.length + ":" + e.errors[0] + "," + e.errors[1];
            });
            summary;
        "#},
        "AggregateError:2:a,b",
    )]);
}

#[test]
fn abort_controller_rejects_signal_listeners() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            let aborted = false;
            let controller = new AbortController();
            controller.signal.__promise__.catch(() => { aborted = true; });
            controller.abort();
            aborted;
        "#},
        true,
    )]);
}
