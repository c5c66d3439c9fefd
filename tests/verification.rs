//! Assertions against the observed scenario.

mod common;

use chainmock::core::config::Config;
use chainmock::logger::jsonl::{EventType, read_entries};
use chainmock::prelude::*;
use chainmock::scenario::VerificationStatus;

#[test]
fn each_call_verifies_once() -> Result<()> {
    let ctx = MockContext::new();
    let greeter = ctx.mock("greeter", &common::greeter());
    greeter.get_mock().invoke("greet", args!["Bob"])?;

    greeter.assert_invoked()?.invoke("greet", args!["Bob"])?;
    let err = greeter
        .assert_invoked()?
        .invoke("greet", args!["Bob"])
        .expect_err("already verified");
    assert_eq!(err.as_assertion().map(|f| f.kind), Some(AssertionKind::Invoked));
    assert!(err.is_assertion());
    Ok(())
}

#[test]
fn in_sequence_follows_call_order_across_mocks() -> Result<()> {
    let ctx = MockContext::new();
    let greeter = ctx.mock("greeter", &common::greeter());
    let calc = ctx.mock("calc", &common::calculator());

    greeter.get_mock().invoke("greet", args!["a"])?;
    calc.get_mock().invoke("add", args![1, 2])?;
    greeter.get_mock().invoke("wave", args![])?;

    greeter
        .assert_invoked_in_sequence()?
        .invoke("greet", args!["a"])?;
    calc.assert_invoked_in_sequence()?.invoke("add", args![1, 2])?;
    greeter.assert_invoked_in_sequence()?.invoke("wave", args![])?;

    assert!(ctx
        .observed()
        .iter()
        .all(|e| e.status == VerificationStatus::VerifiedInOrder));
    ctx.assert_no_more_invocations()?;
    Ok(())
}

#[test]
fn in_sequence_reports_out_of_order_calls() -> Result<()> {
    let ctx = MockContext::new();
    let greeter = ctx.mock("greeter", &common::greeter());
    let calc = ctx.mock("calc", &common::calculator());

    greeter.get_mock().invoke("greet", args!["a"])?;
    calc.get_mock().invoke("add", args![1, 2])?;

    calc.assert_invoked_in_sequence()?.invoke("add", args![1, 2])?;
    let err = greeter
        .assert_invoked_in_sequence()?
        .invoke("greet", args!["a"])
        .expect_err("greet happened first");
    let failure = err.as_assertion().expect("assertion failure");
    assert_eq!(failure.kind, AssertionKind::OutOfOrder);
    assert!(
        failure.message.starts_with(
            "Invocation of greeter.greet(\"a\") was expected to be performed after calc.add(1, 2) but actually occurred before it."
        ),
        "{}",
        failure.message
    );
    Ok(())
}

#[test]
fn no_more_invocations_ignores_configured_calls() -> Result<()> {
    let ctx = MockContext::new();
    let greeter = ctx.mock("greeter", &common::greeter());
    let calc = ctx.mock("calc", &common::calculator());

    calc.returns(10)?.invoke("add", args![1, 2])?;
    calc.get_mock().invoke("add", args![1, 2])?;
    greeter.get_mock().invoke("greet", args!["Bob"])?;

    calc.assert_no_more_invocations()?;
    let err = ctx
        .assert_no_more_invocations()
        .expect_err("greet is neither stubbed nor verified");
    let failure = err.as_assertion().expect("assertion failure");
    assert_eq!(failure.kind, AssertionKind::NoMoreInvocations);
    assert!(
        failure
            .message
            .starts_with("No more invocations expected, yet observed following calls:\n- greeter.greet(\"Bob\")"),
        "{}",
        failure.message
    );
    assert!(!failure.message.contains("- calc.add"), "{}", failure.message);

    let err = greeter
        .assert_no_more_invocations()
        .expect_err("per-mock check sees greet too");
    assert!(err.is_assertion());

    greeter.assert_invoked()?.invoke("greet", args!["Bob"])?;
    greeter.assert_no_more_invocations()?;
    ctx.assert_no_more_invocations()?;
    Ok(())
}

#[test]
fn not_invoked_and_exact_times() -> Result<()> {
    let ctx = MockContext::new();
    let greeter = ctx.mock("greeter", &common::greeter());
    let m = ctx.matchers();

    let real = greeter.get_mock();
    real.invoke("greet", args!["a"])?;
    real.invoke("greet", args!["b"])?;
    real.invoke("greet", args!["a"])?;

    greeter.assert_not_invoked()?.invoke("greet", args!["c"])?;
    let err = greeter
        .assert_not_invoked()?
        .invoke("greet", args!["b"])
        .expect_err("b was greeted");
    let failure = err.as_assertion().expect("assertion failure");
    assert_eq!(failure.kind, AssertionKind::NotInvoked);
    assert!(failure.message.contains("\nat tests/verification.rs"), "{}", failure.message);

    let err = greeter
        .assert_invoked_times(3)?
        .invoke("greet", args!["a"])
        .expect_err("only two");
    assert!(
        err.to_string()
            .contains("Expected 3 invocation(s) of greeter.greet(\"a\"), but 2 occurred."),
        "{err}"
    );
    greeter.assert_invoked_times(2)?.invoke("greet", args!["a"])?;
    greeter
        .assert_invoked_times(1)?
        .invoke("greet", args![m.any(ValueType::Str)?])?;
    ctx.assert_no_more_invocations()?;
    Ok(())
}

#[test]
fn assertion_continues_through_chained_mocks() -> Result<()> {
    let ctx = MockContext::new();
    let test = ctx.mock("test", &common::test_interface());

    test.returns(7)?
        .invoke("get_test_class", args![])?
        .into_proxy()?
        .invoke("get_value", args![])?;

    let real = test.get_mock();
    let inner = real.invoke("get_test_class", args![])?.into_proxy()?;
    assert_eq!(inner.invoke("get_value", args![])?, Value::Int(7));
    real.invoke("get_test_class", args![])?;

    test.assert_invoked()?
        .invoke("get_test_class", args![])?
        .into_proxy()?
        .invoke("get_value", args![])?;

    // The second get_test_class call is still unverified, but get_value
    // only ran once.
    let err = test
        .assert_invoked()?
        .invoke("get_test_class", args![])?
        .into_proxy()?
        .invoke("get_value", args![])
        .expect_err("get_value already verified");
    assert_eq!(
        err.as_assertion().map(|f| f.expected.as_str()),
        Some("test.get_test_class.get_value()")
    );
    Ok(())
}

#[test]
fn failure_message_carries_location_and_scenario() -> Result<()> {
    let ctx = MockContext::new();
    let greeter = ctx.mock("greeter", &common::greeter());

    greeter.returns("hi")?.invoke("greet", args!["Bob"])?;
    greeter.get_mock().invoke("greet", args!["Bob"])?;
    greeter.get_mock().invoke("wave", args![])?;

    let err = greeter
        .assert_invoked()?
        .invoke("greet", args!["Alice"])
        .expect_err("never greeted Alice");
    let failure = err.as_assertion().expect("assertion failure");
    assert!(failure.asserted_at.starts_with("tests/verification.rs:"));
    let msg = &failure.message;
    assert!(msg.contains("\nasserted at tests/verification.rs:"), "{msg}");
    assert!(msg.contains("Observed scenario:"), "{msg}");
    assert!(msg.contains("1. greeter.greet(\"Bob\") -> \"hi\"  at "), "{msg}");
    assert!(msg.contains("2. greeter.wave()  at "), "{msg}");
    assert!(msg.contains("Detailed scenario:"), "{msg}");
    assert!(msg.contains("- Behavior returns \"hi\" defined at tests/verification.rs:"), "{msg}");
    assert!(msg.contains("- No behavior defined\n"), "{msg}");
    assert_eq!(ctx.scenario_report(), failure.scenario);
    Ok(())
}

#[test]
fn report_detail_section_follows_config() -> Result<()> {
    let mut config = Config::default();
    config.report.detailed = false;
    config.report.max_value_chars = 8;
    let ctx = MockContext::with_config(config);
    let greeter = ctx.mock("greeter", &common::greeter());
    greeter.get_mock().invoke("greet", args!["a rather long name"])?;

    let report = ctx.scenario_report();
    assert!(!report.contains("Detailed scenario:"), "{report}");
    assert!(report.contains("..."), "{report}");
    Ok(())
}

#[test]
fn identical_argument_outranks_equal_one() -> Result<()> {
    let ctx = MockContext::new();
    let greeter = ctx.mock("greeter", &common::greeter());
    let (mine, _cell) = Value::shared("Bob");

    greeter.returns("same")?.invoke("greet", args![mine.clone()])?;
    greeter.returns("equal")?.invoke("greet", args!["Bob"])?;

    let real = greeter.get_mock();
    assert_eq!(real.invoke("greet", args![mine])?, Value::from("same"));
    let (other, _) = Value::shared("Bob");
    assert_eq!(
        real.invoke("greet", args![other])?,
        Value::from("equal"),
        "equal ranks tie; the later definition wins"
    );
    Ok(())
}

#[test]
fn literals_compare_with_the_argument_as_it_was() -> Result<()> {
    let ctx = MockContext::new();
    let greeter = ctx.mock("greeter", &common::greeter());
    let m = ctx.matchers();

    let (name, cell) = Value::shared("Bob");
    greeter.get_mock().invoke("greet", args![name])?;
    cell.set("Alice");

    // eq() sees the live value, a literal sees the snapshot.
    greeter
        .assert_not_invoked()?
        .invoke("greet", args![m.eq("Bob")?])?;
    greeter
        .assert_not_invoked()?
        .invoke("greet", args!["Alice"])?;
    greeter.assert_invoked()?.invoke("greet", args!["Bob"])?;
    Ok(())
}

#[test]
fn assertion_literals_are_strict_unless_configured() -> Result<()> {
    let strict = MockContext::new();
    let test = strict.mock("test", &common::test_interface());
    test.get_mock()
        .invoke("store", args![Value::list(["a", "b"]), 1])?;
    test.assert_not_invoked()?
        .invoke("store", args![Value::list(["b", "a"]), 1])?;

    let mut config = Config::default();
    config.matching.assertion_default = DefaultMatching::Lenient;
    let lenient = MockContext::with_config(config);
    let test = lenient.mock("test", &common::test_interface());
    test.get_mock()
        .invoke("store", args![Value::list(["a", "b"]), 1])?;
    test.assert_invoked()?
        .invoke("store", args![Value::list(["b", "a"]), 1])?;
    Ok(())
}

#[test]
fn behavior_literals_are_lenient_by_default() -> Result<()> {
    let registry = Interface::builder("Registry")
        .method(
            MethodSignature::new("save")
                .param(ValueType::object("User"))
                .returns(ValueType::Bool),
        )
        .build();
    let ctx = MockContext::new();
    let mock = ctx.mock("registry", &registry);
    let bob = |age: i64| ObjectValue::new("User").field("name", "bob").field("age", age);

    // age 0 is a default, so it is left out of the comparison.
    mock.returns(true)?.invoke("save", args![bob(0)])?;

    let real = mock.get_mock();
    assert_eq!(real.invoke("save", args![bob(41)])?, Value::Bool(true));
    let al = ObjectValue::new("User").field("name", "al");
    assert_eq!(real.invoke("save", args![al])?, Value::Bool(false));

    // Assertions compare strictly.
    mock.assert_not_invoked()?.invoke("save", args![bob(0)])?;
    mock.assert_invoked()?.invoke("save", args![bob(41)])?;
    Ok(())
}

#[test]
fn self_referencing_argument_is_recorded_and_verified() -> Result<()> {
    let ctx = MockContext::new();
    let store = ctx.mock(
        "store",
        &Interface::builder("Store")
            .method(
                MethodSignature::new("put")
                    .param(ValueType::list(ValueType::Any))
                    .returns(ValueType::Int),
            )
            .build(),
    );
    let (arg, cell) = Value::shared(Value::list(Vec::<Value>::new()));
    cell.set(Value::list([arg.clone()]));

    store.returns(7)?.invoke("put", args![arg.clone()])?;
    assert_eq!(store.get_mock().invoke("put", args![arg.clone()])?, Value::Int(7));
    store.assert_invoked()?.invoke("put", args![arg.clone()])?;

    let err = store
        .assert_invoked()?
        .invoke("put", args![Value::list([1])])
        .expect_err("never called with [1]");
    assert!(err.is_assertion());
    assert!(err.to_string().contains("store.put([<cycle>])"), "{err}");
    Ok(())
}

#[test]
fn reset_moves_logging_back_to_the_primary_path() -> Result<()> {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x").expect("write");
    let primary = blocker.join("events.jsonl");
    let fallback = dir.path().join("fallback.jsonl");

    let mut config = Config::default();
    config.logging.enabled = true;
    config.logging.path = primary.clone();
    config.logging.fallback_path = Some(fallback.clone());
    let ctx = MockContext::with_config(config);
    let greeter = ctx.mock("greeter", &common::greeter());
    greeter.get_mock().invoke("greet", args!["a"])?;
    assert!(
        read_entries(&fallback)?
            .iter()
            .any(|e| e.event == EventType::InvocationObserved)
    );

    std::fs::remove_file(&blocker).expect("remove");
    ctx.reset();
    greeter.get_mock().invoke("greet", args!["b"])?;
    drop(ctx);

    let events: Vec<EventType> = read_entries(&primary)?.into_iter().map(|e| e.event).collect();
    assert_eq!(events, [EventType::ContextReset, EventType::InvocationObserved]);
    Ok(())
}

#[test]
fn observed_calls_log_the_selected_definition() -> Result<()> {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, path) = common::logging_context(dir.path());
    let greeter = ctx.mock("greeter", &common::greeter());
    greeter.once_returns("hi")?.invoke("greet", args!["Bob"])?;

    let real = greeter.get_mock();
    real.invoke("greet", args!["Bob"])?;
    real.invoke("greet", args!["Bob"])?;
    drop(ctx);

    let observed: Vec<_> = read_entries(&path)?
        .into_iter()
        .filter(|e| e.event == EventType::InvocationObserved)
        .collect();
    assert_eq!(observed.len(), 2);
    assert_eq!(observed[0].pattern.as_deref(), Some("greeter.greet(\"Bob\")"));
    assert_eq!(observed[0].score, Some(2));
    assert_eq!(observed[0].one_time, Some(true));
    // The one-time definition is used up; the default value needs no pattern.
    assert_eq!(observed[1].pattern, None);
    assert_eq!(observed[1].score, None);
    Ok(())
}

#[test]
fn assertions_and_failures_are_logged() -> Result<()> {
    let dir = tempfile::tempdir().expect("tempdir");
    let (ctx, path) = common::logging_context(dir.path());
    let greeter = ctx.mock("greeter", &common::greeter());

    greeter.returns("hi")?.invoke("greet", args!["Bob"])?;
    greeter.get_mock().invoke("greet", args!["Bob"])?;
    greeter.assert_invoked()?.invoke("greet", args!["Bob"])?;
    let _ = greeter.assert_invoked()?.invoke("greet", args!["Bob"]);

    let events: Vec<EventType> = read_entries(&path)?.into_iter().map(|e| e.event).collect();
    assert_eq!(
        events,
        [
            EventType::ContextStart,
            EventType::ChainStart,
            EventType::BehaviorDefined,
            EventType::InvocationObserved,
            EventType::ChainStart,
            EventType::AssertionPassed,
            EventType::ChainStart,
            EventType::AssertionFailed,
        ]
    );
    Ok(())
}
