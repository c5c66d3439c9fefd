//! `cmk` binary: event-log reports and configuration commands.

mod common;

use std::fs;

use chainmock::prelude::*;
use common::{run_cli_case, run_cli_case_with_env};

/// Write a small log: one definition, two calls, one passed and one failed
/// assertion, one usage error.
fn sample_log(dir: &std::path::Path) -> std::path::PathBuf {
    let (ctx, path) = common::logging_context(dir);
    let greeter = ctx.mock("greeter", &common::greeter());
    let calc = ctx.mock("calc", &common::calculator());

    greeter
        .returns("hi")
        .and_then(|p| p.invoke("greet", args!["Bob"]))
        .expect("define");
    greeter.get_mock().invoke("greet", args!["Bob"]).expect("call");
    calc.get_mock().invoke("add", args![1, 2]).expect("call");
    greeter
        .assert_invoked()
        .and_then(|p| p.invoke("greet", args!["Bob"]))
        .expect("passes");
    let _ = calc
        .assert_invoked()
        .and_then(|p| p.invoke("add", args![5, 5]));
    let _ = greeter.returns(3).and_then(|p| p.invoke("greet", args!["x"]));
    path
}

#[test]
fn help_lists_subcommands() {
    let result = run_cli_case("help", &["--help"]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(result.stdout.contains("report"), "{}", result.stdout);
    assert!(result.stdout.contains("config"), "{}", result.stdout);
}

#[test]
fn report_json_summarizes_per_mock() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = sample_log(dir.path());
    let log = log.to_string_lossy();

    let result = run_cli_case("report_json", &["report", &log]);
    assert!(result.status.success(), "log: {}", result.log_path.display());

    let payload: serde_json::Value =
        serde_json::from_str(result.stdout.trim()).expect("one JSON document");
    assert_eq!(payload["command"], "report");
    let mocks = &payload["summary"]["mocks"];
    assert_eq!(mocks["greeter"]["definitions"], 1);
    assert_eq!(mocks["greeter"]["invocations"], 1);
    assert_eq!(mocks["greeter"]["assertions_passed"], 1);
    assert_eq!(mocks["calc"]["invocations"], 1);
    let failures = payload["summary"]["failures"]
        .as_array()
        .expect("failures array");
    assert_eq!(failures.len(), 2, "assertion failure and usage error");
    assert!(
        failures
            .iter()
            .any(|f| f["error_code"] == "CMK-1012"),
        "{failures:?}"
    );
}

#[test]
fn report_human_filters_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = sample_log(dir.path());
    let log = log.to_string_lossy();

    let result = run_cli_case_with_env(
        "report_human_failures",
        &["report", &log, "--failures-only", "--no-color"],
        &[("CMK_OUTPUT_FORMAT", "human")],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(result.stdout.contains("assertion_failed"), "{}", result.stdout);
    assert!(result.stdout.contains("usage_error"), "{}", result.stdout);
    assert!(!result.stdout.contains("invocation_observed"), "{}", result.stdout);
    assert!(result.stdout.contains("Per-mock summary"), "{}", result.stdout);
    assert!(result.stdout.contains("2 event(s), 2 failure(s)"), "{}", result.stdout);
}

#[test]
fn report_filters_by_mock() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = sample_log(dir.path());
    let log = log.to_string_lossy();

    let result = run_cli_case("report_mock", &["report", &log, "--mock", "calc", "--json"]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let payload: serde_json::Value =
        serde_json::from_str(result.stdout.trim()).expect("json");
    let mocks = payload["summary"]["mocks"].as_object().expect("mocks");
    assert_eq!(mocks.keys().collect::<Vec<_>>(), ["calc"]);
}

#[test]
fn report_missing_log_is_user_error() {
    let result = run_cli_case("report_missing", &["report", "/nonexistent/cmk/events.jsonl"]);
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("event log not found"), "{}", result.stderr);
}

#[test]
fn report_corrupt_log_is_runtime_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = dir.path().join("broken.jsonl");
    fs::write(&log, "{\"not\": \"an event\"}\n").expect("write");

    let result = run_cli_case("report_corrupt", &["report", &log.to_string_lossy()]);
    assert_eq!(result.status.code(), Some(2));
    assert!(result.stderr.contains("CMK-5101"), "{}", result.stderr);
}

#[test]
fn config_show_prints_effective_toml() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("chainmock.toml");
    fs::write(&path, "[report]\nmax_value_chars = 90\n").expect("write");
    let path = path.to_string_lossy();

    let result = run_cli_case_with_env(
        "config_show",
        &["config", "show", "--config", &path],
        &[("CMK_OUTPUT_FORMAT", "human")],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(result.stdout.contains("max_value_chars = 90"), "{}", result.stdout);
    assert!(result.stdout.contains("[matching]"), "{}", result.stdout);

    let result = run_cli_case("config_show_json", &["config", "--config", &path]);
    let payload: serde_json::Value =
        serde_json::from_str(result.stdout.trim()).expect("json");
    assert_eq!(payload["config"]["report"]["max_value_chars"], 90);
}

#[test]
fn config_validate_rejects_bad_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("chainmock.toml");
    fs::write(&path, "[report]\nmax_value_chars = 2\n").expect("write");
    let path = path.to_string_lossy();

    let result = run_cli_case("config_validate_bad", &["config", "validate", "--config", &path]);
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("CMK-5001"), "{}", result.stderr);

    let result = run_cli_case("config_validate_missing", &[
        "config",
        "validate",
        "--config",
        "/nonexistent/chainmock.toml",
    ]);
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("CMK-5002"), "{}", result.stderr);
}

#[test]
fn config_path_reports_missing_file() {
    let result = run_cli_case("config_path", &[
        "config",
        "path",
        "--config",
        "/nonexistent/chainmock.toml",
        "--json",
    ]);
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let payload: serde_json::Value =
        serde_json::from_str(result.stdout.trim()).expect("json");
    assert_eq!(payload["exists"], false);
}
