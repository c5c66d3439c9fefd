#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chainmock::core::config::Config;
use chainmock::prelude::*;

// ──────────────────── interfaces ────────────────────

/// `greet(String) -> String`, `wave() -> void`.
pub fn greeter() -> Arc<Interface> {
    Interface::builder("Greeter")
        .method(
            MethodSignature::new("greet")
                .param(ValueType::Str)
                .returns(ValueType::Str),
        )
        .method(MethodSignature::new("wave"))
        .build()
}

/// A self-referencing interface for chain tests.
pub fn test_interface() -> Arc<Interface> {
    Interface::builder("TestInterface")
        .method(
            MethodSignature::new("get_test_class").returns(ValueType::interface("TestInterface")),
        )
        .method(MethodSignature::new("get_value").returns(ValueType::Int))
        .method(
            MethodSignature::new("lookup")
                .param(ValueType::Str)
                .returns(ValueType::interface("TestInterface")),
        )
        .method(
            MethodSignature::new("store")
                .param(ValueType::list(ValueType::Str))
                .param(ValueType::Int),
        )
        .method(MethodSignature::new("names").returns(ValueType::list(ValueType::Str)))
        .method(MethodSignature::new("tags").returns(ValueType::set(ValueType::Str)))
        .method(MethodSignature::new("ids").returns(ValueType::array(ValueType::Int)))
        .method(MethodSignature::new("owner").returns(ValueType::object("User")))
        .method(
            MethodSignature::new("load")
                .param(ValueType::Str)
                .returns(ValueType::Str)
                .raises("IoError"),
        )
        .build()
}

/// `add(int, int) -> int`, `describe(int) -> String`.
pub fn calculator() -> Arc<Interface> {
    Interface::builder("Calculator")
        .method(
            MethodSignature::new("add")
                .param(ValueType::Int)
                .param(ValueType::Int)
                .returns(ValueType::Int),
        )
        .method(
            MethodSignature::new("describe")
                .param(ValueType::Int)
                .returns(ValueType::Str),
        )
        .build()
}

/// The real calculator a partial mock delegates to.
pub fn real_calculator(invocation: &Invocation) -> Result<Value> {
    let int = |i: usize| invocation.argument(i).and_then(Value::as_int).unwrap_or(0);
    match invocation.method().name() {
        "add" => Ok(Value::Int(int(0) + int(1))),
        "describe" => Ok(Value::from(format!("number {}", int(0)))),
        other => Err(MockError::application(std::io::Error::other(format!(
            "no original for {other}"
        )))),
    }
}

/// Context with logging sent to `dir/events.jsonl`.
pub fn logging_context(dir: &Path) -> (MockContext, PathBuf) {
    let path = dir.join("events.jsonl");
    let mut config = Config::default();
    config.logging.enabled = true;
    config.logging.path = path.clone();
    (MockContext::with_config(config), path)
}

// ──────────────────── CLI ────────────────────

pub struct CmdResult {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub log_path: PathBuf,
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn resolve_bin_path() -> PathBuf {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_cmk") {
        return PathBuf::from(path);
    }

    let exe_name = if cfg!(windows) { "cmk.exe" } else { "cmk" };
    let fallback = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .and_then(|deps| deps.parent().map(PathBuf::from))
        .map(|debug_dir| debug_dir.join(exe_name));

    match fallback {
        Some(path) if path.exists() => path,
        _ => panic!("unable to resolve cmk binary path for integration test"),
    }
}

pub fn run_cli_case(case_name: &str, args: &[&str]) -> CmdResult {
    run_cli_case_with_env(case_name, args, &[])
}

pub fn run_cli_case_with_env(case_name: &str, args: &[&str], envs: &[(&str, &str)]) -> CmdResult {
    let root = std::env::temp_dir().join("cmk-test-logs");
    fs::create_dir_all(&root).expect("create temp test log dir");

    let log_path = root.join(format!("{}-{}.log", sanitize(case_name), now_millis()));
    let output = Command::new(resolve_bin_path())
        .args(args)
        .env("RUST_BACKTRACE", "1")
        .env_remove("CMK_OUTPUT_FORMAT")
        .envs(envs.iter().copied())
        .output()
        .expect("execute cmk command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let log_content = format!(
        "case={case_name}\nargs={args:?}\nstatus={:?}\n\n[stdout]\n{stdout}\n[stderr]\n{stderr}\n",
        output.status.code()
    );
    fs::write(&log_path, log_content).expect("write test case log");

    CmdResult {
        status: output.status,
        stdout,
        stderr,
        log_path,
    }
}
