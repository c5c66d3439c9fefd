//! Top-level CLI definition and dispatch.

use std::collections::BTreeMap;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use colored::{Colorize, control};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use chainmock::core::config::Config;
use chainmock::logger::jsonl::{EventType, LogEntry, read_entries};

/// chainmock event-log and configuration tool.
#[derive(Debug, Parser)]
#[command(
    name = "cmk",
    author,
    version,
    about = "Inspect chainmock event logs and configuration",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Summarize a JSONL event log written by a mock context.
    Report(ReportArgs),
    /// View configuration state.
    Config(ConfigArgs),
}

#[derive(Debug, Clone, Args)]
struct ReportArgs {
    /// Event log to read.
    log: PathBuf,
    /// Only show events for this mock.
    #[arg(long, value_name = "NAME")]
    mock: Option<String>,
    /// Only show failed actions.
    #[arg(long)]
    failures_only: bool,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum ConfigCommand {
    /// Print the config file path in use.
    Path,
    /// Print the effective configuration (file plus environment) as TOML.
    Show,
    /// Validate the effective configuration.
    Validate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Json(_) => 3,
        }
    }
}

/// Dispatch parsed CLI arguments.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Report(args) => run_report(cli, args),
        Command::Config(args) => run_config(cli, args),
    }
}

// ──────────────────── report ────────────────────

/// Per-mock event counts.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
struct MockSummary {
    definitions: usize,
    invocations: usize,
    assertions_passed: usize,
    assertions_failed: usize,
    usage_errors: usize,
}

#[derive(Debug, Default, Serialize)]
struct ReportSummary {
    events: usize,
    mocks: BTreeMap<String, MockSummary>,
    failures: Vec<LogEntry>,
}

fn selected<'a>(entries: &'a [LogEntry], args: &'a ReportArgs) -> impl Iterator<Item = &'a LogEntry> {
    entries.iter().filter(move |entry| {
        let mock_ok = args
            .mock
            .as_deref()
            .is_none_or(|name| entry.mock.as_deref() == Some(name));
        mock_ok && (!args.failures_only || entry.ok == Some(false))
    })
}

fn summarize<'a>(entries: impl Iterator<Item = &'a LogEntry>) -> ReportSummary {
    let mut summary = ReportSummary::default();
    for entry in entries {
        summary.events += 1;
        let key = entry.mock.clone().unwrap_or_else(|| "-".to_string());
        let counts = summary.mocks.entry(key).or_default();
        match entry.event {
            EventType::BehaviorDefined => counts.definitions += 1,
            EventType::InvocationObserved => counts.invocations += 1,
            EventType::AssertionPassed => counts.assertions_passed += 1,
            EventType::AssertionFailed => counts.assertions_failed += 1,
            EventType::UsageError => counts.usage_errors += 1,
            EventType::ContextStart | EventType::ChainStart | EventType::ContextReset => {}
        }
        if entry.ok == Some(false) {
            summary.failures.push(entry.clone());
        }
    }
    summary
}

fn event_label(event: EventType) -> &'static str {
    match event {
        EventType::ContextStart => "context_start",
        EventType::ChainStart => "chain_start",
        EventType::BehaviorDefined => "behavior_defined",
        EventType::InvocationObserved => "invocation_observed",
        EventType::AssertionPassed => "assertion_passed",
        EventType::AssertionFailed => "assertion_failed",
        EventType::UsageError => "usage_error",
        EventType::ContextReset => "context_reset",
    }
}

fn human_line(entry: &LogEntry) -> String {
    let mut line = format!("{} {:<20}", entry.ts, event_label(entry.event));
    for part in [&entry.mock, &entry.call, &entry.behavior].into_iter().flatten() {
        line.push(' ');
        line.push_str(part);
    }
    if let Some(code) = &entry.error_code {
        line.push_str(&format!(" [{code}]"));
    }
    line
}

fn run_report(cli: &Cli, args: &ReportArgs) -> Result<(), CliError> {
    if !args.log.exists() {
        return Err(CliError::User(format!(
            "event log not found: {}",
            args.log.display()
        )));
    }
    let entries = read_entries(&args.log).map_err(|e| CliError::Runtime(e.to_string()))?;
    let summary = summarize(selected(&entries, args));

    match output_mode(cli) {
        OutputMode::Human => {
            let mut stdout = io::stdout().lock();
            for entry in selected(&entries, args) {
                let line = human_line(entry);
                let line = match entry.event {
                    EventType::AssertionFailed => line.red().bold(),
                    EventType::UsageError => line.yellow(),
                    EventType::AssertionPassed => line.green(),
                    _ => line.normal(),
                };
                writeln!(stdout, "{line}")?;
            }
            writeln!(stdout)?;
            writeln!(stdout, "{}", "Per-mock summary".bold())?;
            for (mock, counts) in &summary.mocks {
                writeln!(
                    stdout,
                    "  {mock:<24} defined {:>3}  calls {:>4}  passed {:>3}  failed {:>3}  usage errors {:>3}",
                    counts.definitions,
                    counts.invocations,
                    counts.assertions_passed,
                    counts.assertions_failed,
                    counts.usage_errors
                )?;
            }
            let failures = summary.failures.len();
            let tail = format!("{} event(s), {failures} failure(s)", summary.events);
            if failures > 0 {
                writeln!(stdout, "{}", tail.red())?;
            } else {
                writeln!(stdout, "{tail}")?;
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "report",
                "log": args.log.to_string_lossy(),
                "summary": serde_json::to_value(&summary)?,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

// ──────────────────── config ────────────────────

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match args.command {
        Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        None | Some(ConfigCommand::Show) => {
            let config = Config::load(cli.config.as_deref())
                .map_err(|e| CliError::Runtime(e.to_string()))?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = config
                        .to_toml()
                        .map_err(|e| CliError::Runtime(e.to_string()))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config show",
                        "config": serde_json::to_value(&config)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => {
            let config = Config::load(cli.config.as_deref())
                .map_err(|e| CliError::User(e.to_string()))?;
            let hash = config
                .stable_hash()
                .map_err(|e| CliError::Runtime(e.to_string()))?;

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", "Configuration is valid.".green());
                    println!("  Hash: {hash}");
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config validate",
                        "valid": true,
                        "hash": hash,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
    }
}

// ──────────────────── output ────────────────────

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("CMK_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainmock::core::errors::MockError;
    use chainmock::logger::jsonl::Severity;

    fn entry(event: EventType, mock: Option<&str>) -> LogEntry {
        let mut entry = LogEntry::new(event, Severity::Info);
        entry.mock = mock.map(str::to_string);
        entry
    }

    fn args(mock: Option<&str>, failures_only: bool) -> ReportArgs {
        ReportArgs {
            log: PathBuf::from("events.jsonl"),
            mock: mock.map(str::to_string),
            failures_only,
        }
    }

    fn sample() -> Vec<LogEntry> {
        vec![
            entry(EventType::ContextStart, None),
            entry(EventType::BehaviorDefined, Some("greeter")),
            entry(EventType::InvocationObserved, Some("greeter")),
            entry(EventType::InvocationObserved, Some("clock")),
            entry(EventType::AssertionFailed, Some("greeter"))
                .with_error(&MockError::InvalidTimes { times: 0 }),
        ]
    }

    #[test]
    fn summary_counts_per_mock() {
        let entries = sample();
        let summary = summarize(selected(&entries, &args(None, false)));
        assert_eq!(summary.events, 5);
        let greeter = &summary.mocks["greeter"];
        assert_eq!(greeter.definitions, 1);
        assert_eq!(greeter.invocations, 1);
        assert_eq!(greeter.assertions_failed, 1);
        assert_eq!(summary.mocks["clock"].invocations, 1);
        assert_eq!(summary.failures.len(), 1);
    }

    #[test]
    fn filters_by_mock_and_failures() {
        let entries = sample();
        assert_eq!(selected(&entries, &args(Some("clock"), false)).count(), 1);
        assert_eq!(selected(&entries, &args(None, true)).count(), 1);
        assert_eq!(selected(&entries, &args(Some("clock"), true)).count(), 0);
    }

    #[test]
    fn human_line_includes_error_code() {
        let failed = entry(EventType::UsageError, None)
            .with_error(&MockError::UnusedMatchers { count: 1 });
        let line = human_line(&failed);
        assert!(line.contains("usage_error"), "{line}");
        assert!(line.contains("[CMK-1006]"), "{line}");
    }

    #[test]
    fn output_mode_resolution_honors_precedence() {
        assert_eq!(resolve_output_mode(true, Some("human"), true), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, Some("json"), true), OutputMode::Json);
        assert_eq!(resolve_output_mode(false, Some("human"), false), OutputMode::Human);
        assert_eq!(resolve_output_mode(false, Some("auto"), true), OutputMode::Human);
        assert_eq!(resolve_output_mode(false, None, false), OutputMode::Json);
    }

    #[test]
    fn cli_parses_report_flags() {
        let cli = Cli::try_parse_from(["cmk", "report", "log.jsonl", "--mock", "greeter", "--failures-only"])
            .expect("parse");
        match cli.command {
            Command::Report(args) => {
                assert_eq!(args.mock.as_deref(), Some("greeter"));
                assert!(args.failures_only);
            }
            Command::Config(_) => panic!("expected report"),
        }
    }
}
