//! Human-readable rendering of the observed scenario for failure messages.

#![allow(missing_docs)]

use std::fmt::Write as _;

use super::ledger::{Outcome, ScenarioEntry, VerificationStatus};
use crate::core::config::ReportConfig;
use crate::value::Value;

/// Renders observed invocations for assertion failures and diagnostics.
pub trait ScenarioReport: Send + Sync {
    fn render(&self, entries: &[ScenarioEntry]) -> String;
}

/// Numbered overview plus an optional per-call detail section.
///
/// ```text
/// Observed scenario:
///
/// 1. greeter.greet("Bob") -> "hi"  at tests/greeter.rs:14:22
///
/// Detailed scenario:
///
/// 1. greeter.greet("Bob") -> "hi"
/// - Observed at tests/greeter.rs:14:22
/// - Behavior returns "hi" defined at tests/greeter.rs:11:5
/// ```
#[derive(Debug, Clone)]
pub struct DefaultScenarioReport {
    pub max_value_chars: usize,
    pub detailed: bool,
}

impl Default for DefaultScenarioReport {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

impl DefaultScenarioReport {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            max_value_chars: config.max_value_chars,
            detailed: config.detailed,
        }
    }

    fn call_line(&self, entry: &ScenarioEntry) -> String {
        let invocation = &entry.observed.invocation;
        let mut line = format!("{}.{}(", invocation.mock_name(), invocation.method().name());
        for (i, arg) in invocation.arguments_at_invocation().iter().enumerate() {
            if i > 0 {
                line.push_str(", ");
            }
            line.push_str(&format_value(arg, self.max_value_chars));
        }
        line.push(')');
        match &entry.observed.outcome {
            Outcome::Returned(Value::Unit) => {}
            Outcome::Returned(v) => {
                let _ = write!(line, " -> {}", format_value(v, self.max_value_chars));
            }
            Outcome::Raised(message) => {
                let _ = write!(line, " raised {message}");
            }
            Outcome::Pending => line.push_str(" (in progress)"),
        }
        line
    }
}

impl ScenarioReport for DefaultScenarioReport {
    fn render(&self, entries: &[ScenarioEntry]) -> String {
        let mut out = String::from("Observed scenario:\n\n");
        if entries.is_empty() {
            out.push_str("(no invocations)\n");
            return out;
        }
        for (i, entry) in entries.iter().enumerate() {
            let marker = match entry.status {
                VerificationStatus::Unverified => "",
                VerificationStatus::Verified => " [verified]",
                VerificationStatus::VerifiedInOrder => " [verified in order]",
            };
            let _ = writeln!(
                out,
                "{}. {}{marker}  at {}",
                i + 1,
                self.call_line(entry),
                entry.observed.invocation.invoked_at()
            );
        }

        if self.detailed {
            out.push_str("\nDetailed scenario:\n\n");
            for (i, entry) in entries.iter().enumerate() {
                let observed = &entry.observed;
                let _ = writeln!(out, "{}. {}", i + 1, self.call_line(entry));
                let _ = writeln!(out, "- Observed at {}", observed.invocation.invoked_at());
                match (&observed.behavior, observed.behavior_defined_at) {
                    (Some(label), Some(at)) => {
                        let _ = writeln!(out, "- Behavior {label} defined at {at}");
                    }
                    (Some(label), None) => {
                        let _ = writeln!(out, "- No behavior defined, {label}");
                    }
                    (None, _) => {
                        let _ = writeln!(out, "- No behavior defined");
                    }
                }
                out.push('\n');
            }
        }
        out
    }
}

/// Display form of `value`, cut to `max_chars` characters.
pub fn format_value(value: &Value, max_chars: usize) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() <= max_chars {
        return rendered;
    }
    let keep = max_chars.saturating_sub(3);
    let mut cut: String = rendered.chars().take(keep).collect();
    cut.push_str("...");
    cut
}
