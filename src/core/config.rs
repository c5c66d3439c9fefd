//! Configuration system: TOML file + env var overrides + defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::{MockError, Result};

/// File looked up in the working directory when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "chainmock.toml";

/// Full chainmock configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub matching: MatchingConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

/// Flavor of the matcher wrapped around literal arguments.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DefaultMatching {
    /// Order-insensitive collections, default-valued object fields ignored.
    Lenient,
    /// Exact structural equality.
    Strict,
}

impl FromStr for DefaultMatching {
    type Err = MockError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(MockError::ConfigParse {
                context: "matching",
                details: format!("expected \"lenient\" or \"strict\", got {other:?}"),
            }),
        }
    }
}

/// Default matcher flavors per chain kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MatchingConfig {
    /// Used for literals in `returns`/`raises`/`performs` chains.
    pub behavior_default: DefaultMatching,
    /// Used for literals in `assert_*` chains.
    pub assertion_default: DefaultMatching,
}

/// Scenario report rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportConfig {
    /// Rendered values longer than this are truncated with `...`.
    pub max_value_chars: usize,
    /// Append the per-call detail section (observed at / defined at).
    pub detailed: bool,
}

/// JSONL event log of mock activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub fallback_path: Option<PathBuf>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            behavior_default: DefaultMatching::Lenient,
            assertion_default: DefaultMatching::Strict,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_value_chars: 60,
            detailed: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let dir = env::temp_dir().join("chainmock");
        Self {
            enabled: false,
            path: dir.join("events.jsonl"),
            fallback_path: None,
        }
    }
}

impl Config {
    /// Default configuration path (`chainmock.toml` in the working directory).
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| MockError::io(&path_buf, source))?;
            Self::from_toml(&raw)?
        } else if path.is_some() {
            return Err(MockError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a TOML document without touching the environment.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let parsed: Self = toml::from_str(raw)?;
        Ok(parsed)
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Deterministic hash of the effective config for the event log.
    ///
    /// FNV-1a over canonical JSON, stable across processes and toolchains.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        set_from(
            &mut lookup,
            "CHAINMOCK_MATCHING_BEHAVIOR_DEFAULT",
            &mut self.matching.behavior_default,
        )?;
        set_from(
            &mut lookup,
            "CHAINMOCK_MATCHING_ASSERTION_DEFAULT",
            &mut self.matching.assertion_default,
        )?;
        set_from(
            &mut lookup,
            "CHAINMOCK_REPORT_MAX_VALUE_CHARS",
            &mut self.report.max_value_chars,
        )?;
        set_from(&mut lookup, "CHAINMOCK_REPORT_DETAILED", &mut self.report.detailed)?;
        set_from(&mut lookup, "CHAINMOCK_LOG_ENABLED", &mut self.logging.enabled)?;

        if let Some(raw) = lookup("CHAINMOCK_LOG_PATH") {
            self.logging.path = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("CHAINMOCK_LOG_FALLBACK_PATH") {
            self.logging.fallback_path = Some(PathBuf::from(raw));
        }
        Ok(())
    }

    /// Check value ranges and cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.report.max_value_chars < 8 {
            return Err(MockError::InvalidConfig {
                details: format!(
                    "report.max_value_chars must be >= 8, got {}",
                    self.report.max_value_chars
                ),
            });
        }
        if self.logging.enabled && self.logging.path.as_os_str().is_empty() {
            return Err(MockError::InvalidConfig {
                details: "logging.path must be set when logging.enabled = true".to_string(),
            });
        }
        if self
            .logging
            .fallback_path
            .as_ref()
            .is_some_and(|fb| fb == &self.logging.path)
        {
            return Err(MockError::InvalidConfig {
                details: "logging.fallback_path must differ from logging.path".to_string(),
            });
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn set_from<F, T>(lookup: &mut F, name: &str, slot: &mut T) -> Result<()>
where
    F: FnMut(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(name) {
        *slot = raw.trim().parse::<T>().map_err(|error| MockError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })?;
    }
    Ok(())
}
