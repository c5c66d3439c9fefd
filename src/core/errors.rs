//! CMK-prefixed error types with structured error codes.
//!
//! Callers see three families: usage errors (a malformed chain or an
//! incompatible definition), assertion failures (an expectation that was not
//! met), and application errors produced by a configured behavior. Internal and
//! configuration failures round out the enum.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, MockError>;

/// Error family, used by test harnesses to tell "mock misused" apart from
/// "expectation not met".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Usage,
    Assertion,
    Application,
    Internal,
    Config,
}

/// Which verification produced an [`AssertionFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssertionKind {
    Invoked,
    InvokedTimes,
    InvokedInSequence,
    OutOfOrder,
    NotInvoked,
    NoMoreInvocations,
}

impl AssertionKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Invoked => "CMK-2001",
            Self::InvokedTimes => "CMK-2002",
            Self::InvokedInSequence => "CMK-2003",
            Self::OutOfOrder => "CMK-2004",
            Self::NotInvoked => "CMK-2005",
            Self::NoMoreInvocations => "CMK-2006",
        }
    }
}

/// A failed verification, rendered at the assertion call site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AssertionFailure {
    pub kind: AssertionKind,
    /// Description of the asserted pattern (or `*` for scenario-wide checks).
    pub expected: String,
    /// `file:line:col` of the assertion entry point.
    pub asserted_at: String,
    /// Rendered scenario at the moment of failure.
    pub scenario: String,
    /// Full human-readable message, scenario included.
    pub message: String,
}

/// An error a mock behavior raises on behalf of the mocked type.
///
/// `checked` errors must be declared by the method they are raised from;
/// unchecked ones may be raised from anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct RaisedError {
    pub kind: String,
    pub message: String,
    pub checked: bool,
}

impl RaisedError {
    /// A checked error of `kind`.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            checked: true,
        }
    }

    /// An unchecked error of `kind`; never validated against declarations.
    pub fn unchecked(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            checked: false,
        }
    }

    /// A checked error with no message, the equivalent of raising by type.
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self::new(kind, "")
    }
}

/// Top-level error type for chainmock.
#[derive(Debug, Error)]
pub enum MockError {
    // ──────────────────── usage ────────────────────
    #[error(
        "[CMK-1001] invalid syntax: {mock}.{entry}() at {defined_at} must be followed by a method invocation on the returned proxy, e.g. {mock}.{entry}()?.invoke(\"my_method\", ..)"
    )]
    DanglingChain {
        mock: String,
        entry: &'static str,
        defined_at: String,
    },

    #[error(
        "[CMK-1002] unexpected matching proxy invocation {mock}.{method}(): matching proxies may only be called once, directly after a behavior or assert entry point"
    )]
    UnexpectedMatchingCall { mock: String, method: String },

    #[error(
        "[CMK-1003] unable to register argument matcher {matcher}: argument matchers can only be used when defining behavior for a mock (e.g. returns) or when asserting on a mock"
    )]
    MatcherOutsideChain { matcher: String },

    #[error(
        "[CMK-1004] {method}: {registered} argument matcher(s) registered but {consumed} placeholder(s) found in the call"
    )]
    MatcherCount {
        method: String,
        registered: usize,
        consumed: usize,
    },

    #[error(
        "[CMK-1005] {method}: argument {position} carries matcher #{found} but matcher #{expected} was next; matchers must be created left to right in argument order"
    )]
    MatcherOrder {
        method: String,
        position: usize,
        expected: usize,
        found: usize,
    },

    #[error("[CMK-1006] {count} argument matcher(s) were created but never used in a call")]
    UnusedMatchers { count: usize },

    #[error(
        "[CMK-1007] cannot create a placeholder for {matcher} on primitive type {value_type}; use eq(value) or a literal instead"
    )]
    PrimitivePlaceholder { matcher: String, value_type: String },

    #[error("[CMK-1008] {method} expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        method: String,
        expected: usize,
        actual: usize,
    },

    #[error("[CMK-1009] {method}: argument {position} expects {expected}, got {actual}")]
    ArgumentType {
        method: String,
        position: usize,
        expected: String,
        actual: String,
    },

    #[error("[CMK-1010] interface {interface} has no method {method}")]
    UnknownMethod { interface: String, method: String },

    #[error(
        "[CMK-1011] trying to define mock behavior that returns a value for a void method {method}"
    )]
    ValueForVoidMethod { method: String },

    #[error(
        "[CMK-1012] trying to make {method} return {value}, which is not assignable to the return type {return_type}"
    )]
    IncompatibleReturnValue {
        method: String,
        return_type: String,
        value: String,
    },

    #[error(
        "[CMK-1013] trying to make {method} raise {kind}, which it does not declare (declared: {declared})"
    )]
    UndeclaredError {
        method: String,
        kind: String,
        declared: String,
    },

    #[error("[CMK-1014] {method} does not have a list, set or array return type (found {return_type})")]
    NotACollectionReturnType { method: String, return_type: String },

    #[error("[CMK-1015] {method}: collection element {value} is not assignable to {expected}")]
    IncompatibleCollectionElement {
        method: String,
        expected: String,
        value: String,
    },

    #[error("[CMK-1016] invocation count must be at least 1, got {times}")]
    InvalidTimes { times: usize },

    #[error("[CMK-1017] the mock context that owns {mock} has been dropped")]
    ContextClosed { mock: String },

    #[error("[CMK-1018] {mock}.{method}: no original behavior to call; only partial mocks have one")]
    NoOriginalBehavior { mock: String, method: String },

    #[error("[CMK-1019] expected a proxy value, got {value}")]
    NotAProxy { value: String },

    #[error(
        "[CMK-1020] {method}: argument {position} is an argument matcher, but the call is not part of a behavior definition or assertion"
    )]
    PlaceholderInCall { method: String, position: usize },

    #[error("[CMK-1021] {method}: cannot create a dummy for return type {return_type}")]
    NoDummyForType { method: String, return_type: String },

    // ──────────────────── assertion ────────────────────
    #[error("[{}] {}", .0.kind.code(), .0)]
    Assertion(AssertionFailure),

    // ──────────────────── application ────────────────────
    #[error("[CMK-3001] {0}")]
    Raised(RaisedError),

    #[error("[CMK-3002] {0}")]
    Application(Box<dyn std::error::Error + Send + Sync>),

    // ──────────────────── internal ────────────────────
    #[error("[CMK-4001] internal failure: {details}")]
    Internal { details: String },

    // ──────────────────── config ────────────────────
    #[error("[CMK-5001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[CMK-5002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[CMK-5003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[CMK-5101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[CMK-5102] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MockError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DanglingChain { .. } => "CMK-1001",
            Self::UnexpectedMatchingCall { .. } => "CMK-1002",
            Self::MatcherOutsideChain { .. } => "CMK-1003",
            Self::MatcherCount { .. } => "CMK-1004",
            Self::MatcherOrder { .. } => "CMK-1005",
            Self::UnusedMatchers { .. } => "CMK-1006",
            Self::PrimitivePlaceholder { .. } => "CMK-1007",
            Self::ArgumentCount { .. } => "CMK-1008",
            Self::ArgumentType { .. } => "CMK-1009",
            Self::UnknownMethod { .. } => "CMK-1010",
            Self::ValueForVoidMethod { .. } => "CMK-1011",
            Self::IncompatibleReturnValue { .. } => "CMK-1012",
            Self::UndeclaredError { .. } => "CMK-1013",
            Self::NotACollectionReturnType { .. } => "CMK-1014",
            Self::IncompatibleCollectionElement { .. } => "CMK-1015",
            Self::InvalidTimes { .. } => "CMK-1016",
            Self::ContextClosed { .. } => "CMK-1017",
            Self::NoOriginalBehavior { .. } => "CMK-1018",
            Self::NotAProxy { .. } => "CMK-1019",
            Self::PlaceholderInCall { .. } => "CMK-1020",
            Self::NoDummyForType { .. } => "CMK-1021",
            Self::Assertion(failure) => failure.kind.code(),
            Self::Raised(_) => "CMK-3001",
            Self::Application(_) => "CMK-3002",
            Self::Internal { .. } => "CMK-4001",
            Self::InvalidConfig { .. } => "CMK-5001",
            Self::MissingConfig { .. } => "CMK-5002",
            Self::ConfigParse { .. } => "CMK-5003",
            Self::Serialization { .. } => "CMK-5101",
            Self::Io { .. } => "CMK-5102",
        }
    }

    /// Error family.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Assertion(_) => ErrorKind::Assertion,
            Self::Raised(_) | Self::Application(_) => ErrorKind::Application,
            Self::Internal { .. } => ErrorKind::Internal,
            Self::InvalidConfig { .. }
            | Self::MissingConfig { .. }
            | Self::ConfigParse { .. }
            | Self::Serialization { .. }
            | Self::Io { .. } => ErrorKind::Config,
            _ => ErrorKind::Usage,
        }
    }

    #[must_use]
    pub const fn is_usage(&self) -> bool {
        matches!(self.kind(), ErrorKind::Usage)
    }

    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self.kind(), ErrorKind::Assertion)
    }

    /// The assertion failure, if this is one.
    #[must_use]
    pub const fn as_assertion(&self) -> Option<&AssertionFailure> {
        match self {
            Self::Assertion(failure) => Some(failure),
            _ => None,
        }
    }

    /// Wrap an arbitrary application error raised by a custom behavior.
    pub fn application(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Application(Box::new(error))
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn internal(details: impl Into<String>) -> Self {
        Self::Internal {
            details: details.into(),
        }
    }
}

impl From<RaisedError> for MockError {
    fn from(value: RaisedError) -> Self {
        Self::Raised(value)
    }
}

impl From<AssertionFailure> for MockError {
    fn from(value: AssertionFailure) -> Self {
        Self::Assertion(value)
    }
}

impl From<serde_json::Error> for MockError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for MockError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<toml::ser::Error> for MockError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Serialization {
            context: "toml",
            details: value.to_string(),
        }
    }
}
