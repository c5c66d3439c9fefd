//! Argument matchers: per-argument predicates ranked NO_MATCH / MATCH / SAME.
//!
//! A pattern's score is the sum of its matchers' ranks; any NO_MATCH excludes
//! the pattern. Matchers receive both the live argument and the snapshot taken
//! at call time and decide which one they compare against.

#![allow(missing_docs)]

pub mod capture;
pub mod factory;
pub mod impls;
pub mod pattern;

use std::fmt;

use crate::value::Value;

pub use capture::MatcherCapture;
pub use factory::{MatcherSink, Matchers};
pub use impls::{
    AnyMatcher, DefaultMatcher, EqMatcher, IsNullMatcher, LenEqMatcher, NotNullMatcher,
    RefEqMatcher, SameMatcher,
};
pub use pattern::InvocationPattern;

/// Three-valued match result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MatchRank {
    NoMatch,
    Match,
    /// Reference-identical or declared-exact.
    Same,
}

impl MatchRank {
    /// Contribution to a pattern score; `None` excludes the pattern.
    pub const fn score(self) -> Option<u32> {
        match self {
            Self::NoMatch => None,
            Self::Match => Some(1),
            Self::Same => Some(2),
        }
    }

    pub const fn is_match(self) -> bool {
        !matches!(self, Self::NoMatch)
    }
}

/// Predicate over a single argument.
///
/// Implementations run while the mock context is locked and must not call
/// back into mocks.
pub trait ArgumentMatcher: Send + Sync + fmt::Debug {
    /// `argument` is the live value; `argument_at_invocation` is its snapshot.
    fn matches(&self, argument: &Value, argument_at_invocation: &Value) -> MatchRank;

    /// Rendering used in patterns and failure messages, e.g. `any(String)`.
    fn describe(&self) -> String;
}
