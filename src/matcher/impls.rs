//! Built-in matchers.

#![allow(missing_docs)]

use super::{ArgumentMatcher, MatchRank};
use crate::core::config::DefaultMatching;
use crate::value::compare::{lenient_eq, strict_eq};
use crate::value::{CloneService, Value, ValueType};

/// Any non-null value assignable to the type.
#[derive(Debug, Clone)]
pub struct AnyMatcher {
    pub value_type: ValueType,
}

impl ArgumentMatcher for AnyMatcher {
    fn matches(&self, _argument: &Value, snapshot: &Value) -> MatchRank {
        if !snapshot.is_null() && self.value_type.accepts(snapshot) {
            MatchRank::Match
        } else {
            MatchRank::NoMatch
        }
    }

    fn describe(&self) -> String {
        format!("any({})", self.value_type)
    }
}

#[derive(Debug, Clone)]
pub struct NotNullMatcher {
    pub value_type: ValueType,
}

impl ArgumentMatcher for NotNullMatcher {
    fn matches(&self, _argument: &Value, snapshot: &Value) -> MatchRank {
        if snapshot.is_null() {
            MatchRank::NoMatch
        } else {
            MatchRank::Match
        }
    }

    fn describe(&self) -> String {
        format!("not_null({})", self.value_type)
    }
}

#[derive(Debug, Clone)]
pub struct IsNullMatcher {
    pub value_type: ValueType,
}

impl ArgumentMatcher for IsNullMatcher {
    fn matches(&self, _argument: &Value, snapshot: &Value) -> MatchRank {
        if snapshot.is_null() {
            MatchRank::Match
        } else {
            MatchRank::NoMatch
        }
    }

    fn describe(&self) -> String {
        format!("is_null({})", self.value_type)
    }
}

/// Strict equality against the live argument.
#[derive(Debug, Clone)]
pub struct EqMatcher {
    pub expected: Value,
}

impl ArgumentMatcher for EqMatcher {
    fn matches(&self, argument: &Value, _snapshot: &Value) -> MatchRank {
        if self.expected.identical(argument) {
            MatchRank::Same
        } else if strict_eq(&self.expected, argument) {
            MatchRank::Match
        } else {
            MatchRank::NoMatch
        }
    }

    fn describe(&self) -> String {
        format!("eq({})", self.expected)
    }
}

/// Identity with the live argument.
#[derive(Debug, Clone)]
pub struct SameMatcher {
    pub expected: Value,
}

impl ArgumentMatcher for SameMatcher {
    fn matches(&self, argument: &Value, _snapshot: &Value) -> MatchRank {
        if self.expected.identical(argument) {
            MatchRank::Same
        } else {
            MatchRank::NoMatch
        }
    }

    fn describe(&self) -> String {
        format!("same({})", self.expected)
    }
}

/// Strict equality of a definition-time copy against the snapshot.
#[derive(Debug, Clone)]
pub struct RefEqMatcher {
    expected: Value,
    expected_copy: Value,
}

impl RefEqMatcher {
    pub fn new(expected: Value, cloner: &dyn CloneService) -> Self {
        let expected_copy = cloner.deep_clone(&expected);
        Self {
            expected,
            expected_copy,
        }
    }
}

impl ArgumentMatcher for RefEqMatcher {
    fn matches(&self, argument: &Value, snapshot: &Value) -> MatchRank {
        if self.expected.identical(argument) {
            MatchRank::Same
        } else if strict_eq(&self.expected_copy, snapshot) {
            MatchRank::Match
        } else {
            MatchRank::NoMatch
        }
    }

    fn describe(&self) -> String {
        format!("ref_eq({})", self.expected_copy)
    }
}

/// Lenient equality of a definition-time copy against the snapshot.
#[derive(Debug, Clone)]
pub struct LenEqMatcher {
    expected: Value,
    expected_copy: Value,
}

impl LenEqMatcher {
    pub fn new(expected: Value, cloner: &dyn CloneService) -> Self {
        let expected_copy = cloner.deep_clone(&expected);
        Self {
            expected,
            expected_copy,
        }
    }
}

impl ArgumentMatcher for LenEqMatcher {
    fn matches(&self, argument: &Value, snapshot: &Value) -> MatchRank {
        if self.expected.identical(argument) {
            MatchRank::Same
        } else if lenient_eq(&self.expected_copy, snapshot) {
            MatchRank::Match
        } else {
            MatchRank::NoMatch
        }
    }

    fn describe(&self) -> String {
        format!("len_eq({})", self.expected_copy)
    }
}

/// Wraps a literal argument of a definition or assertion call.
///
/// SAME when the live argument is identical to the literal, otherwise MATCH if
/// the definition-time copy equals the snapshot under the configured flavor.
#[derive(Debug, Clone)]
pub struct DefaultMatcher {
    expected: Value,
    expected_copy: Value,
    flavor: DefaultMatching,
}

impl DefaultMatcher {
    pub fn new(expected: Value, flavor: DefaultMatching, cloner: &dyn CloneService) -> Self {
        let expected_copy = cloner.deep_clone(&expected);
        Self {
            expected,
            expected_copy,
            flavor,
        }
    }
}

impl ArgumentMatcher for DefaultMatcher {
    fn matches(&self, argument: &Value, snapshot: &Value) -> MatchRank {
        if self.expected.identical(argument) {
            return MatchRank::Same;
        }
        let equal = match self.flavor {
            DefaultMatching::Lenient => lenient_eq(&self.expected_copy, snapshot),
            DefaultMatching::Strict => strict_eq(&self.expected_copy, snapshot),
        };
        if equal {
            MatchRank::Match
        } else {
            MatchRank::NoMatch
        }
    }

    fn describe(&self) -> String {
        self.expected_copy.to_string()
    }
}
