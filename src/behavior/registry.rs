//! Per-mock behavior registry with deterministic selection.
//!
//! Selection policy, applied to every still-usable definition:
//!
//! 1. The definition with the highest pattern score wins.
//! 2. On an exact tie a one-time definition beats an always definition.
//! 3. Among tied one-time definitions the first registered wins, so they are
//!    consumed in registration order.
//! 4. Among tied always definitions the last registered wins, so a later
//!    definition refines an earlier one.
//!
//! A selected one-time definition is marked used and never selected again.

#![allow(missing_docs)]

use std::sync::Arc;

use super::MockBehavior;
use crate::core::errors::Result;
use crate::matcher::InvocationPattern;
use crate::proxy::{CallSite, Invocation};

struct BehaviorDefiningInvocation {
    pattern: InvocationPattern,
    behavior: Arc<dyn MockBehavior>,
    used: bool,
}

/// The outcome of a successful selection; the pattern, score and list are
/// reported on the observed-invocation log event.
#[derive(Clone)]
pub struct SelectedBehavior {
    pub behavior: Arc<dyn MockBehavior>,
    pub defined_at: CallSite,
    pub pattern: String,
    pub one_time: bool,
    pub score: u32,
}

#[derive(Default)]
pub struct BehaviorRegistry {
    one_time: Vec<BehaviorDefiningInvocation>,
    always: Vec<BehaviorDefiningInvocation>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        pattern: InvocationPattern,
        behavior: Arc<dyn MockBehavior>,
        one_time: bool,
    ) {
        let entry = BehaviorDefiningInvocation {
            pattern,
            behavior,
            used: false,
        };
        if one_time {
            self.one_time.push(entry);
        } else {
            self.always.push(entry);
        }
    }

    /// Pick the behavior for `invocation`, consuming it if one-time.
    pub fn select(&mut self, invocation: &Invocation) -> Result<Option<SelectedBehavior>> {
        // (is_one_time, index, score)
        let mut best: Option<(bool, usize, u32)> = None;

        for (index, entry) in self.one_time.iter().enumerate() {
            if entry.used {
                continue;
            }
            if let Some(score) = entry.pattern.score(invocation)?
                && best.is_none_or(|(_, _, top)| score > top)
            {
                best = Some((true, index, score));
            }
        }
        for (index, entry) in self.always.iter().enumerate() {
            if let Some(score) = entry.pattern.score(invocation)? {
                let better = match best {
                    None => true,
                    Some((true, _, top)) => score > top,
                    Some((false, _, top)) => score >= top,
                };
                if better {
                    best = Some((false, index, score));
                }
            }
        }

        let Some((one_time, index, score)) = best else {
            return Ok(None);
        };
        let entry = if one_time {
            let entry = &mut self.one_time[index];
            entry.used = true;
            &*entry
        } else {
            &self.always[index]
        };
        Ok(Some(SelectedBehavior {
            behavior: Arc::clone(&entry.behavior),
            defined_at: entry.pattern.defined_at(),
            pattern: entry.pattern.to_string(),
            one_time,
            score,
        }))
    }

    /// Forget every definition.
    pub fn reset(&mut self) {
        self.one_time.clear();
        self.always.clear();
    }

    pub fn len(&self) -> usize {
        self.one_time.len() + self.always.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::ValueReturning;
    use crate::matcher::{AnyMatcher, ArgumentMatcher, EqMatcher};
    use crate::proxy::{MethodSignature, ProxyId};
    use crate::value::{Value, ValueType};
    use std::panic::Location;

    const PROXY: ProxyId = 7;

    fn method() -> Arc<MethodSignature> {
        Arc::new(
            MethodSignature::new("greet")
                .param(ValueType::Str)
                .returns(ValueType::Str),
        )
    }

    fn any() -> Box<dyn ArgumentMatcher> {
        Box::new(AnyMatcher {
            value_type: ValueType::Str,
        })
    }

    fn eq(v: &str) -> Box<dyn ArgumentMatcher> {
        Box::new(EqMatcher {
            expected: Value::from(v),
        })
    }

    fn define(registry: &mut BehaviorRegistry, matcher: Box<dyn ArgumentMatcher>, out: &str, once: bool) {
        let pattern =
            InvocationPattern::new("greeter", PROXY, method(), vec![matcher], Location::caller())
                .expect("pattern");
        registry.register(
            pattern,
            Arc::new(ValueReturning {
                value: Value::from(out),
            }),
            once,
        );
    }

    fn call(arg: &str) -> Invocation {
        let args = crate::args![arg];
        Invocation::new("greeter", PROXY, method(), args.clone(), args, Location::caller())
    }

    fn selected(registry: &mut BehaviorRegistry, arg: &str) -> Option<String> {
        registry
            .select(&call(arg))
            .expect("select")
            .map(|s| s.behavior.describe())
    }

    #[test]
    fn empty_registry_selects_nothing() {
        let mut r = BehaviorRegistry::new();
        assert!(selected(&mut r, "Bob").is_none());
        assert!(r.is_empty());
    }

    #[test]
    fn higher_score_wins_regardless_of_list() {
        let mut r = BehaviorRegistry::new();
        define(&mut r, any(), "loose", true);
        define(&mut r, eq("Bob"), "exact", false);
        assert_eq!(selected(&mut r, "Bob").as_deref(), Some("returns \"exact\""));
        // The one-time entry was not consumed.
        assert_eq!(selected(&mut r, "Alice").as_deref(), Some("returns \"loose\""));
        assert_eq!(selected(&mut r, "Alice"), None);
    }

    #[test]
    fn selection_reports_score_and_list() {
        let mut r = BehaviorRegistry::new();
        define(&mut r, any(), "loose", true);
        define(&mut r, eq("Bob"), "exact", false);

        let exact = r.select(&call("Bob")).expect("select").expect("selected");
        assert_eq!(exact.score, 2);
        assert!(!exact.one_time);
        assert_eq!(exact.pattern, "greeter.greet(eq(\"Bob\"))");

        let loose = r.select(&call("Alice")).expect("select").expect("selected");
        assert_eq!(loose.score, 1);
        assert!(loose.one_time);
    }

    #[test]
    fn one_time_beats_always_on_tie_and_is_consumed() {
        let mut r = BehaviorRegistry::new();
        define(&mut r, any(), "once", true);
        define(&mut r, any(), "always", false);
        assert_eq!(selected(&mut r, "x").as_deref(), Some("returns \"once\""));
        assert_eq!(selected(&mut r, "x").as_deref(), Some("returns \"always\""));
        assert_eq!(selected(&mut r, "x").as_deref(), Some("returns \"always\""));
    }

    #[test]
    fn one_time_entries_consumed_in_registration_order() {
        let mut r = BehaviorRegistry::new();
        define(&mut r, any(), "first", true);
        define(&mut r, any(), "second", true);
        assert_eq!(selected(&mut r, "x").as_deref(), Some("returns \"first\""));
        assert_eq!(selected(&mut r, "x").as_deref(), Some("returns \"second\""));
        assert_eq!(selected(&mut r, "x"), None);
    }

    #[test]
    fn last_registered_always_entry_wins_tie() {
        let mut r = BehaviorRegistry::new();
        define(&mut r, any(), "older", false);
        define(&mut r, any(), "newer", false);
        assert_eq!(selected(&mut r, "x").as_deref(), Some("returns \"newer\""));
        assert_eq!(selected(&mut r, "x").as_deref(), Some("returns \"newer\""));
    }

    #[test]
    fn no_match_excludes_entry() {
        let mut r = BehaviorRegistry::new();
        define(&mut r, eq("Alice"), "alice", false);
        assert_eq!(selected(&mut r, "Bob"), None);
    }

    #[test]
    fn reset_forgets_definitions() {
        let mut r = BehaviorRegistry::new();
        define(&mut r, any(), "x", false);
        define(&mut r, any(), "y", true);
        assert_eq!(r.len(), 2);
        r.reset();
        assert!(r.is_empty());
        assert_eq!(selected(&mut r, "x"), None);
    }
}
