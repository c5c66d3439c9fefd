//! The observed-invocation ledger and its assertions.
//!
//! Each entry moves at most once: UNVERIFIED → VERIFIED or
//! UNVERIFIED → VERIFIED_IN_ORDER. Assertions only ever consider UNVERIFIED
//! entries as candidates, so one observed call satisfies one assertion.

#![allow(missing_docs)]

use std::fmt::Write as _;

use super::report::ScenarioReport;
use crate::core::errors::{AssertionFailure, AssertionKind, MockError, Result};
use crate::matcher::InvocationPattern;
use crate::proxy::{CallSite, Invocation, ProxyId};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationStatus {
    Unverified,
    Verified,
    VerifiedInOrder,
}

/// Result of executing the behavior, snapshotted.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Recorded before the behavior ran; replaced once it returns.
    Pending,
    Returned(Value),
    Raised(String),
}

#[derive(Debug, Clone)]
pub struct ObservedInvocation {
    pub invocation: Invocation,
    /// Label of the behavior that ran; `None` for a void call on a strict mock.
    pub behavior: Option<String>,
    /// Definition site when a registered behavior was selected.
    pub behavior_defined_at: Option<CallSite>,
    pub outcome: Outcome,
}

impl ObservedInvocation {
    pub const fn new(
        invocation: Invocation,
        behavior: Option<String>,
        behavior_defined_at: Option<CallSite>,
    ) -> Self {
        Self {
            invocation,
            behavior,
            behavior_defined_at,
            outcome: Outcome::Pending,
        }
    }

    /// Whether a registered (not default) behavior handled the call.
    pub const fn has_configured_behavior(&self) -> bool {
        self.behavior_defined_at.is_some()
    }
}

/// Stable handle to a recorded call. Ids are never reused, even across
/// [`Scenario::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

#[derive(Debug, Clone)]
pub struct ScenarioEntry {
    pub id: EntryId,
    pub observed: ObservedInvocation,
    pub status: VerificationStatus,
}

/// Ordered history of every call observed in one mock context.
#[derive(Debug, Default)]
pub struct Scenario {
    entries: Vec<ScenarioEntry>,
    next_id: u64,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observed call.
    pub fn record(&mut self, observed: ObservedInvocation) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(ScenarioEntry {
            id,
            observed,
            status: VerificationStatus::Unverified,
        });
        id
    }

    /// Store the outcome of the call recorded as `id`. Does nothing if the
    /// entry was dropped by a reset while its behavior ran.
    pub fn complete(&mut self, id: EntryId, outcome: Outcome) {
        if let Ok(index) = self.entries.binary_search_by_key(&id, |entry| entry.id) {
            self.entries[index].observed.outcome = outcome;
        }
    }

    pub fn entries(&self) -> &[ScenarioEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Mark the first unverified match as verified.
    pub fn assert_invoked(
        &mut self,
        pattern: &InvocationPattern,
        asserted_at: CallSite,
        report: &dyn ScenarioReport,
    ) -> Result<()> {
        match self.first_unverified_match(pattern)? {
            Some(index) => {
                self.entries[index].status = VerificationStatus::Verified;
                Ok(())
            }
            None => Err(self.failure(
                AssertionKind::Invoked,
                pattern.to_string(),
                format!("Expected invocation of {pattern}, but it didn't occur."),
                asserted_at,
                report,
            )),
        }
    }

    /// Exactly `times` unverified entries must match; all become verified.
    pub fn assert_invoked_times(
        &mut self,
        pattern: &InvocationPattern,
        times: usize,
        asserted_at: CallSite,
        report: &dyn ScenarioReport,
    ) -> Result<()> {
        if times == 0 {
            return Err(MockError::InvalidTimes { times });
        }
        let matches = self.unverified_matches(pattern)?;
        if matches.len() != times {
            return Err(self.failure(
                AssertionKind::InvokedTimes,
                pattern.to_string(),
                format!(
                    "Expected {times} invocation(s) of {pattern}, but {} occurred.",
                    matches.len()
                ),
                asserted_at,
                report,
            ));
        }
        for index in matches {
            self.entries[index].status = VerificationStatus::Verified;
        }
        Ok(())
    }

    /// Like [`Self::assert_invoked`], but the match must not precede any call
    /// already verified in order.
    pub fn assert_invoked_in_sequence(
        &mut self,
        pattern: &InvocationPattern,
        asserted_at: CallSite,
        report: &dyn ScenarioReport,
    ) -> Result<()> {
        let Some(index) = self.first_unverified_match(pattern)? else {
            return Err(self.failure(
                AssertionKind::InvokedInSequence,
                pattern.to_string(),
                format!("Expected invocation of {pattern}, but it didn't occur."),
                asserted_at,
                report,
            ));
        };
        if let Some(later) = self.entries[index + 1..]
            .iter()
            .find(|e| e.status == VerificationStatus::VerifiedInOrder)
        {
            let matched = &self.entries[index].observed.invocation;
            let head = format!(
                "Invocation of {matched} was expected to be performed after {} but actually occurred before it.",
                later.observed.invocation
            );
            return Err(self.failure(
                AssertionKind::OutOfOrder,
                pattern.to_string(),
                head,
                asserted_at,
                report,
            ));
        }
        self.entries[index].status = VerificationStatus::VerifiedInOrder;
        Ok(())
    }

    /// Fails if any unverified entry matches.
    pub fn assert_not_invoked(
        &self,
        pattern: &InvocationPattern,
        asserted_at: CallSite,
        report: &dyn ScenarioReport,
    ) -> Result<()> {
        if let Some(index) = self.first_unverified_match(pattern)? {
            let observed = &self.entries[index].observed.invocation;
            return Err(self.failure(
                AssertionKind::NotInvoked,
                pattern.to_string(),
                format!(
                    "Expected no invocation of {pattern}, but it did occur.\nat {}",
                    observed.invoked_at()
                ),
                asserted_at,
                report,
            ));
        }
        Ok(())
    }

    /// Fails if an unverified entry without a configured behavior remains.
    ///
    /// `only` restricts the check to the calls of one mock.
    pub fn assert_no_more_invocations(
        &self,
        only: Option<ProxyId>,
        asserted_at: CallSite,
        report: &dyn ScenarioReport,
    ) -> Result<()> {
        let unexpected: Vec<&ScenarioEntry> = self
            .entries
            .iter()
            .filter(|e| only.is_none_or(|id| e.observed.invocation.proxy_id() == id))
            .filter(|e| {
                e.status == VerificationStatus::Unverified && !e.observed.has_configured_behavior()
            })
            .collect();
        if unexpected.is_empty() {
            return Ok(());
        }

        let mut head = String::from("No more invocations expected, yet observed following calls:\n");
        for entry in &unexpected {
            let invocation = &entry.observed.invocation;
            let _ = writeln!(head, "- {invocation}  at {}", invocation.invoked_at());
        }
        let head = head.trim_end().to_string();
        Err(self.failure(
            AssertionKind::NoMoreInvocations,
            "*".to_string(),
            head,
            asserted_at,
            report,
        ))
    }

    fn first_unverified_match(&self, pattern: &InvocationPattern) -> Result<Option<usize>> {
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.status == VerificationStatus::Unverified
                && pattern.matches(&entry.observed.invocation)?
            {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    fn unverified_matches(&self, pattern: &InvocationPattern) -> Result<Vec<usize>> {
        let mut found = Vec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.status == VerificationStatus::Unverified
                && pattern.matches(&entry.observed.invocation)?
            {
                found.push(index);
            }
        }
        Ok(found)
    }

    fn failure(
        &self,
        kind: AssertionKind,
        expected: String,
        head: String,
        asserted_at: CallSite,
        report: &dyn ScenarioReport,
    ) -> MockError {
        let scenario = report.render(&self.entries);
        let asserted_at = asserted_at.to_string();
        let message = format!("{head}\nasserted at {asserted_at}\n\n{scenario}");
        MockError::Assertion(AssertionFailure {
            kind,
            expected,
            asserted_at,
            scenario,
            message,
        })
    }
}
