//! The chain currently being built by an entry point and its trailing calls.

#![allow(missing_docs)]

use std::sync::Arc;

use super::object::MockCore;
use crate::behavior::{ChainedMockReturning, MockBehavior};
use crate::matcher::InvocationPattern;
use crate::proxy::CallSite;

/// Which assertion an assertion chain runs on each segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verification {
    Invoked,
    Times(usize),
    InSequence,
    NotInvoked,
}

pub(crate) enum ChainMode {
    Define {
        behavior: Arc<dyn MockBehavior>,
        one_time: bool,
    },
    Assert(Verification),
}

impl ChainMode {
    pub(crate) const fn is_define(&self) -> bool {
        matches!(self, Self::Define { .. })
    }
}

/// One trailing call: the mock it was made on and the pattern it produced.
pub(crate) struct ChainSegment {
    pub(crate) mock: Arc<MockCore>,
    pub(crate) pattern: InvocationPattern,
}

pub(crate) struct PendingChain {
    pub(crate) entry: &'static str,
    pub(crate) started_at: CallSite,
    pub(crate) mode: ChainMode,
    /// Mock whose matching proxy takes the next trailing call.
    pub(crate) tip: Arc<MockCore>,
    /// Definition segments not yet installed.
    pub(crate) segments: Vec<ChainSegment>,
}

impl PendingChain {
    pub(crate) fn new(
        entry: &'static str,
        started_at: CallSite,
        mode: ChainMode,
        tip: Arc<MockCore>,
    ) -> Self {
        Self {
            entry,
            started_at,
            mode,
            tip,
            segments: Vec::new(),
        }
    }

    /// Register the chain's behaviors.
    ///
    /// Every inner segment returns the real proxy of the next segment's mock;
    /// the last one gets the chain's behavior. Returns `(mock, pattern,
    /// behavior)` labels of what was registered. Assertion chains install
    /// nothing.
    pub(crate) fn install(self) -> Vec<(String, String, String)> {
        let ChainMode::Define { behavior, one_time } = self.mode else {
            return Vec::new();
        };
        let mut installed = Vec::with_capacity(self.segments.len());
        let mut segments = self.segments.into_iter().peekable();
        while let Some(segment) = segments.next() {
            let step: Arc<dyn MockBehavior> = match segments.peek() {
                Some(next) => Arc::new(ChainedMockReturning {
                    proxy: next.mock.proxy.clone(),
                }),
                None => Arc::clone(&behavior),
            };
            installed.push((
                segment.mock.name.clone(),
                segment.pattern.to_string(),
                step.describe(),
            ));
            segment
                .mock
                .registry
                .lock()
                .register(segment.pattern, step, one_time);
        }
        installed
    }
}
