//! Tracks whether a chain entry point is still waiting for its trailing call.
//!
//! Every entry point (`returns`, `assert_invoked`, ...) hands out a matching
//! proxy and must be followed by exactly one call on it. The guard remembers
//! the open entry point; the next chain start, or any call on a real mock,
//! that arrives first reports it as dangling.

#![allow(missing_docs)]

use crate::core::errors::{MockError, Result};
use crate::proxy::{CallSite, ProxyId};

/// The entry point that opened a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEntry {
    /// Id of the matching proxy the trailing call must go to.
    pub token: ProxyId,
    pub mock_name: String,
    /// Entry point name, e.g. `returns`.
    pub entry: &'static str,
    pub started_at: CallSite,
}

impl ChainEntry {
    fn dangling(&self) -> MockError {
        MockError::DanglingChain {
            mock: self.mock_name.clone(),
            entry: self.entry,
            defined_at: self.started_at.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SyntaxGuard {
    awaiting: Option<ChainEntry>,
}

impl SyntaxGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a chain. A chain still waiting for its call is reported instead
    /// and the guard returns to idle.
    pub fn start_chain(&mut self, entry: ChainEntry) -> Result<()> {
        if let Some(open) = self.awaiting.take() {
            return Err(open.dangling());
        }
        self.awaiting = Some(entry);
        Ok(())
    }

    /// A call arrived on proxy `target`. Fails if a chain is waiting for a
    /// call on a different proxy.
    pub fn check_call(&mut self, target: ProxyId) -> Result<()> {
        match &self.awaiting {
            Some(open) if open.token != target => {
                let err = open.dangling();
                self.awaiting = None;
                Err(err)
            }
            _ => Ok(()),
        }
    }

    /// Fails if any chain is waiting; used by interactions that are not
    /// proxy calls.
    pub fn ensure_idle(&mut self) -> Result<()> {
        match self.awaiting.take() {
            Some(open) => Err(open.dangling()),
            None => Ok(()),
        }
    }

    /// The trailing call arrived; back to idle.
    pub fn complete(&mut self) -> Option<ChainEntry> {
        self.awaiting.take()
    }

    /// Keep waiting, now for a call on `token`.
    pub fn resume(&mut self, entry: ChainEntry) {
        self.awaiting = Some(entry);
    }

    pub const fn is_awaiting(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn awaiting(&self) -> Option<&ChainEntry> {
        self.awaiting.as_ref()
    }

    pub fn reset(&mut self) {
        self.awaiting = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::Location;

    fn entry(token: ProxyId) -> ChainEntry {
        ChainEntry {
            token,
            mock_name: "greeter".to_string(),
            entry: "returns",
            started_at: Location::caller(),
        }
    }

    #[test]
    fn second_start_reports_first_and_resets() {
        let mut guard = SyntaxGuard::new();
        guard.start_chain(entry(1)).unwrap();
        let err = guard.start_chain(entry(2)).unwrap_err();
        assert!(matches!(err, MockError::DanglingChain { entry: "returns", .. }));
        assert!(err.to_string().contains("greeter.returns()"), "{err}");
        assert!(!guard.is_awaiting());
        guard.start_chain(entry(3)).unwrap();
    }

    #[test]
    fn call_on_other_proxy_is_dangling() {
        let mut guard = SyntaxGuard::new();
        guard.start_chain(entry(1)).unwrap();
        assert!(guard.check_call(1).is_ok());
        assert!(guard.is_awaiting());
        assert!(guard.check_call(9).is_err());
        assert!(!guard.is_awaiting());
    }

    #[test]
    fn idle_guard_accepts_any_call() {
        let mut guard = SyntaxGuard::new();
        assert!(guard.check_call(4).is_ok());
        guard.start_chain(entry(4)).unwrap();
        assert_eq!(guard.complete().map(|e| e.token), Some(4));
        assert!(guard.check_call(5).is_ok());
    }

    #[test]
    fn resume_moves_the_expected_target() {
        let mut guard = SyntaxGuard::new();
        guard.start_chain(entry(1)).unwrap();
        let open = guard.complete().unwrap();
        guard.resume(ChainEntry { token: 2, ..open });
        assert!(guard.check_call(2).is_ok());
        assert_eq!(guard.awaiting().map(|e| e.token), Some(2));
        guard.reset();
        assert!(!guard.is_awaiting());
    }
}
