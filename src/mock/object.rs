//! Mock handles and the per-mock state behind them.

#![allow(missing_docs)]

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use parking_lot::Mutex;

use super::chain::{ChainMode, Verification};
use super::context::ContextShared;
use crate::behavior::{
    BehaviorRegistry, CollectionReturning, DefaultValueReturning, DummyReturning, MockBehavior,
    OriginalBehavior, Raising, ValueReturning,
};
use crate::core::errors::{RaisedError, Result};
use crate::proxy::{Interface, Proxy};
use crate::value::Value;

/// What a mock does when no registered behavior matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockKind {
    /// Returns type defaults.
    Strict,
    /// Calls the original implementation.
    Partial,
}

/// State shared by a mock's handle, its proxies and the context.
pub(crate) struct MockCore {
    pub(crate) name: String,
    pub(crate) interface: Arc<Interface>,
    pub(crate) kind: MockKind,
    pub(crate) original: Option<Arc<dyn OriginalBehavior>>,
    pub(crate) registry: Mutex<BehaviorRegistry>,
    /// The proxy handed to the code under test.
    pub(crate) proxy: Proxy,
    /// The proxy whose calls complete definition and assertion chains.
    pub(crate) matching_proxy: Proxy,
}

/// A mock of one interface.
///
/// Behavior and assertion entry points return the mock's *matching proxy*;
/// the single call made on it names the method and argument matchers the
/// entry point applies to:
///
/// ```rust
/// use chainmock::prelude::*;
///
/// # fn main() -> chainmock::core::errors::Result<()> {
/// let ctx = MockContext::new();
/// let iface = Interface::builder("Counter")
///     .method(MethodSignature::new("next").returns(ValueType::Int))
///     .build();
/// let counter = ctx.mock("counter", &iface);
///
/// counter.once_returns(1)?.invoke("next", args![])?;
/// counter.returns(2)?.invoke("next", args![])?;
///
/// let proxy = counter.get_mock();
/// assert_eq!(proxy.invoke("next", args![])?, Value::Int(1));
/// assert_eq!(proxy.invoke("next", args![])?, Value::Int(2));
/// counter.assert_invoked_times(2)?.invoke("next", args![])?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Mock {
    pub(crate) ctx: Arc<ContextShared>,
    pub(crate) core: Arc<MockCore>,
}

impl Mock {
    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn kind(&self) -> MockKind {
        self.core.kind
    }

    pub fn interface(&self) -> &Arc<Interface> {
        &self.core.interface
    }

    /// The proxy to hand to the code under test.
    pub fn get_mock(&self) -> Proxy {
        self.core.proxy.clone()
    }

    /// Forget registered behaviors; observed calls stay in the scenario.
    pub fn reset_behavior(&self) {
        self.core.registry.lock().reset();
    }

    // ──────────────────── returning ────────────────────

    #[track_caller]
    pub fn returns(&self, value: impl Into<Value>) -> Result<Proxy> {
        let behavior = ValueReturning {
            value: value.into(),
        };
        self.define("returns", Arc::new(behavior), false)
    }

    #[track_caller]
    pub fn once_returns(&self, value: impl Into<Value>) -> Result<Proxy> {
        let behavior = ValueReturning {
            value: value.into(),
        };
        self.define("once_returns", Arc::new(behavior), true)
    }

    /// Return `values` as the list, set or array the method declares.
    #[track_caller]
    pub fn returns_all<I, V>(&self, values: I) -> Result<Proxy>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let behavior = CollectionReturning {
            values: values.into_iter().map(Into::into).collect(),
        };
        self.define("returns_all", Arc::new(behavior), false)
    }

    #[track_caller]
    pub fn once_returns_all<I, V>(&self, values: I) -> Result<Proxy>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let behavior = CollectionReturning {
            values: values.into_iter().map(Into::into).collect(),
        };
        self.define("once_returns_all", Arc::new(behavior), true)
    }

    #[track_caller]
    pub fn returns_dummy(&self) -> Result<Proxy> {
        self.define("returns_dummy", Arc::new(DummyReturning::default()), false)
    }

    #[track_caller]
    pub fn once_returns_dummy(&self) -> Result<Proxy> {
        self.define("once_returns_dummy", Arc::new(DummyReturning::default()), true)
    }

    // ──────────────────── raising ────────────────────

    #[track_caller]
    pub fn raises(&self, error: RaisedError) -> Result<Proxy> {
        self.define("raises", Arc::new(Raising { error }), false)
    }

    #[track_caller]
    pub fn once_raises(&self, error: RaisedError) -> Result<Proxy> {
        self.define("once_raises", Arc::new(Raising { error }), true)
    }

    /// Raise a checked error of `kind` with an empty message.
    #[track_caller]
    pub fn raises_kind(&self, kind: impl Into<String>) -> Result<Proxy> {
        let error = RaisedError::of_kind(kind);
        self.define("raises_kind", Arc::new(Raising { error }), false)
    }

    #[track_caller]
    pub fn once_raises_kind(&self, kind: impl Into<String>) -> Result<Proxy> {
        let error = RaisedError::of_kind(kind);
        self.define("once_raises_kind", Arc::new(Raising { error }), true)
    }

    // ──────────────────── custom ────────────────────

    #[track_caller]
    pub fn performs(&self, behavior: impl MockBehavior + 'static) -> Result<Proxy> {
        self.define("performs", Arc::new(behavior), false)
    }

    #[track_caller]
    pub fn once_performs(&self, behavior: impl MockBehavior + 'static) -> Result<Proxy> {
        self.define("once_performs", Arc::new(behavior), true)
    }

    /// Return the type default instead of calling the original.
    #[track_caller]
    pub fn stub(&self) -> Result<Proxy> {
        self.define("stub", Arc::new(DefaultValueReturning), false)
    }

    #[track_caller]
    pub fn once_stub(&self) -> Result<Proxy> {
        self.define("once_stub", Arc::new(DefaultValueReturning), true)
    }

    // ──────────────────── assertions ────────────────────

    #[track_caller]
    pub fn assert_invoked(&self) -> Result<Proxy> {
        self.verify("assert_invoked", Verification::Invoked)
    }

    /// Exactly `times` not yet verified calls must match.
    #[track_caller]
    pub fn assert_invoked_times(&self, times: usize) -> Result<Proxy> {
        self.verify("assert_invoked_times", Verification::Times(times))
    }

    #[track_caller]
    pub fn assert_invoked_in_sequence(&self) -> Result<Proxy> {
        self.verify("assert_invoked_in_sequence", Verification::InSequence)
    }

    #[track_caller]
    pub fn assert_not_invoked(&self) -> Result<Proxy> {
        self.verify("assert_not_invoked", Verification::NotInvoked)
    }

    /// Every call on this mock is verified or had a configured behavior.
    #[track_caller]
    pub fn assert_no_more_invocations(&self) -> Result<()> {
        self.ctx
            .assert_no_more_invocations(Some(self.core.proxy.id()), Location::caller())
    }

    // ──────────────────────── internals ────────────────────────

    #[track_caller]
    fn define(
        &self,
        entry: &'static str,
        behavior: Arc<dyn MockBehavior>,
        one_time: bool,
    ) -> Result<Proxy> {
        let mode = ChainMode::Define { behavior, one_time };
        self.ctx
            .start_chain(&self.core, entry, mode, Location::caller())
    }

    #[track_caller]
    fn verify(&self, entry: &'static str, verification: Verification) -> Result<Proxy> {
        self.ctx.start_chain(
            &self.core,
            entry,
            ChainMode::Assert(verification),
            Location::caller(),
        )
    }
}

impl fmt::Debug for Mock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mock")
            .field("name", &self.core.name)
            .field("interface", &self.core.interface.name())
            .field("kind", &self.core.kind)
            .finish_non_exhaustive()
    }
}

/// `Greeter` → `greeter`.
pub(crate) fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapitalize_lowers_first_char_only() {
        assert_eq!(uncapitalize("TestInterface"), "testInterface");
        assert_eq!(uncapitalize(""), "");
        assert_eq!(uncapitalize("x"), "x");
    }
}
