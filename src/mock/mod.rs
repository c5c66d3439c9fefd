//! Mock contexts and mocks: the fluent definition and assertion surface.
//!
//! A [`MockContext`] owns everything one test needs. Each [`Mock`] it creates
//! has two proxies: the real one handed to the code under test, and a
//! matching proxy whose single call completes a `returns(..)` or
//! `assert_invoked()` chain.

pub(crate) mod chain;
pub mod context;
pub(crate) mod handlers;
pub mod object;

pub use context::{MockContext, MockContextBuilder};
pub use object::{Mock, MockKind};
