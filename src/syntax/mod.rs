//! Enforcement of the fluent chain syntax.

pub mod guard;

pub use guard::{ChainEntry, SyntaxGuard};
