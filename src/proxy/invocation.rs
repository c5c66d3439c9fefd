//! Intercepted calls.

#![allow(missing_docs)]

use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use super::{MethodSignature, ProxyId};
use crate::value::Value;

/// Source location of a call, captured with `#[track_caller]`.
pub type CallSite = &'static Location<'static>;

/// One call made through a mock proxy. Immutable after creation.
#[derive(Debug, Clone)]
pub struct Invocation {
    mock_name: String,
    proxy_id: ProxyId,
    method: Arc<MethodSignature>,
    arguments: Vec<Value>,
    arguments_at_invocation: Vec<Value>,
    invoked_at: CallSite,
}

impl Invocation {
    pub fn new(
        mock_name: impl Into<String>,
        proxy_id: ProxyId,
        method: Arc<MethodSignature>,
        arguments: Vec<Value>,
        arguments_at_invocation: Vec<Value>,
        invoked_at: CallSite,
    ) -> Self {
        Self {
            mock_name: mock_name.into(),
            proxy_id,
            method,
            arguments,
            arguments_at_invocation,
            invoked_at,
        }
    }

    pub fn mock_name(&self) -> &str {
        &self.mock_name
    }

    pub const fn proxy_id(&self) -> ProxyId {
        self.proxy_id
    }

    pub fn method(&self) -> &Arc<MethodSignature> {
        &self.method
    }

    /// Live arguments as passed by the caller.
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn argument(&self, index: usize) -> Option<&Value> {
        self.arguments.get(index)
    }

    /// Deep-cloned snapshot of the arguments taken when the call was made.
    pub fn arguments_at_invocation(&self) -> &[Value] {
        &self.arguments_at_invocation
    }

    pub const fn invoked_at(&self) -> CallSite {
        self.invoked_at
    }
}

impl fmt::Display for Invocation {
    /// `mock.method(arg, ..)` using the snapshot arguments.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.mock_name, self.method.name())?;
        for (i, arg) in self.arguments_at_invocation.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}
