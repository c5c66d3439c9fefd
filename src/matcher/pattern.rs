//! Invocation patterns: a method on one mock plus one matcher per parameter.

#![allow(missing_docs)]

use std::fmt;
use std::sync::Arc;

use super::ArgumentMatcher;
use crate::core::errors::{MockError, Result};
use crate::proxy::{CallSite, Invocation, MethodSignature, ProxyId};

pub struct InvocationPattern {
    mock_name: String,
    proxy_id: ProxyId,
    method: Arc<MethodSignature>,
    matchers: Vec<Box<dyn ArgumentMatcher>>,
    defined_at: CallSite,
}

impl InvocationPattern {
    /// Fails unless there is exactly one matcher per parameter.
    pub fn new(
        mock_name: impl Into<String>,
        proxy_id: ProxyId,
        method: Arc<MethodSignature>,
        matchers: Vec<Box<dyn ArgumentMatcher>>,
        defined_at: CallSite,
    ) -> Result<Self> {
        if matchers.len() != method.arity() {
            return Err(MockError::internal(format!(
                "pattern for {} has {} matcher(s) for {} parameter(s)",
                method.name(),
                matchers.len(),
                method.arity()
            )));
        }
        Ok(Self {
            mock_name: mock_name.into(),
            proxy_id,
            method,
            matchers,
            defined_at,
        })
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

    pub const fn defined_at(&self) -> CallSite {
        self.defined_at
    }

    /// Sum of matcher ranks, or `None` if the call does not match.
    ///
    /// A call on another mock or method never matches. An argument count that
    /// differs from the matcher count is an internal error.
    pub fn score(&self, invocation: &Invocation) -> Result<Option<u32>> {
        if invocation.proxy_id() != self.proxy_id
            || !invocation.method().same_signature(&self.method)
        {
            return Ok(None);
        }
        let live = invocation.arguments();
        let snapshot = invocation.arguments_at_invocation();
        if live.len() != self.matchers.len() || snapshot.len() != self.matchers.len() {
            return Err(MockError::internal(format!(
                "{invocation}: {} argument(s) scored against {} matcher(s)",
                live.len(),
                self.matchers.len()
            )));
        }

        let mut total = 0;
        for ((matcher, arg), snap) in self.matchers.iter().zip(live).zip(snapshot) {
            match matcher.matches(arg, snap).score() {
                Some(points) => total += points,
                None => return Ok(None),
            }
        }
        Ok(Some(total))
    }

    pub fn matches(&self, invocation: &Invocation) -> Result<bool> {
        Ok(self.score(invocation)?.is_some())
    }
}

impl fmt::Display for InvocationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.mock_name, self.method.name())?;
        for (i, m) in self.matchers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&m.describe())?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for InvocationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationPattern")
            .field("pattern", &self.to_string())
            .field("defined_at", &self.defined_at.to_string())
            .finish()
    }
}
