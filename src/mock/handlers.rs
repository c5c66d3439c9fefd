//! Invocation handlers behind the proxies a context creates.
//!
//! Handlers hold weak references; a proxy that outlives its context fails
//! with `ContextClosed` instead of keeping the context alive.

#![allow(missing_docs)]

use std::sync::Weak;

use super::context::ContextShared;
use super::object::MockCore;
use crate::behavior::DummySource;
use crate::core::errors::{MockError, Result};
use crate::proxy::{InvocationHandler, ProxyCall};
use crate::value::Value;

fn closed(call: &ProxyCall) -> MockError {
    MockError::ContextClosed {
        mock: call.proxy.name().to_string(),
    }
}

/// Real proxy: records the call and runs the selected behavior.
pub(crate) struct MockDispatcher {
    pub(crate) ctx: Weak<ContextShared>,
    pub(crate) core: Weak<MockCore>,
}

impl InvocationHandler for MockDispatcher {
    fn handle(&self, call: ProxyCall) -> Result<Value> {
        let (Some(ctx), Some(core)) = (self.ctx.upgrade(), self.core.upgrade()) else {
            return Err(closed(&call));
        };
        ctx.dispatch(&core, call)
    }
}

/// Matching proxy: completes or extends the open chain.
pub(crate) struct MatchingHandler {
    pub(crate) ctx: Weak<ContextShared>,
    pub(crate) core: Weak<MockCore>,
}

impl InvocationHandler for MatchingHandler {
    fn handle(&self, call: ProxyCall) -> Result<Value> {
        let (Some(ctx), Some(core)) = (self.ctx.upgrade(), self.core.upgrade()) else {
            return Err(closed(&call));
        };
        ctx.matching_call(&core, call)
    }
}

/// Dummy proxy: records nothing, returns type defaults.
pub(crate) struct DummyHandler {
    pub(crate) ctx: Weak<ContextShared>,
}

impl InvocationHandler for DummyHandler {
    fn handle(&self, call: ProxyCall) -> Result<Value> {
        let Some(ctx) = self.ctx.upgrade() else {
            return Err(closed(&call));
        };
        let method = call.signature()?;
        if method.is_void() {
            return Ok(Value::Unit);
        }
        let dummies: &dyn DummySource = &*ctx;
        Ok(ctx.defaults().default_value_for(method.return_type(), dummies))
    }
}
