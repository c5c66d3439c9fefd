//! Mock behaviors and the per-mock registry that selects them.
//!
//! A [`MockBehavior`] is what runs when a call matches a registered pattern:
//! return a value, raise an error, delegate to the original implementation,
//! or run custom logic. Behaviors validate themselves against the method they
//! are attached to at registration time through
//! [`MockBehavior::check_compatible`].

#![allow(missing_docs)]

pub mod defaults;
pub mod impls;
pub mod registry;

use crate::core::errors::{MockError, Result};
use crate::proxy::{Invocation, MethodSignature};
use crate::value::{Value, ValueType};

pub use defaults::{DefaultValueFactory, DummySource, InterfaceCatalog, StandardDefaults};
pub use impls::{
    ChainedMockReturning, CollectionReturning, DefaultValueReturning, DummyReturning, FnBehavior,
    OriginalInvoking, Raising, ValueReturning, from_fn,
};
pub use registry::{BehaviorRegistry, SelectedBehavior};

/// An executable action bound to an invocation pattern.
pub trait MockBehavior: Send + Sync {
    fn execute(&self, call: &BehaviorCall<'_>) -> Result<Value>;

    /// Reject the behavior for `method` before it is registered.
    /// `interfaces` lists the interfaces the context can mock.
    fn check_compatible(
        &self,
        method: &MethodSignature,
        interfaces: &dyn InterfaceCatalog,
    ) -> Result<()> {
        let _ = (method, interfaces);
        Ok(())
    }

    /// Short label for the scenario report.
    fn describe(&self) -> String {
        "performs custom behavior".to_string()
    }
}

/// Real implementation a partial mock falls back to.
pub trait OriginalBehavior: Send + Sync {
    fn call_original(&self, invocation: &Invocation) -> Result<Value>;
}

impl<F> OriginalBehavior for F
where
    F: Fn(&Invocation) -> Result<Value> + Send + Sync,
{
    fn call_original(&self, invocation: &Invocation) -> Result<Value> {
        self(invocation)
    }
}

/// Everything a behavior may use while executing.
pub struct BehaviorCall<'a> {
    invocation: &'a Invocation,
    defaults: &'a dyn DefaultValueFactory,
    dummies: &'a dyn DummySource,
    original: Option<&'a dyn OriginalBehavior>,
}

impl<'a> BehaviorCall<'a> {
    pub fn new(
        invocation: &'a Invocation,
        defaults: &'a dyn DefaultValueFactory,
        dummies: &'a dyn DummySource,
        original: Option<&'a dyn OriginalBehavior>,
    ) -> Self {
        Self {
            invocation,
            defaults,
            dummies,
            original,
        }
    }

    pub const fn invocation(&self) -> &'a Invocation {
        self.invocation
    }

    /// Live argument at `index`, or `Null` past the end.
    pub fn argument(&self, index: usize) -> Value {
        self.invocation.argument(index).cloned().unwrap_or(Value::Null)
    }

    pub fn arguments(&self) -> &'a [Value] {
        self.invocation.arguments()
    }

    /// Type default for the called method's return type.
    pub fn default_value(&self) -> Value {
        self.default_for(self.invocation.method().return_type())
    }

    pub fn default_for(&self, value_type: &ValueType) -> Value {
        self.defaults.default_value_for(value_type, self.dummies)
    }

    /// Run the partial mock's original implementation.
    pub fn call_original(&self) -> Result<Value> {
        match self.original {
            Some(original) => original.call_original(self.invocation),
            None => Err(MockError::NoOriginalBehavior {
                mock: self.invocation.mock_name().to_string(),
                method: self.invocation.method().name().to_string(),
            }),
        }
    }
}
