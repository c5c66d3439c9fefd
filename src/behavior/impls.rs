//! Built-in behaviors.

#![allow(missing_docs)]

use std::sync::OnceLock;

use super::{BehaviorCall, InterfaceCatalog, MockBehavior};
use crate::core::errors::{MockError, RaisedError, Result};
use crate::proxy::{MethodSignature, Proxy};
use crate::value::{Value, ValueType};

fn reject_void(method: &MethodSignature) -> Result<()> {
    if method.is_void() {
        return Err(MockError::ValueForVoidMethod {
            method: method.to_string(),
        });
    }
    Ok(())
}

/// Returns a fixed value.
#[derive(Debug, Clone)]
pub struct ValueReturning {
    pub value: Value,
}

impl MockBehavior for ValueReturning {
    fn execute(&self, _call: &BehaviorCall<'_>) -> Result<Value> {
        Ok(self.value.clone())
    }

    fn check_compatible(&self, method: &MethodSignature, _: &dyn InterfaceCatalog) -> Result<()> {
        reject_void(method)?;
        if !method.return_type().accepts(&self.value) {
            return Err(MockError::IncompatibleReturnValue {
                method: method.to_string(),
                return_type: method.return_type().to_string(),
                value: self.value.to_string(),
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("returns {}", self.value)
    }
}

/// Returns the given elements as the list, set or array the method declares.
#[derive(Debug, Clone)]
pub struct CollectionReturning {
    pub values: Vec<Value>,
}

impl MockBehavior for CollectionReturning {
    fn execute(&self, call: &BehaviorCall<'_>) -> Result<Value> {
        let values = self.values.clone();
        match call.invocation().method().return_type() {
            ValueType::Set(_) => Ok(Value::set(values)),
            ValueType::Array(_) => Ok(Value::Array(values)),
            _ => Ok(Value::List(values)),
        }
    }

    fn check_compatible(&self, method: &MethodSignature, _: &dyn InterfaceCatalog) -> Result<()> {
        reject_void(method)?;
        let Some(element) = method.return_type().element_type() else {
            return Err(MockError::NotACollectionReturnType {
                method: method.to_string(),
                return_type: method.return_type().to_string(),
            });
        };
        if let Some(bad) = self.values.iter().find(|v| !element.accepts(v)) {
            return Err(MockError::IncompatibleCollectionElement {
                method: method.to_string(),
                expected: element.to_string(),
                value: bad.to_string(),
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("returns all {}", Value::List(self.values.clone()))
    }
}

/// Raises an application error.
#[derive(Debug, Clone)]
pub struct Raising {
    pub error: RaisedError,
}

impl MockBehavior for Raising {
    fn execute(&self, _call: &BehaviorCall<'_>) -> Result<Value> {
        Err(MockError::Raised(self.error.clone()))
    }

    fn check_compatible(&self, method: &MethodSignature, _: &dyn InterfaceCatalog) -> Result<()> {
        if self.error.checked && !method.declares(&self.error.kind) {
            return Err(MockError::UndeclaredError {
                method: method.to_string(),
                kind: self.error.kind.clone(),
                declared: method.declared_errors().join(", "),
            });
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("raises {}", self.error.kind)
    }
}

/// Returns a dummy of the method's object or interface return type.
///
/// The dummy is created on first use and returned on every later call.
#[derive(Debug, Default)]
pub struct DummyReturning {
    dummy: OnceLock<Value>,
}

impl MockBehavior for DummyReturning {
    fn execute(&self, call: &BehaviorCall<'_>) -> Result<Value> {
        Ok(self.dummy.get_or_init(|| call.default_value()).clone())
    }

    fn check_compatible(
        &self,
        method: &MethodSignature,
        interfaces: &dyn InterfaceCatalog,
    ) -> Result<()> {
        reject_void(method)?;
        match method.return_type() {
            ValueType::Object(_) => Ok(()),
            ValueType::Interface(name) if interfaces.contains_interface(name) => Ok(()),
            other => Err(MockError::NoDummyForType {
                method: method.to_string(),
                return_type: other.to_string(),
            }),
        }
    }

    fn describe(&self) -> String {
        "returns dummy".to_string()
    }
}

/// Returns the type default; what a strict mock does when nothing matches.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultValueReturning;

impl MockBehavior for DefaultValueReturning {
    fn execute(&self, call: &BehaviorCall<'_>) -> Result<Value> {
        Ok(call.default_value())
    }

    fn describe(&self) -> String {
        "default value".to_string()
    }
}

/// Delegates to the partial mock's original implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct OriginalInvoking;

impl MockBehavior for OriginalInvoking {
    fn execute(&self, call: &BehaviorCall<'_>) -> Result<Value> {
        call.call_original()
    }

    fn describe(&self) -> String {
        "calls original".to_string()
    }
}

/// Inner link of a behavior chain: returns the next mock in the chain.
#[derive(Debug, Clone)]
pub struct ChainedMockReturning {
    pub proxy: Proxy,
}

impl MockBehavior for ChainedMockReturning {
    fn execute(&self, _call: &BehaviorCall<'_>) -> Result<Value> {
        Ok(Value::Proxy(self.proxy.clone()))
    }

    fn describe(&self) -> String {
        format!("returns chained mock {}", self.proxy.name())
    }
}

/// Behavior backed by a closure; see [`from_fn`].
pub struct FnBehavior<F> {
    f: F,
}

impl<F> MockBehavior for FnBehavior<F>
where
    F: Fn(&BehaviorCall<'_>) -> Result<Value> + Send + Sync,
{
    fn execute(&self, call: &BehaviorCall<'_>) -> Result<Value> {
        (self.f)(call)
    }
}

/// Wrap a closure as a behavior.
///
/// ```rust
/// use chainmock::behavior::{from_fn, MockBehavior};
/// use chainmock::value::Value;
///
/// let upper = from_fn(|call| {
///     let name = call.argument(0);
///     Ok(Value::from(name.as_str().unwrap_or_default().to_uppercase()))
/// });
/// # let _ = upper.describe();
/// ```
pub fn from_fn<F>(f: F) -> FnBehavior<F>
where
    F: Fn(&BehaviorCall<'_>) -> Result<Value> + Send + Sync,
{
    FnBehavior { f }
}
