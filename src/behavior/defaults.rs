//! Type defaults for calls no behavior handles.

#![allow(missing_docs)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::proxy::{Interface, Proxy};
use crate::value::{ObjectValue, Value, ValueType};

/// Creates dummy proxies for interfaces known to the mock context.
pub trait DummySource {
    /// A fresh dummy implementing `interface`, if that interface is registered.
    fn dummy(&self, interface: &str) -> Option<Proxy>;
}

/// Interface names a behavior can rely on when it is registered.
pub trait InterfaceCatalog {
    fn contains_interface(&self, name: &str) -> bool;
}

impl InterfaceCatalog for HashMap<String, Arc<Interface>> {
    fn contains_interface(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

/// Produces the value a strict mock returns when nothing matched.
pub trait DefaultValueFactory: Send + Sync {
    fn default_value_for(&self, value_type: &ValueType, dummies: &dyn DummySource) -> Value;
}

/// Zero, empty, or fresh-dummy values.
///
/// | type | default |
/// |---|---|
/// | `void` | `()` |
/// | `bool` / `int` / `float` | `false` / `0` / `0.0` |
/// | `String` | `""` |
/// | collections, maps | empty |
/// | `Object(name)` | empty object of that type |
/// | `Interface(name)` | dummy proxy, or `null` if the interface is unknown |
/// | `Any` | `null` |
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardDefaults;

impl DefaultValueFactory for StandardDefaults {
    fn default_value_for(&self, value_type: &ValueType, dummies: &dyn DummySource) -> Value {
        match value_type {
            ValueType::Unit => Value::Unit,
            ValueType::Bool => Value::Bool(false),
            ValueType::Int => Value::Int(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::Str => Value::Str(String::new()),
            ValueType::List(_) => Value::List(Vec::new()),
            ValueType::Set(_) => Value::Set(Vec::new()),
            ValueType::Array(_) => Value::Array(Vec::new()),
            ValueType::Map(_) => Value::Map(BTreeMap::new()),
            ValueType::Object(name) => Value::Object(ObjectValue::new(name.clone())),
            ValueType::Interface(name) => dummies.dummy(name).map_or(Value::Null, Value::Proxy),
            ValueType::Any => Value::Null,
        }
    }
}

/// A [`DummySource`] that knows no interfaces.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDummies;

impl DummySource for NoDummies {
    fn dummy(&self, _interface: &str) -> Option<Proxy> {
        None
    }
}

impl InterfaceCatalog for NoDummies {
    fn contains_interface(&self, _name: &str) -> bool {
        false
    }
}
