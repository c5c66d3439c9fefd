//! Declared parameter and return types.

#![allow(missing_docs)]

use std::fmt;

use super::{CellPath, Value};

/// The declared type of a parameter or return value.
///
/// Primitives (`Bool`, `Int`, `Float`) are non-nullable; every other type
/// except `Unit` accepts `Value::Null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// `void`: the method returns nothing.
    Unit,
    Bool,
    Int,
    Float,
    Str,
    List(Box<ValueType>),
    Set(Box<ValueType>),
    Array(Box<ValueType>),
    /// String-keyed map.
    Map(Box<ValueType>),
    /// A named record type.
    Object(String),
    /// A mockable interface, resolved by name in the mock context.
    Interface(String),
    Any,
}

impl ValueType {
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    pub fn set(element: Self) -> Self {
        Self::Set(Box::new(element))
    }

    pub fn array(element: Self) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn map(value: Self) -> Self {
        Self::Map(Box::new(value))
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::Object(name.into())
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::Interface(name.into())
    }

    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Bool | Self::Int | Self::Float)
    }

    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Unit)
    }

    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Set(_) | Self::Array(_))
    }

    /// Element type of a list, set or array.
    pub fn element_type(&self) -> Option<&Self> {
        match self {
            Self::List(e) | Self::Set(e) | Self::Array(e) => Some(e),
            _ => None,
        }
    }

    pub fn interface_name(&self) -> Option<&str> {
        match self {
            Self::Interface(name) => Some(name),
            _ => None,
        }
    }

    /// Whether `value` may be passed or returned where `self` is declared.
    pub fn accepts(&self, value: &Value) -> bool {
        self.accepts_in(value, &mut CellPath::default())
    }

    /// Descending into elements always narrows `self`, so only a chain of
    /// cells holding one another can loop; `path` holds that chain, and a
    /// chain that never reaches a value is rejected.
    fn accepts_in(&self, value: &Value, path: &mut CellPath) -> bool {
        if let Value::Shared(cell) = value {
            return !self.is_primitive()
                && cell
                    .visit(path, |inner, path| self.accepts_in(inner, path))
                    .unwrap_or(false);
        }
        match (self, value) {
            (Self::Any, _) => true,
            (Self::Unit, Value::Unit | Value::Null) => true,
            (Self::Unit, _) => false,
            (_, Value::Null) => !self.is_primitive(),
            (Self::Bool, Value::Bool(_))
            | (Self::Int, Value::Int(_))
            | (Self::Float, Value::Float(_))
            | (Self::Str, Value::Str(_)) => true,
            (Self::List(e), Value::List(items))
            | (Self::Set(e), Value::Set(items))
            | (Self::Array(e), Value::Array(items)) => {
                items.iter().all(|item| e.accepts(item))
            }
            (Self::Map(e), Value::Map(entries)) => entries.values().all(|v| e.accepts(v)),
            (Self::Object(name), Value::Object(obj)) => &obj.type_name == name,
            (Self::Interface(name), Value::Proxy(proxy)) => proxy.interface().name() == name,
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("void"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("String"),
            Self::List(e) => write!(f, "List<{e}>"),
            Self::Set(e) => write!(f, "Set<{e}>"),
            Self::Array(e) => write!(f, "{e}[]"),
            Self::Map(e) => write!(f, "Map<String, {e}>"),
            Self::Object(name) | Self::Interface(name) => f.write_str(name),
            Self::Any => f.write_str("Object"),
        }
    }
}
