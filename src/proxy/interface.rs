//! Interface and method-signature descriptions of a mocked type.

#![allow(missing_docs)]

use std::fmt;
use std::sync::Arc;

use crate::value::ValueType;

/// One method of an interface: name, parameter types, return type, and the
/// checked error kinds it declares.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    name: String,
    params: Vec<ValueType>,
    returns: ValueType,
    raises: Vec<String>,
}

impl MethodSignature {
    /// A method with no parameters returning `void`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: ValueType::Unit,
            raises: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, ty: ValueType) -> Self {
        self.params.push(ty);
        self
    }

    #[must_use]
    pub fn returns(mut self, ty: ValueType) -> Self {
        self.returns = ty;
        self
    }

    /// Declare a checked error kind.
    #[must_use]
    pub fn raises(mut self, kind: impl Into<String>) -> Self {
        self.raises.push(kind.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ValueType] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub const fn return_type(&self) -> &ValueType {
        &self.returns
    }

    pub fn declared_errors(&self) -> &[String] {
        &self.raises
    }

    pub const fn is_void(&self) -> bool {
        self.returns.is_void()
    }

    pub fn declares(&self, kind: &str) -> bool {
        self.raises.iter().any(|k| k == kind)
    }

    /// Same name and parameter types; return type and errors do not matter.
    pub fn same_signature(&self, other: &Self) -> bool {
        self.name == other.name && self.params == other.params
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ") -> {}", self.returns)
    }
}

/// A named set of methods that a proxy implements.
#[derive(Debug, PartialEq, Eq)]
pub struct Interface {
    name: String,
    methods: Vec<Arc<MethodSignature>>,
}

impl Interface {
    pub fn builder(name: impl Into<String>) -> InterfaceBuilder {
        InterfaceBuilder {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self, name: &str) -> Option<&Arc<MethodSignature>> {
        self.methods.iter().find(|m| m.name() == name)
    }

    pub fn methods(&self) -> &[Arc<MethodSignature>] {
        &self.methods
    }
}

#[derive(Debug)]
pub struct InterfaceBuilder {
    name: String,
    methods: Vec<Arc<MethodSignature>>,
}

impl InterfaceBuilder {
    /// Add a method. A later method with the same name replaces an earlier one.
    #[must_use]
    pub fn method(mut self, signature: MethodSignature) -> Self {
        self.methods.retain(|m| m.name() != signature.name());
        self.methods.push(Arc::new(signature));
        self
    }

    pub fn build(self) -> Arc<Interface> {
        Arc::new(Interface {
            name: self.name,
            methods: self.methods,
        })
    }
}
