//! Interception port: proxies, the handler that receives their calls, and the
//! factory that creates them.
//!
//! A [`Proxy`] is the interceptable instance of an [`Interface`]. Every
//! [`Proxy::invoke`] is forwarded to its [`InvocationHandler`] as a
//! [`ProxyCall`]. Typed facades can wrap a `Proxy` by hand; the engine itself
//! only needs this dynamic surface.

#![allow(missing_docs)]

pub mod interface;
pub mod invocation;

use std::fmt;
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::errors::{MockError, Result};
use crate::value::Value;

pub use interface::{Interface, InterfaceBuilder, MethodSignature};
pub use invocation::{CallSite, Invocation};

/// Identifier of a proxy, unique within the factory that created it.
pub type ProxyId = u64;

/// Receives every call made on a proxy.
pub trait InvocationHandler: Send + Sync {
    fn handle(&self, call: ProxyCall) -> Result<Value>;
}

/// Creates proxies that forward to a handler.
pub trait ProxyFactory: Send + Sync {
    fn create_proxy(
        &self,
        name: &str,
        interface: Arc<Interface>,
        handler: Arc<dyn InvocationHandler>,
    ) -> Proxy;
}

/// A call as seen by an [`InvocationHandler`], before method resolution.
pub struct ProxyCall {
    pub proxy: Proxy,
    pub method_name: String,
    pub arguments: Vec<Value>,
    pub invoked_at: CallSite,
}

impl ProxyCall {
    /// Resolve the called method and check argument count and types.
    ///
    /// Placeholders are accepted at any position; the matcher capture checks them.
    pub fn signature(&self) -> Result<Arc<MethodSignature>> {
        let interface = self.proxy.interface();
        let method = interface
            .method(&self.method_name)
            .ok_or_else(|| MockError::UnknownMethod {
                interface: interface.name().to_string(),
                method: self.method_name.clone(),
            })?;

        if self.arguments.len() != method.arity() {
            return Err(MockError::ArgumentCount {
                method: format!("{}.{}", interface.name(), method.name()),
                expected: method.arity(),
                actual: self.arguments.len(),
            });
        }
        for (position, (arg, ty)) in self.arguments.iter().zip(method.params()).enumerate() {
            if !arg.is_placeholder() && !ty.accepts(arg) {
                return Err(MockError::ArgumentType {
                    method: format!("{}.{}", interface.name(), method.name()),
                    position,
                    expected: ty.to_string(),
                    actual: arg.type_label(),
                });
            }
        }
        Ok(Arc::clone(method))
    }
}

struct ProxyInner {
    id: ProxyId,
    name: String,
    interface: Arc<Interface>,
    handler: Arc<dyn InvocationHandler>,
}

/// Interceptable instance of an interface. Cheap to clone; clones are the
/// same instance.
#[derive(Clone)]
pub struct Proxy {
    inner: Arc<ProxyInner>,
}

impl Proxy {
    pub fn new(
        id: ProxyId,
        name: impl Into<String>,
        interface: Arc<Interface>,
        handler: Arc<dyn InvocationHandler>,
    ) -> Self {
        Self {
            inner: Arc::new(ProxyInner {
                id,
                name: name.into(),
                interface,
                handler,
            }),
        }
    }

    pub fn id(&self) -> ProxyId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn interface(&self) -> &Arc<Interface> {
        &self.inner.interface
    }

    /// Call `method` with `arguments`. The caller's location is recorded.
    #[track_caller]
    pub fn invoke(&self, method: &str, arguments: Vec<Value>) -> Result<Value> {
        let invoked_at = Location::caller();
        self.inner.handler.handle(ProxyCall {
            proxy: self.clone(),
            method_name: method.to_string(),
            arguments,
            invoked_at,
        })
    }

    /// Whether both handles refer to the same instance.
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("interface", &self.inner.interface.name())
            .finish_non_exhaustive()
    }
}

/// Default factory: proxies call straight into their handler.
#[derive(Debug, Default)]
pub struct DirectProxyFactory {
    next_id: AtomicU64,
}

impl ProxyFactory for DirectProxyFactory {
    fn create_proxy(
        &self,
        name: &str,
        interface: Arc<Interface>,
        handler: Arc<dyn InvocationHandler>,
    ) -> Proxy {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        Proxy::new(id, name, interface, handler)
    }
}
