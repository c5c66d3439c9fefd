//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use chainmock::prelude::*;
//! ```

// Core
pub use crate::core::config::{Config, DefaultMatching};
pub use crate::core::errors::{AssertionKind, MockError, RaisedError, Result};

// Values and interfaces
pub use crate::args;
pub use crate::proxy::{Interface, Invocation, MethodSignature, Proxy};
pub use crate::value::{ObjectValue, SharedValue, Value, ValueType};

// Mocks
pub use crate::behavior::{BehaviorCall, MockBehavior, from_fn};
pub use crate::matcher::Matchers;
pub use crate::mock::{Mock, MockContext, MockKind};
