//! Matcher factories used inline in definition and assertion chains.
//!
//! ```rust
//! use chainmock::prelude::*;
//!
//! # fn main() -> chainmock::core::errors::Result<()> {
//! let ctx = MockContext::new();
//! let greeter = ctx.mock("greeter", &Interface::builder("Greeter")
//!     .method(MethodSignature::new("greet").param(ValueType::Str).returns(ValueType::Str))
//!     .build());
//! let m = ctx.matchers();
//!
//! greeter.returns("hi")?.invoke("greet", args![m.any(ValueType::Str)?])?;
//! assert_eq!(greeter.get_mock().invoke("greet", args!["Bob"])?, Value::from("hi"));
//! # Ok(())
//! # }
//! ```
//!
//! Factories must be called in the same left-to-right order as the arguments
//! they stand for.

#![allow(missing_docs)]

use std::sync::Arc;

use super::impls::{
    AnyMatcher, EqMatcher, IsNullMatcher, LenEqMatcher, NotNullMatcher, RefEqMatcher, SameMatcher,
};
use super::ArgumentMatcher;
use crate::core::errors::Result;
use crate::value::{CloneService, Value, ValueType};

/// Destination of matcher registrations; implemented by the mock context.
pub trait MatcherSink: Send + Sync {
    fn register_matcher(
        &self,
        matcher: Box<dyn ArgumentMatcher>,
        placeholder_type: Option<&ValueType>,
    ) -> Result<Value>;

    fn clone_service(&self) -> &dyn CloneService;
}

/// Factory handle bound to one mock context.
#[derive(Clone)]
pub struct Matchers {
    sink: Arc<dyn MatcherSink>,
}

impl Matchers {
    pub fn new(sink: Arc<dyn MatcherSink>) -> Self {
        Self { sink }
    }

    /// Any non-null value of `value_type`.
    pub fn any(&self, value_type: ValueType) -> Result<Value> {
        let matcher = AnyMatcher {
            value_type: value_type.clone(),
        };
        self.sink.register_matcher(Box::new(matcher), Some(&value_type))
    }

    pub fn not_null(&self, value_type: ValueType) -> Result<Value> {
        let matcher = NotNullMatcher {
            value_type: value_type.clone(),
        };
        self.sink.register_matcher(Box::new(matcher), Some(&value_type))
    }

    pub fn is_null(&self, value_type: ValueType) -> Result<Value> {
        let matcher = IsNullMatcher {
            value_type: value_type.clone(),
        };
        self.sink.register_matcher(Box::new(matcher), Some(&value_type))
    }

    /// Equal to `expected` at the time the mock is called.
    pub fn eq(&self, expected: impl Into<Value>) -> Result<Value> {
        let matcher = EqMatcher {
            expected: expected.into(),
        };
        self.sink.register_matcher(Box::new(matcher), None)
    }

    /// The very same shared cell or proxy as `expected`.
    pub fn same(&self, expected: impl Into<Value>) -> Result<Value> {
        let matcher = SameMatcher {
            expected: expected.into(),
        };
        self.sink.register_matcher(Box::new(matcher), None)
    }

    /// Strictly equal to `expected` as it is now, compared with the
    /// argument as it was when the call was made.
    pub fn ref_eq(&self, expected: impl Into<Value>) -> Result<Value> {
        let matcher = RefEqMatcher::new(expected.into(), self.sink.clone_service());
        self.sink.register_matcher(Box::new(matcher), None)
    }

    /// Leniently equal to `expected` as it is now, compared with the
    /// argument as it was when the call was made.
    pub fn len_eq(&self, expected: impl Into<Value>) -> Result<Value> {
        let matcher = LenEqMatcher::new(expected.into(), self.sink.clone_service());
        self.sink.register_matcher(Box::new(matcher), None)
    }
}
