#![forbid(unsafe_code)]

//! chainmock: a mock-object engine with fluent definition and verification
//! chains.
//!
//! 1. **Define** behavior: `mock.returns(v)?.invoke("method", args![..])?`
//! 2. **Exercise** the code under test with `mock.get_mock()`
//! 3. **Verify**: `mock.assert_invoked()?.invoke("method", args![..])?`
//!
//! Arguments in a chain are either literals, matched by equality, or
//! placeholders produced by [`matcher::Matchers`] factories.
//!
//! # Library usage
//!
//! ```rust
//! use chainmock::prelude::*;
//!
//! # fn main() -> chainmock::core::errors::Result<()> {
//! let ctx = MockContext::new();
//! let greeter_iface = Interface::builder("Greeter")
//!     .method(MethodSignature::new("greet").param(ValueType::Str).returns(ValueType::Str))
//!     .build();
//! let greeter = ctx.mock("greeter", &greeter_iface);
//! let m = ctx.matchers();
//!
//! greeter.returns("hi")?.invoke("greet", args![m.any(ValueType::Str)?])?;
//! assert_eq!(greeter.get_mock().invoke("greet", args!["Bob"])?, Value::from("hi"));
//! greeter.assert_invoked()?.invoke("greet", args!["Bob"])?;
//! # Ok(())
//! # }
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use chainmock::core::config::Config;
//! use chainmock::scenario::DefaultScenarioReport;
//! ```

pub mod prelude;

pub mod behavior;
pub mod core;
pub mod logger;
pub mod matcher;
pub mod mock;
pub mod proxy;
pub mod scenario;
pub mod syntax;
pub mod value;
