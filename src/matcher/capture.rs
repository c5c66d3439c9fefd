//! Correlates inline matcher-factory calls with argument positions.
//!
//! While a chain is open, each factory call registers its matcher here and
//! gets back `Value::Placeholder(slot)`. When the trailing call arrives,
//! [`MatcherCapture::finish`] walks its arguments: placeholders must appear in
//! slot order, every other position gets a default matcher for the literal.
//! The pending list is emptied on every exit path.

#![allow(missing_docs)]

use super::ArgumentMatcher;
use crate::core::errors::{MockError, Result};
use crate::value::{Value, ValueType};

#[derive(Debug, Default)]
pub struct MatcherCapture {
    open: bool,
    pending: Vec<Box<dyn ArgumentMatcher>>,
}

impl MatcherCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow registrations for the chain segment being built.
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Stop accepting registrations and drop anything pending.
    pub fn close(&mut self) {
        self.open = false;
        self.pending.clear();
    }

    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Register a matcher and return its placeholder.
    ///
    /// `placeholder_type` is the type the caller wants a placeholder for, if
    /// the factory is typed; primitives have no placeholder.
    pub fn register(
        &mut self,
        matcher: Box<dyn ArgumentMatcher>,
        placeholder_type: Option<&ValueType>,
    ) -> Result<Value> {
        if !self.open {
            return Err(MockError::MatcherOutsideChain {
                matcher: matcher.describe(),
            });
        }
        if let Some(ty) = placeholder_type.filter(|ty| ty.is_primitive()) {
            return Err(MockError::PrimitivePlaceholder {
                matcher: matcher.describe(),
                value_type: ty.to_string(),
            });
        }
        let slot = self.pending.len();
        self.pending.push(matcher);
        Ok(Value::Placeholder(slot))
    }

    /// Build one matcher per argument of the trailing call.
    pub fn finish<F>(
        &mut self,
        method: &str,
        arguments: &[Value],
        mut default_matcher: F,
    ) -> Result<Vec<Box<dyn ArgumentMatcher>>>
    where
        F: FnMut(&Value) -> Box<dyn ArgumentMatcher>,
    {
        let registered = std::mem::take(&mut self.pending);
        self.open = false;

        let total = registered.len();
        let mut explicit = registered.into_iter();
        let mut next_slot = 0;
        let mut matchers = Vec::with_capacity(arguments.len());

        for (position, arg) in arguments.iter().enumerate() {
            if let Value::Placeholder(slot) = arg {
                if *slot != next_slot || next_slot >= total {
                    return Err(if next_slot >= total {
                        MockError::MatcherCount {
                            method: method.to_string(),
                            registered: total,
                            consumed: next_slot + 1,
                        }
                    } else {
                        MockError::MatcherOrder {
                            method: method.to_string(),
                            position,
                            expected: next_slot,
                            found: *slot,
                        }
                    });
                }
                next_slot += 1;
                match explicit.next() {
                    Some(matcher) => matchers.push(matcher),
                    None => return Err(MockError::internal("matcher slot without a matcher")),
                }
            } else {
                matchers.push(default_matcher(arg));
            }
        }

        if next_slot != total {
            return Err(MockError::MatcherCount {
                method: method.to_string(),
                registered: total,
                consumed: next_slot,
            });
        }
        Ok(matchers)
    }
}
