//! Equality flavors used by argument matchers.
//!
//! * [`identical`]: pointer identity for shared cells and proxies, strict
//!   equality for owned values.
//! * [`strict_eq`]: structural equality; sets compare order-insensitively.
//! * [`lenient_eq`]: structural equality that ignores list order and skips
//!   object fields whose expected value is a default (`null`, `0`, `false`,
//!   `""`), treating them as "don't care".

#![allow(missing_docs)]

use super::{CellPath, Value};

/// Pointer identity for `Shared` and `Proxy`, strict equality otherwise.
pub fn identical(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Shared(x), Value::Shared(y)) => x.ptr_eq(y),
        (Value::Proxy(x), Value::Proxy(y)) => x.same(y),
        (Value::Shared(_) | Value::Proxy(_), _) | (_, Value::Shared(_) | Value::Proxy(_)) => false,
        _ => strict_eq(a, b),
    }
}

pub fn strict_eq(a: &Value, b: &Value) -> bool {
    strict_eq_in(a, b, &mut PairPath::default())
}

/// Lenient comparison of `expected` against `actual`.
pub fn lenient_eq(expected: &Value, actual: &Value) -> bool {
    lenient_eq_in(expected, actual, &mut PairPath::default())
}

/// Values a lenient comparison treats as "not specified" inside objects.
pub fn is_default(value: &Value) -> bool {
    is_default_in(value, &mut CellPath::default())
}

/// Pairs of positions being compared while inside a shared cell. Meeting the
/// same pair again means both sides loop in step, which counts as equal.
#[derive(Default)]
struct PairPath(Vec<(usize, usize)>);

impl PairPath {
    fn enter(&mut self, a: &Value, b: &Value, eq: impl FnOnce(&mut Self) -> bool) -> bool {
        let key = (position(a), position(b));
        if self.0.contains(&key) {
            return true;
        }
        self.0.push(key);
        let out = eq(self);
        self.0.pop();
        out
    }
}

fn position(value: &Value) -> usize {
    match value {
        Value::Shared(cell) => cell.addr(),
        other => std::ptr::from_ref(other).addr(),
    }
}

fn strict_eq_in(a: &Value, b: &Value, path: &mut PairPath) -> bool {
    match (a, b) {
        (Value::Shared(x), Value::Shared(y)) if x.ptr_eq(y) => true,
        (Value::Shared(x), _) => {
            path.enter(a, b, |path| x.with(|inner| strict_eq_in(inner, b, path)))
        }
        (_, Value::Shared(y)) => {
            path.enter(a, b, |path| y.with(|inner| strict_eq_in(a, inner, path)))
        }
        (Value::Null, Value::Null) | (Value::Unit, Value::Unit) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        #[allow(clippy::float_cmp)]
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::List(x), Value::List(y)) | (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| strict_eq_in(l, r, path))
        }
        (Value::Set(x), Value::Set(y)) => unordered_eq(x, y, |l, r| strict_eq_in(l, r, path)),
        (Value::Map(x), Value::Map(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| strict_eq_in(v, other, path)))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.type_name == y.type_name
                && x.fields.len() == y.fields.len()
                && x.fields.iter().all(|(k, v)| {
                    y.fields
                        .get(k)
                        .is_some_and(|other| strict_eq_in(v, other, path))
                })
        }
        (Value::Proxy(x), Value::Proxy(y)) => x.same(y),
        _ => false,
    }
}

fn lenient_eq_in(expected: &Value, actual: &Value, path: &mut PairPath) -> bool {
    match (expected, actual) {
        (Value::Shared(x), Value::Shared(y)) if x.ptr_eq(y) => true,
        (Value::Shared(x), _) => path.enter(expected, actual, |path| {
            x.with(|inner| lenient_eq_in(inner, actual, path))
        }),
        (_, Value::Shared(y)) => path.enter(expected, actual, |path| {
            y.with(|inner| lenient_eq_in(expected, inner, path))
        }),
        (Value::List(x), Value::List(y))
        | (Value::Array(x), Value::Array(y))
        | (Value::Set(x), Value::Set(y)) => unordered_eq(x, y, |l, r| lenient_eq_in(l, r, path)),
        (Value::Map(x), Value::Map(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| lenient_eq_in(v, other, path)))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.type_name == y.type_name
                && x.fields.iter().all(|(k, v)| {
                    is_default(v)
                        || y
                            .fields
                            .get(k)
                            .is_some_and(|other| lenient_eq_in(v, other, path))
                })
        }
        _ => strict_eq_in(expected, actual, path),
    }
}

fn is_default_in(value: &Value, path: &mut CellPath) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Int(i) => *i == 0,
        Value::Float(f) => *f == 0.0,
        Value::Str(s) => s.is_empty(),
        Value::Shared(cell) => cell
            .visit(path, |inner, path| is_default_in(inner, path))
            .unwrap_or(false),
        _ => false,
    }
}

/// Multiset equality: every element of `x` pairs with a distinct element of `y`.
fn unordered_eq(x: &[Value], y: &[Value], mut eq: impl FnMut(&Value, &Value) -> bool) -> bool {
    if x.len() != y.len() {
        return false;
    }
    let mut used = vec![false; y.len()];
    x.iter().all(|item| {
        let slot = y
            .iter()
            .enumerate()
            .position(|(i, candidate)| !used[i] && eq(item, candidate));
        slot.is_some_and(|i| {
            used[i] = true;
            true
        })
    })
}
