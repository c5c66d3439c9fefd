//! Dynamic values flowing through proxies: arguments, results, and matcher
//! placeholders.
//!
//! Owned variants have value identity: two `Str("a")` values are the same
//! value. [`Value::Shared`] and [`Value::Proxy`] have pointer identity, which is
//! what `same(..)` matchers and the default matcher's exact check observe.

#![allow(missing_docs)]

pub mod clone;
pub mod compare;
pub mod types;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::errors::{MockError, Result};
use crate::proxy::Proxy;

pub use clone::{CloneService, DeepCloner};
pub use types::ValueType;

/// A dynamically typed argument or return value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Unit,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Set(Vec<Value>),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(ObjectValue),
    /// A mutable cell passed by reference; callers may change it after a call.
    Shared(SharedValue),
    Proxy(Proxy),
    /// Stand-in returned by a matcher factory; carries the matcher's slot.
    Placeholder(usize),
}

/// A named record with string-keyed fields.
#[derive(Debug, Clone, Default)]
pub struct ObjectValue {
    pub type_name: String,
    pub fields: BTreeMap<String, Value>,
}

impl ObjectValue {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Shared, mutable cell with pointer identity.
#[derive(Clone)]
pub struct SharedValue(Arc<RwLock<Value>>);

impl SharedValue {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(Arc::new(RwLock::new(value.into())))
    }

    /// Copy of the current contents.
    pub fn get(&self) -> Value {
        self.0.read().clone()
    }

    pub fn set(&self, value: impl Into<Value>) {
        *self.0.write() = value.into();
    }

    /// Mutate the contents in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        f(&mut self.0.write())
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.0.read_recursive())
    }

    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0).addr()
    }

    /// Run `f` on the contents, or return `None` if this cell is already on
    /// `path` (the value graph loops back to it).
    pub(crate) fn visit<R>(
        &self,
        path: &mut CellPath,
        f: impl FnOnce(&Value, &mut CellPath) -> R,
    ) -> Option<R> {
        let addr = self.addr();
        if path.0.contains(&addr) {
            return None;
        }
        path.0.push(addr);
        let out = self.with(|inner| f(inner, path));
        path.0.pop();
        Some(out)
    }
}

impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Shared(")?;
        Value::Shared(self.clone()).write_to(f, &mut CellPath::default())?;
        f.write_str(")")
    }
}

/// Cells entered on the current descent through a value.
#[derive(Debug, Default)]
pub(crate) struct CellPath(Vec<usize>);

impl Value {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Self>,
    {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// Set with duplicates (by strict equality) removed, first occurrence kept.
    pub fn set<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Self>,
    {
        let mut unique: Vec<Self> = Vec::new();
        for item in items {
            let item = item.into();
            if !unique.iter().any(|seen| compare::strict_eq(seen, &item)) {
                unique.push(item);
            }
        }
        Self::Set(unique)
    }

    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Self>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn shared(value: impl Into<Self>) -> (Self, SharedValue) {
        let cell = SharedValue::new(value);
        (Self::Shared(cell.clone()), cell)
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Elements of a list, set or array.
    pub fn as_items(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) | Self::Set(items) | Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub const fn as_proxy(&self) -> Option<&Proxy> {
        match self {
            Self::Proxy(p) => Some(p),
            _ => None,
        }
    }

    /// Unwrap a proxy, typically the chained mock returned mid-chain.
    pub fn into_proxy(self) -> Result<Proxy> {
        match self {
            Self::Proxy(p) => Ok(p),
            other => Err(MockError::NotAProxy {
                value: other.to_string(),
            }),
        }
    }

    /// Contents with any top-level `Shared` cell read out.
    pub fn resolved(&self) -> Self {
        match self {
            Self::Shared(cell) => {
                let mut path = CellPath::default();
                let mut current = cell.clone();
                loop {
                    let Some(inner) = current.visit(&mut path, |inner, _| inner.clone()) else {
                        return Self::Shared(current);
                    };
                    path.0.push(current.addr());
                    match inner {
                        Self::Shared(next) => current = next,
                        other => return other,
                    }
                }
            }
            other => other.clone(),
        }
    }

    /// Short type label for error messages.
    pub fn type_label(&self) -> String {
        self.type_label_in(&mut CellPath::default())
    }

    fn type_label_in(&self, path: &mut CellPath) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Unit => "void".to_string(),
            Self::Bool(_) => "bool".to_string(),
            Self::Int(_) => "int".to_string(),
            Self::Float(_) => "float".to_string(),
            Self::Str(_) => "String".to_string(),
            Self::List(_) => "List".to_string(),
            Self::Set(_) => "Set".to_string(),
            Self::Array(_) => "Array".to_string(),
            Self::Map(_) => "Map".to_string(),
            Self::Object(o) => o.type_name.clone(),
            Self::Shared(cell) => cell
                .visit(path, |inner, path| inner.type_label_in(path))
                .unwrap_or_else(|| "Shared".to_string()),
            Self::Proxy(p) => p.interface().name().to_string(),
            Self::Placeholder(_) => "matcher".to_string(),
        }
    }

    /// Pointer identity for `Shared`/`Proxy`, strict equality otherwise.
    pub fn identical(&self, other: &Self) -> bool {
        compare::identical(self, other)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        compare::strict_eq(self, other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, &mut CellPath::default())
    }
}

impl Value {
    /// Display form; a cell reached again inside itself prints as `<cycle>`.
    fn write_to(&self, f: &mut fmt::Formatter<'_>, path: &mut CellPath) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Unit => f.write_str("()"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(items) | Self::Array(items) => {
                f.write_str("[")?;
                write_joined(f, items, path)?;
                f.write_str("]")
            }
            Self::Set(items) => {
                f.write_str("{")?;
                write_joined(f, items, path)?;
                f.write_str("}")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                write_fields(f, entries, path)?;
                f.write_str("}")
            }
            Self::Object(o) => {
                write!(f, "{}{{", o.type_name)?;
                write_fields(f, &o.fields, path)?;
                f.write_str("}")
            }
            Self::Shared(cell) => cell
                .visit(path, |inner, path| inner.write_to(f, path))
                .unwrap_or_else(|| f.write_str("<cycle>")),
            Self::Proxy(p) => write!(f, "Proxy<{}>", p.name()),
            Self::Placeholder(slot) => write!(f, "<matcher #{slot}>"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Value], path: &mut CellPath) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item.write_to(f, path)?;
    }
    Ok(())
}

fn write_fields(
    f: &mut fmt::Formatter<'_>,
    fields: &BTreeMap<String, Value>,
    path: &mut CellPath,
) -> fmt::Result {
    for (i, (k, v)) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{k}: ")?;
        v.write_to(f, path)?;
    }
    Ok(())
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::Unit
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<Self>> for Value {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}

impl From<ObjectValue> for Value {
    fn from(value: ObjectValue) -> Self {
        Self::Object(value)
    }
}

impl From<SharedValue> for Value {
    fn from(value: SharedValue) -> Self {
        Self::Shared(value)
    }
}

impl From<Proxy> for Value {
    fn from(value: Proxy) -> Self {
        Self::Proxy(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Build a `Vec<Value>` argument list from anything convertible to [`Value`].
///
/// ```rust
/// use chainmock::args;
/// let call = args!["Bob", 3, true];
/// assert_eq!(call.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::value::Value>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$($crate::value::Value::from($arg)),+]
    };
}
