//! Deep-clone port used to snapshot arguments and results at call time.

#![allow(missing_docs)]

use super::{SharedValue, Value};

/// Produces an independent copy of a value.
///
/// Snapshots must not observe mutations made to the original after the call.
pub trait CloneService: Send + Sync {
    fn deep_clone(&self, value: &Value) -> Value;
}

/// Default clone service: shared cells are frozen into owned copies of their
/// current contents; proxies are kept as-is since a mock has no state to copy.
///
/// A cell that contains itself, directly or through other cells, is frozen
/// into a fresh cell so the copy keeps the same loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeepCloner;

impl CloneService for DeepCloner {
    fn deep_clone(&self, value: &Value) -> Value {
        Freezer::default().freeze(value)
    }
}

/// Cells whose contents are being copied, with the replacement cell handed
/// out if the copy reached them again.
#[derive(Default)]
struct Freezer {
    open: Vec<(usize, Option<SharedValue>)>,
}

impl Freezer {
    fn freeze(&mut self, value: &Value) -> Value {
        match value {
            Value::Shared(cell) => self.freeze_cell(cell),
            Value::List(items) => Value::List(self.freeze_all(items)),
            Value::Set(items) => Value::Set(self.freeze_all(items)),
            Value::Array(items) => Value::Array(self.freeze_all(items)),
            Value::Map(entries) => Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), self.freeze(v)))
                    .collect(),
            ),
            Value::Object(obj) => {
                let mut copy = obj.clone();
                for field in copy.fields.values_mut() {
                    *field = self.freeze(field);
                }
                Value::Object(copy)
            }
            other => other.clone(),
        }
    }

    fn freeze_all(&mut self, items: &[Value]) -> Vec<Value> {
        items.iter().map(|v| self.freeze(v)).collect()
    }

    fn freeze_cell(&mut self, cell: &SharedValue) -> Value {
        let addr = cell.addr();
        if let Some((_, replacement)) = self.open.iter_mut().find(|(open, _)| *open == addr) {
            let replacement = replacement.get_or_insert_with(|| SharedValue::new(Value::Null));
            return Value::Shared(replacement.clone());
        }
        self.open.push((addr, None));
        let frozen = cell.with(|inner| self.freeze(inner));
        match self.open.pop().and_then(|(_, replacement)| replacement) {
            Some(replacement) => {
                replacement.set(frozen);
                Value::Shared(replacement)
            }
            None => frozen,
        }
    }
}
