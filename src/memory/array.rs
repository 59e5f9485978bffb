//! Shared array storage
//!
//! Arrays are reference values: every [`ArrayRef`] clone points at the same
//! element buffer. A reference may additionally be *intercepted*, in which case
//! element reads and writes made through it are reported to the host (see
//! [`crate::interpreter::host::Intercepted`]). Interception belongs to the
//! reference, not the buffer, so aliases created from an intercepted reference
//! stay intercepted while copies made with `slice()` do not.

use super::value::Value;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct ArrayRef {
    items: Rc<RefCell<Vec<Value>>>,
    intercepted: bool,
}

impl ArrayRef {
    pub fn new(items: Vec<Value>) -> Self {
        ArrayRef {
            items: Rc::new(RefCell::new(items)),
            intercepted: false,
        }
    }

    /// Create an intercepted reference over a fresh buffer
    pub fn intercepted(items: Vec<Value>) -> Self {
        ArrayRef {
            items: Rc::new(RefCell::new(items)),
            intercepted: true,
        }
    }

    pub fn from_numbers(values: &[f64]) -> Self {
        ArrayRef::new(values.iter().copied().map(Value::Number).collect())
    }

    pub fn is_intercepted(&self) -> bool {
        self.intercepted
    }

    /// Whether both references share the same buffer
    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Rc::ptr_eq(&self.items, &other.items)
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn items(&self) -> Ref<'_, Vec<Value>> {
        self.items.borrow()
    }

    /// Copy of the current elements
    pub fn to_vec(&self) -> Vec<Value> {
        self.items.borrow().clone()
    }

    /// Element at `index`, `Undefined` past the end
    pub fn get(&self, index: usize) -> Value {
        self.items.borrow().get(index).cloned().unwrap_or_default()
    }

    /// Store `value` at `index`, growing the array with `undefined` holes when needed
    pub fn set(&self, index: usize, value: Value) {
        let mut items = self.items.borrow_mut();
        if index >= items.len() {
            items.resize(index + 1, Value::Undefined);
        }
        items[index] = value;
    }

    /// Truncate or extend to `len` elements
    pub fn set_len(&self, len: usize) {
        self.items.borrow_mut().resize(len, Value::Undefined);
    }

    pub fn push(&self, value: Value) -> usize {
        let mut items = self.items.borrow_mut();
        items.push(value);
        items.len()
    }

    pub fn pop(&self) -> Value {
        self.items.borrow_mut().pop().unwrap_or_default()
    }

    /// Join elements with `separator`; `null` and `undefined` print as empty
    pub fn join(&self, separator: &str) -> String {
        self.items
            .borrow()
            .iter()
            .map(|v| if v.is_nullish() { String::new() } else { v.to_string() })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_past_end_fills_holes() {
        let array = ArrayRef::from_numbers(&[1.0]);
        array.set(3, Value::Number(4.0));
        assert_eq!(array.len(), 4);
        assert!(matches!(array.get(2), Value::Undefined));
        assert_eq!(array.join(","), "1,,,4");
    }

    #[test]
    fn test_clones_share_buffer() {
        let a = ArrayRef::from_numbers(&[1.0, 2.0]);
        let b = a.clone();
        b.push(Value::Number(3.0));
        assert_eq!(a.len(), 3);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&ArrayRef::new(a.to_vec())));
    }

    #[test]
    fn test_interception_is_per_reference() {
        let plain = ArrayRef::new(Vec::new());
        let watched = ArrayRef::intercepted(Vec::new());
        assert!(!plain.is_intercepted());
        assert!(watched.is_intercepted());
        assert!(watched.clone().is_intercepted());
    }
}
