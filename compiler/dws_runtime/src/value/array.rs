//! Shared, mutable array storage.
//!
//! Arrays are reference values: cloning an `ArrayValue` clones the handle,
//! not the elements. Built-ins that mutate (`Add`, `Delete`, `SetLength`,
//! `Reverse`, `Sort`) act on the storage every handle sees. Built-ins that
//! derive an array (`Copy`, `Slice`, `Concat`, `Map`, `Filter`) allocate new
//! storage through `ArrayValue::new` or `copy_storage`.
//!
//! Locks are held only for the duration of a single method call. Callers
//! that need to run script callbacks over the elements take a `snapshot()`
//! first, so a callback may freely touch the same array.

use std::fmt;
use std::sync::Arc;

use dws_types::ArrayType;
use parking_lot::RwLock;

use super::visit::Visit;
use super::Value;

struct ArrayData {
    elements: Vec<Value>,
    array_type: Option<Arc<ArrayType>>,
}

/// Handle to an array's backing sequence and optional type descriptor.
#[derive(Clone)]
pub struct ArrayValue(Arc<RwLock<ArrayData>>);

impl ArrayValue {
    pub fn new(elements: Vec<Value>, array_type: Option<Arc<ArrayType>>) -> Self {
        ArrayValue(Arc::new(RwLock::new(ArrayData {
            elements,
            array_type,
        })))
    }

    /// An array with no type information (e.g. an untyped literal).
    pub fn untyped(elements: Vec<Value>) -> Self {
        ArrayValue::new(elements, None)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.read().elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.read().elements.is_empty()
    }

    /// Element at a 0-based storage offset.
    pub fn get(&self, offset: usize) -> Option<Value> {
        self.0.read().elements.get(offset).cloned()
    }

    /// Overwrite the element at a 0-based storage offset. Returns `false`
    /// when the offset is out of range.
    pub fn set(&self, offset: usize, value: Value) -> bool {
        match self.0.write().elements.get_mut(offset) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Copy of the current elements.
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.read().elements.clone()
    }

    /// Replace every element, keeping the type descriptor.
    pub fn set_elements(&self, elements: Vec<Value>) {
        self.0.write().elements = elements;
    }

    pub fn push(&self, value: Value) {
        self.0.write().elements.push(value);
    }

    /// Remove the element at a 0-based storage offset.
    pub fn remove(&self, offset: usize) -> Option<Value> {
        let mut data = self.0.write();
        (offset < data.elements.len()).then(|| data.elements.remove(offset))
    }

    /// Truncate to `len`, or grow to `len` with values produced by `pad`.
    ///
    /// `pad` is called once per new slot so composite defaults are
    /// independent instances.
    pub fn truncate_or_pad(&self, len: usize, pad: impl FnMut() -> Value) {
        self.0.write().elements.resize_with(len, pad);
    }

    pub fn reverse(&self) {
        self.0.write().elements.reverse();
    }

    pub fn array_type(&self) -> Option<Arc<ArrayType>> {
        self.0.read().array_type.clone()
    }

    /// First valid index: the declared low bound, or 0.
    pub fn low_bound(&self) -> i64 {
        self.0
            .read()
            .array_type
            .as_ref()
            .map_or(0, |ty| ty.low_bound())
    }

    /// `true` only for arrays whose descriptor declares fixed bounds.
    pub fn is_static(&self) -> bool {
        self.0
            .read()
            .array_type
            .as_ref()
            .is_some_and(|ty| ty.is_static())
    }

    /// New backing storage holding the same elements and type descriptor.
    ///
    /// Composite elements are copied as handles.
    pub fn copy_storage(&self) -> ArrayValue {
        let data = self.0.read();
        ArrayValue::new(data.elements.clone(), data.array_type.clone())
    }

    /// Returns `true` if both handles share one backing sequence.
    #[inline]
    pub fn ptr_eq(&self, other: &ArrayValue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(_visit) = Visit::enter(Arc::as_ptr(&self.0)) else {
            return f.write_str("ArrayValue(..)");
        };
        let data = self.0.read();
        f.debug_struct("ArrayValue")
            .field("elements", &data.elements)
            .field("array_type", &data.array_type.as_ref().map(ToString::to_string))
            .finish()
    }
}

/// `[1, 2, 3]`; an array reached again from inside itself prints `[...]`.
impl fmt::Display for ArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(_visit) = Visit::enter(Arc::as_ptr(&self.0)) else {
            return f.write_str("[...]");
        };
        let data = self.0.read();
        f.write_str("[")?;
        for (i, elem) in data.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{elem}")?;
        }
        f.write_str("]")
    }
}
