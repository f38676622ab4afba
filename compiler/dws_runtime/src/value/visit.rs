//! Re-entry guard for walks over shared composite storage.
//!
//! `Add(a, a)` makes an array contain itself, so printing, copying and
//! comparing composites must notice when they reach storage they are
//! already inside.

use std::cell::RefCell;

thread_local! {
    static ACTIVE: RefCell<Vec<*const ()>> = const { RefCell::new(Vec::new()) };
}

/// Marks one storage cell as being walked on this thread.
pub(super) struct Visit(*const ());

impl Visit {
    /// `None` when `storage` is already being walked further up the stack.
    pub(super) fn enter<T>(storage: *const T) -> Option<Visit> {
        let ptr = storage.cast::<()>();
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if active.contains(&ptr) {
                return None;
            }
            active.push(ptr);
            Some(Visit(ptr))
        })
    }
}

impl Drop for Visit {
    fn drop(&mut self) {
        ACTIVE.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(i) = active.iter().rposition(|&p| p == self.0) {
                active.remove(i);
            }
        });
    }
}
