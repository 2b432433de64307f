#![forbid(unsafe_code)]

//! Non-owning projection with a cached fallback.

use core::any::Any;
use core::cell::RefCell;
use core::hash::Hasher;
use std::rc::Weak;

use crate::location::{Location, tag};

/// Holds its base weakly and remembers the last value read or written
/// through it.
///
/// While the base is alive, reads and writes pass straight through (reads
/// refresh the cache). Once every strong reference to the base is gone,
/// reads return the last observed value and writes are dropped. The cache
/// never participates in identity; equality is base pointer identity.
pub struct WeakLocation<T: Clone + 'static> {
    base: Weak<dyn Location<Value = T>>,
    last_seen: RefCell<T>,
}

impl<T: Clone + 'static> WeakLocation<T> {
    /// `seed` is the base's value at derivation time.
    pub fn new(base: Weak<dyn Location<Value = T>>, seed: T) -> Self {
        Self {
            base,
            last_seen: RefCell::new(seed),
        }
    }
}

impl<T: Clone + 'static> Location for WeakLocation<T> {
    type Value = T;

    fn get(&self) -> T {
        match self.base.upgrade() {
            Some(base) => {
                let value = base.get();
                *self.last_seen.borrow_mut() = value.clone();
                value
            }
            None => self.last_seen.borrow().clone(),
        }
    }

    fn set(&self, value: T) {
        match self.base.upgrade() {
            Some(base) => {
                *self.last_seen.borrow_mut() = value.clone();
                base.set(value);
            }
            None => {
                tracing::trace!(strategy = "weak", "referent released, dropped");
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_location(&self, other: &dyn Any) -> bool {
        other
            .downcast_ref::<Self>()
            .is_some_and(|o| Weak::ptr_eq(&self.base, &o.base))
    }

    fn location_hash(&self, state: &mut dyn Hasher) {
        state.write_u8(tag::WEAK);
        state.write_usize(self.base.as_ptr() as *const () as usize);
    }
}
