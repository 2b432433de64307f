#![forbid(unsafe_code)]

//! Exclusive shared storage for owners whose state is touched from more
//! than one thread.
//!
//! Locations and bindings are single-thread values. When an owner's state
//! must also be reached from other threads, the owner keeps it in a
//! [`ThreadSafeBox`] and exposes bindings over a thread-local mirror, or
//! routes binding writes into [`ThreadSafeBox::with_lock`] itself. The box
//! is the only concurrency-safe primitive in this crate.
//!
//! # Invariants
//!
//! 1. `with_lock` runs its body under exclusive access; the committed value
//!    is whatever the body left behind.
//! 2. The lock releases on every exit path out of `with_lock`, including
//!    unwinding.
//! 3. Acquisition is recursive: a thread already holding the lock can
//!    acquire it again without deadlocking. Overlapping *mutable* access
//!    through nested `with_lock` calls on one box is still a usage error
//!    and is rejected by the interior borrow.

use core::cell::RefCell;
use std::sync::Arc;

use parking_lot::ReentrantMutex;

/// Mutually-exclusive container around a value shared across threads.
///
/// Clones share the same storage.
pub struct ThreadSafeBox<T> {
    inner: Arc<ReentrantMutex<RefCell<T>>>,
}

impl<T> ThreadSafeBox<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(ReentrantMutex::new(RefCell::new(value))),
        }
    }

    /// Acquire exclusive access, run `body` against the current value, and
    /// commit whatever it leaves behind. Returns the body's result.
    pub fn with_lock<R>(&self, body: impl FnOnce(&mut T) -> R) -> R {
        let guard = self.inner.lock();
        let mut value = guard.borrow_mut();
        body(&mut value)
    }

    /// Copy the current value out.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        let guard = self.inner.lock();
        let value = guard.borrow().clone();
        value
    }

    /// Replace the current value.
    pub fn set(&self, value: T) {
        self.with_lock(|slot| *slot = value);
    }
}

impl<T> Clone for ThreadSafeBox<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for ThreadSafeBox<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + core::fmt::Debug> core::fmt::Debug for ThreadSafeBox<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ThreadSafeBox")
            .field("value", &self.get())
            .finish()
    }
}
