#![forbid(unsafe_code)]

//! The public two-way handle, [`Binding`].
//!
//! A binding pairs a [`Location`] with a [`Transaction`] and exposes the
//! derivation algebra: from one binding you can project a nested field, a
//! specific enum case, an unwrapped or wrapped optional, a type-erased
//! sequence view, or a weakly-held copy, and every derived binding writes
//! back through the chain to wherever the state actually lives.
//!
//! # Usage
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use tether::{Binding, lens};
//!
//! struct Model {
//!     count: i64,
//! }
//!
//! let owner = Rc::new(RefCell::new(Model { count: 0 }));
//! let count = Binding::root(&owner, lens!(Model, count));
//!
//! count.set(5);
//! assert_eq!(owner.borrow().count, 5);
//! assert_eq!(count.get(), 5);
//! ```
//!
//! # Invariants
//!
//! 1. A binding is a value: derivation returns a new binding, never mutates
//!    `self`, and no binding owns the state it points at.
//! 2. `set` is total. When a projection's precondition fails at write time
//!    the write degrades (see the table in [`location`](crate::location)).
//! 3. Equality and hashing delegate to the location; the transaction is not
//!    part of identity.
//! 4. One write cascade, one transaction: the outermost `set` installs its
//!    binding's transaction, nested writes triggered by it inherit that
//!    context instead of installing their own.
//! 5. Derived bindings inherit the transaction of the binding they were
//!    derived from.

use core::cell::RefCell;
use core::fmt;
use core::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::lens::{CasePath, Lens};
use crate::location::{
    AnySequence, CaseLocation, ConstantLocation, FieldLocation, Location, OptionalCaseLocation,
    OptionalUnwrapLocation, OptionalWrapLocation, RootLocation, SequenceLocation, WeakLocation,
};
use crate::transaction::{Animation, Transaction, TransactionScope};

/// Two-way reference to state owned elsewhere.
///
/// See the [module docs](self) for the derivation algebra and the identity
/// and transaction rules.
pub struct Binding<T: Clone + 'static> {
    location: Rc<dyn Location<Value = T>>,
    transaction: Transaction,
}

impl<T: Clone + 'static> Binding<T> {
    /// Wrap an arbitrary location. This is the escape hatch for owners with
    /// storage strategies the built-in constructors do not cover.
    #[must_use]
    pub fn from_location(location: Rc<dyn Location<Value = T>>) -> Self {
        Self {
            location,
            transaction: Transaction::new(),
        }
    }

    /// Bind a field of an owner held behind `Rc<RefCell<..>>`.
    #[must_use]
    pub fn root<S: 'static>(owner: &Rc<RefCell<S>>, lens: Lens<S, T>) -> Self {
        Self::from_location(Rc::new(RootLocation::new(Rc::clone(owner), lens)))
    }

    /// A binding that always reads `value` and drops writes.
    #[must_use]
    pub fn constant(value: T) -> Self
    where
        T: PartialEq,
    {
        Self::from_location(Rc::new(ConstantLocation::new(value)))
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.location.get()
    }

    /// Store a new value.
    ///
    /// When no transaction context is active on this thread, this binding's
    /// transaction is installed around the underlying write, so cascading
    /// writes and observation callbacks see it via
    /// [`Transaction::current`]. When a context is already active, the
    /// state change is applied directly under that outer context.
    pub fn set(&self, value: T) {
        if Transaction::is_active() {
            self.location.set(value);
        } else {
            let _scope = TransactionScope::enter(self.transaction.clone());
            self.location.set(value);
        }
    }

    /// The transaction this binding attaches to outermost writes.
    #[must_use]
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Same location, different transaction.
    #[must_use]
    pub fn with_transaction(&self, transaction: Transaction) -> Self {
        Self {
            location: Rc::clone(&self.location),
            transaction,
        }
    }

    /// Same location, transaction replaced by one carrying `animation`.
    #[must_use]
    pub fn with_animation(&self, animation: Animation) -> Self {
        self.with_transaction(self.transaction.clone().with_animation(animation))
    }

    /// Derive a binding to a nested field.
    #[must_use]
    pub fn field<A: Clone + 'static>(&self, lens: Lens<T, A>) -> Binding<A> {
        self.derive(FieldLocation::new(Rc::clone(&self.location), lens))
    }

    /// Derive a binding to one case of this tagged-union value. Reads are
    /// `Some(payload)` while the value is in that case; writes land only
    /// while it still is.
    #[must_use]
    pub fn case<V: Clone + 'static>(&self, case: CasePath<T, V>) -> Binding<Option<V>> {
        self.derive(CaseLocation::new(Rc::clone(&self.location), case))
    }

    /// View this binding as optional. Reads are always `Some`; writes of
    /// `None` are dropped.
    #[must_use]
    pub fn wrapped(&self) -> Binding<Option<T>> {
        self.derive(OptionalWrapLocation::new(Rc::clone(&self.location)))
    }

    /// Derive a binding that holds its base weakly. Reads return the live
    /// value while the base survives, then the last observed value; writes
    /// are dropped once the base is gone.
    ///
    /// The base location is kept alive by this binding's siblings, not by
    /// the weak derivation itself.
    #[must_use]
    pub fn weak(&self) -> Binding<T> {
        let seed = self.location.get();
        self.derive(WeakLocation::new(Rc::downgrade(&self.location), seed))
    }

    fn derive<A: Clone + 'static>(&self, location: impl Location<Value = A>) -> Binding<A> {
        Binding {
            location: Rc::new(location),
            transaction: self.transaction.clone(),
        }
    }
}

impl<T: Clone + 'static> Binding<Option<T>> {
    /// Derive a non-optional binding from a currently-present optional.
    ///
    /// Returns `None` when the value is absent right now: there is nothing
    /// to seed the projection's fallback with, and callers are expected to
    /// branch rather than hold a broken binding. The derived binding stays
    /// usable even if the base later becomes absent; reads then return the
    /// last seen value and writes update only that fallback.
    #[must_use]
    pub fn unwrapped(&self) -> Option<Binding<T>> {
        let seed = self.location.get()?;
        Some(self.derive(OptionalUnwrapLocation::new(Rc::clone(&self.location), seed)))
    }

    /// Derive a binding to one case of the enum inside this optional.
    /// Writes land only while the value is present and in that case;
    /// writing `None` then clears the base.
    #[must_use]
    pub fn inner_case<V: Clone + 'static>(&self, case: CasePath<T, V>) -> Binding<Option<V>> {
        self.derive(OptionalCaseLocation::new(Rc::clone(&self.location), case))
    }
}

impl<C: Clone + 'static> Binding<C> {
    /// Erase the concrete sequence type behind an ordered-collection view.
    ///
    /// Reads copy the collection out into an [`AnySequence`]; writing a
    /// (possibly mutated) view rebuilds the concrete collection. See
    /// [`location::sequence`](crate::location::sequence) for the snapshot
    /// semantics.
    #[must_use]
    pub fn as_any_sequence<T>(&self) -> Binding<AnySequence<T>>
    where
        C: IntoIterator<Item = T> + FromIterator<T>,
        T: Clone + 'static,
    {
        self.derive(SequenceLocation::new(Rc::clone(&self.location)))
    }
}

impl<T: Clone + 'static> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            location: Rc::clone(&self.location),
            transaction: self.transaction.clone(),
        }
    }
}

impl<T: Clone + 'static> PartialEq for Binding<T> {
    fn eq(&self, other: &Self) -> bool {
        self.location.eq_location(other.location.as_any())
    }
}

impl<T: Clone + 'static> Eq for Binding<T> {}

impl<T: Clone + 'static> Hash for Binding<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.location.location_hash(state);
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("value", &self.get())
            .finish()
    }
}
