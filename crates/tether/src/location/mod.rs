#![forbid(unsafe_code)]

//! Storage strategies behind [`Binding`](crate::Binding).
//!
//! A [`Location`] is the capability a binding delegates to: read the current
//! value, write a new one, compare and hash by identity. Concrete strategies
//! range from a leaf over an owner's field to projections that rewrite a
//! base location's value on the way through.
//!
//! # Totality
//!
//! `set` never fails. When a projection's precondition does not hold at
//! write time, the write degrades instead:
//!
//! | Strategy | Degenerate condition | Outcome |
//! |----------|----------------------|---------|
//! | [`ConstantLocation`] | always | write dropped |
//! | [`OptionalUnwrapLocation`] | base is `None` | cache updated, base untouched |
//! | [`OptionalWrapLocation`] | writing `None` | write dropped |
//! | [`CaseLocation`] | base left the case, or writing `None` | write dropped |
//! | [`OptionalCaseLocation`] | base absent or in another case | write dropped |
//! | [`WeakLocation`] | referent released | write dropped |
//!
//! Dropped writes emit a `tracing` event at trace level and nothing else.
//!
//! # Identity
//!
//! Two locations are equal when they are the same strategy applied to equal
//! bases with the same accessor identity (for leaves: the same owner, or an
//! equal constant). Hashes are consistent with that equality. Composition is
//! tree shaped; a derived location holds exactly one base and can never hold
//! itself or an ancestor, since each derivation only wraps the location it
//! was handed.
//!
//! # Threading
//!
//! Locations are single-thread values, in line with the `Rc<RefCell<..>>`
//! ownership model used throughout. State shared across threads belongs in a
//! [`ThreadSafeBox`](crate::ThreadSafeBox) on the owner's side.

use core::any::{Any, TypeId};
use core::cell::RefCell;
use core::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::lens::Lens;

pub mod case;
pub mod field;
pub mod optional;
pub mod sequence;
pub mod weak;

pub use case::{CaseLocation, OptionalCaseLocation};
pub use field::FieldLocation;
pub use optional::{OptionalUnwrapLocation, OptionalWrapLocation};
pub use sequence::{AnySequence, SequenceLocation};
pub use weak::WeakLocation;

/// Discriminant bytes mixed into every location hash, so two strategies
/// over hash-equal payloads still hash apart.
pub(crate) mod tag {
    pub const ROOT: u8 = 0;
    pub const CONSTANT: u8 = 1;
    pub const FIELD: u8 = 2;
    pub const OPTIONAL_UNWRAP: u8 = 3;
    pub const OPTIONAL_WRAP: u8 = 4;
    pub const CASE: u8 = 5;
    pub const OPTIONAL_CASE: u8 = 6;
    pub const WEAK: u8 = 7;
    pub const SEQUENCE: u8 = 8;
}

/// Read/write capability over a value stored somewhere else.
///
/// Implementations must keep `set` total (degrade, never fail) and keep
/// `eq_location`/`location_hash` consistent with each other. The trait is
/// public so owners with exotic storage can supply their own strategy via
/// [`Binding::from_location`](crate::Binding::from_location).
pub trait Location: 'static {
    /// The value this location reads and writes.
    type Value: Clone + 'static;

    /// Current value.
    fn get(&self) -> Self::Value;

    /// Store a new value, or degrade per the strategy's contract.
    fn set(&self, value: Self::Value);

    /// `self` as `Any`, for cross-instance comparison.
    fn as_any(&self) -> &dyn Any;

    /// Identity comparison against another location of any strategy.
    /// Implementations downcast `other` to their own type and return false
    /// on a strategy or type mismatch.
    fn eq_location(&self, other: &dyn Any) -> bool;

    /// Hash the identity. Must agree with `eq_location`: equal locations
    /// hash equal.
    fn location_hash(&self, state: &mut dyn Hasher);
}

/// Leaf strategy: a field of an owner held behind `Rc<RefCell<..>>`.
///
/// Identity is the owner allocation plus the accessor identity, so two
/// bindings rooted at the same owner with clones of one lens compare equal.
pub struct RootLocation<S, T> {
    owner: Rc<RefCell<S>>,
    lens: Lens<S, T>,
}

impl<S, T> RootLocation<S, T> {
    pub fn new(owner: Rc<RefCell<S>>, lens: Lens<S, T>) -> Self {
        Self { owner, lens }
    }
}

impl<S: 'static, T: Clone + 'static> Location for RootLocation<S, T> {
    type Value = T;

    fn get(&self) -> T {
        self.lens.get(&self.owner.borrow())
    }

    fn set(&self, value: T) {
        self.lens.set(&mut self.owner.borrow_mut(), value);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_location(&self, other: &dyn Any) -> bool {
        other
            .downcast_ref::<Self>()
            .is_some_and(|o| Rc::ptr_eq(&self.owner, &o.owner) && self.lens == o.lens)
    }

    fn location_hash(&self, mut state: &mut dyn Hasher) {
        state.write_u8(tag::ROOT);
        state.write_usize(Rc::as_ptr(&self.owner) as usize);
        self.lens.hash(&mut state);
    }
}

/// Leaf strategy: a fixed value. Reads return it, writes are dropped.
pub struct ConstantLocation<T> {
    value: T,
}

impl<T> ConstantLocation<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone + PartialEq + 'static> Location for ConstantLocation<T> {
    type Value = T;

    fn get(&self) -> T {
        self.value.clone()
    }

    fn set(&self, _value: T) {
        tracing::trace!(strategy = "constant", "write dropped");
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_location(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<Self>().is_some_and(|o| self.value == o.value)
    }

    fn location_hash(&self, mut state: &mut dyn Hasher) {
        // The carried value is not required to be `Hash`; the variant tag
        // and value type are the most that can be mixed in while staying
        // consistent with value equality.
        state.write_u8(tag::CONSTANT);
        TypeId::of::<T>().hash(&mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lens;
    use std::collections::hash_map::DefaultHasher;

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        count: i64,
    }

    fn counter() -> Rc<RefCell<Counter>> {
        Rc::new(RefCell::new(Counter { count: 0 }))
    }

    fn dyn_hash_of(location: &dyn Location<Value = i64>) -> u64 {
        let mut h = DefaultHasher::new();
        location.location_hash(&mut h);
        h.finish()
    }

    #[test]
    fn root_reads_and_writes_the_owner_field() {
        let owner = counter();
        let loc = RootLocation::new(Rc::clone(&owner), lens!(Counter, count));
        assert_eq!(loc.get(), 0);

        loc.set(5);
        assert_eq!(owner.borrow().count, 5);
        assert_eq!(loc.get(), 5);
    }

    #[test]
    fn root_identity_is_owner_plus_accessor() {
        let owner = counter();
        let count = lens!(Counter, count);

        let a = RootLocation::new(Rc::clone(&owner), count.clone());
        let b = RootLocation::new(Rc::clone(&owner), count.clone());
        assert!(a.eq_location(b.as_any()));
        assert_eq!(dyn_hash_of(&a), dyn_hash_of(&b));

        let other_lens = RootLocation::new(Rc::clone(&owner), lens!(Counter, count));
        assert!(!a.eq_location(other_lens.as_any()));

        let other_owner = RootLocation::new(counter(), count);
        assert!(!a.eq_location(other_owner.as_any()));
    }

    #[test]
    fn constant_ignores_writes() {
        let loc = ConstantLocation::new(42i64);
        loc.set(7);
        assert_eq!(loc.get(), 42);
    }

    #[test]
    fn constant_equality_is_value_equality() {
        let a = ConstantLocation::new(1i64);
        let b = ConstantLocation::new(1i64);
        let c = ConstantLocation::new(2i64);
        assert!(a.eq_location(b.as_any()));
        assert!(!a.eq_location(c.as_any()));
        assert_eq!(dyn_hash_of(&a), dyn_hash_of(&b));
    }

    #[test]
    fn strategies_never_compare_equal_across_kinds() {
        let owner = counter();
        let root = RootLocation::new(owner, lens!(Counter, count));
        let constant = ConstantLocation::new(0i64);
        assert!(!root.eq_location(constant.as_any()));
        assert!(!constant.eq_location(root.as_any()));
    }
}
