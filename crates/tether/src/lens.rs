#![forbid(unsafe_code)]

//! Reified accessor pairs: [`Lens`] for fields, [`CasePath`] for enum cases.
//!
//! Both types package a read closure and a write closure behind `Rc`, so
//! cloning an accessor is cheap and every clone shares one identity. That
//! identity is what equality and hashing observe: locations derived from
//! clones of one accessor compare equal, locations derived from two
//! independently built accessors do not, even when the closures are
//! textually identical.
//!
//! The [`lens!`] and [`case_path!`] macros cover the common cases (plain
//! field access, single-payload tuple variants). Anything fancier is built
//! with [`Lens::new`] / [`CasePath::new`] directly.
//!
//! # Laws
//!
//! A well-formed `Lens` satisfies the usual round trips:
//!
//! 1. get-after-set: `{ lens.set(&mut s, v); lens.get(&s) == v }`
//! 2. set-after-get: `lens.set(&mut s, lens.get(&s))` leaves `s` unchanged
//!
//! A well-formed `CasePath` satisfies:
//!
//! 1. `path.extract(&path.embed(v)) == Some(v)`
//! 2. whenever `path.extract(&e) == Some(v)`, `path.embed(v) == e`
//!
//! The library trusts these laws; it does not (and cannot) check them.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::rc::Rc;

/// A get/set pair over one part of a larger value.
///
/// `S` is the enclosing value, `A` the focused part. The write side mutates
/// in place; composed locations copy the enclosing value out, apply the
/// write, and hand the result back to their base.
pub struct Lens<S, A> {
    read: Rc<dyn Fn(&S) -> A>,
    write: Rc<dyn Fn(&mut S, A)>,
}

impl<S, A> Lens<S, A> {
    /// Build a lens from a read closure and an in-place write closure.
    pub fn new(read: impl Fn(&S) -> A + 'static, write: impl Fn(&mut S, A) + 'static) -> Self {
        Self {
            read: Rc::new(read),
            write: Rc::new(write),
        }
    }

    /// Read the focused part out of `source`.
    #[must_use]
    pub fn get(&self, source: &S) -> A {
        (self.read)(source)
    }

    /// Write `value` into the focused part of `source`.
    pub fn set(&self, source: &mut S, value: A) {
        (self.write)(source, value);
    }

    /// Identity key for equality and hashing: the addresses of the two
    /// shared closures. Stable across clones, distinct across separately
    /// constructed lenses.
    pub(crate) fn identity(&self) -> (usize, usize) {
        (
            Rc::as_ptr(&self.read) as *const () as usize,
            Rc::as_ptr(&self.write) as *const () as usize,
        )
    }
}

impl<S, A> Clone for Lens<S, A> {
    fn clone(&self) -> Self {
        Self {
            read: Rc::clone(&self.read),
            write: Rc::clone(&self.write),
        }
    }
}

impl<S, A> PartialEq for Lens<S, A> {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl<S, A> Eq for Lens<S, A> {}

impl<S, A> Hash for Lens<S, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl<S, A> fmt::Debug for Lens<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lens").finish_non_exhaustive()
    }
}

/// An extract/embed pair for one variant of a tagged union.
///
/// `extract` returns the variant's payload when the value is currently in
/// that case, `embed` rebuilds the enum from a payload.
pub struct CasePath<E, V> {
    extract: Rc<dyn Fn(&E) -> Option<V>>,
    embed: Rc<dyn Fn(V) -> E>,
}

impl<E, V> CasePath<E, V> {
    /// Build a case path from an extract closure and an embed closure.
    pub fn new(extract: impl Fn(&E) -> Option<V> + 'static, embed: impl Fn(V) -> E + 'static) -> Self {
        Self {
            extract: Rc::new(extract),
            embed: Rc::new(embed),
        }
    }

    /// The payload, when `value` is currently in this case.
    #[must_use]
    pub fn extract(&self, value: &E) -> Option<V> {
        (self.extract)(value)
    }

    /// Rebuild the enum from a payload.
    #[must_use]
    pub fn embed(&self, payload: V) -> E {
        (self.embed)(payload)
    }

    pub(crate) fn identity(&self) -> (usize, usize) {
        (
            Rc::as_ptr(&self.extract) as *const () as usize,
            Rc::as_ptr(&self.embed) as *const () as usize,
        )
    }
}

impl<E, V> Clone for CasePath<E, V> {
    fn clone(&self) -> Self {
        Self {
            extract: Rc::clone(&self.extract),
            embed: Rc::clone(&self.embed),
        }
    }
}

impl<E, V> PartialEq for CasePath<E, V> {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl<E, V> Eq for CasePath<E, V> {}

impl<E, V> Hash for CasePath<E, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl<E, V> fmt::Debug for CasePath<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CasePath").finish_non_exhaustive()
    }
}

/// Create a [`Lens`] focusing a (possibly nested) field.
///
/// The field type must be `Clone`.
///
/// # Examples
///
/// ```
/// # use tether::{lens, Lens};
/// struct Point { x: f64, y: f64 }
/// struct Frame { origin: Point }
///
/// let x: Lens<Point, f64> = lens!(Point, x);
/// let origin_x: Lens<Frame, f64> = lens!(Frame, origin.x);
/// ```
#[macro_export]
macro_rules! lens {
    ($ty:ty, $($field:ident).+) => {
        $crate::lens::Lens::<$ty, _>::new(
            |source: &$ty| source.$($field).+.clone(),
            |source: &mut $ty, value| source.$($field).+ = value,
        )
    };
}

/// Create a [`CasePath`] for a tuple variant with a single payload.
///
/// The payload type must be `Clone`.
///
/// # Examples
///
/// ```
/// # use tether::{case_path, CasePath};
/// #[derive(Clone)]
/// enum Status { Idle, Active(u32) }
///
/// let active: CasePath<Status, u32> = case_path!(Status::Active);
/// assert_eq!(active.extract(&Status::Active(3)), Some(3));
/// assert!(active.extract(&Status::Idle).is_none());
/// ```
#[macro_export]
macro_rules! case_path {
    ($case:path) => {
        $crate::lens::CasePath::new(
            |value| match value {
                $case(payload) => ::core::option::Option::Some(payload.clone()),
                _ => ::core::option::Option::None,
            },
            $case,
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    #[derive(Clone, Debug, PartialEq)]
    struct Point {
        x: f64,
        y: f64,
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Status {
        Idle,
        Active(u32),
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut h = DefaultHasher::new();
        value.hash(&mut h);
        h.finish()
    }

    #[test]
    fn lens_get_after_set() {
        let x = lens!(Point, x);
        let mut p = Point { x: 1.0, y: 2.0 };
        x.set(&mut p, 7.5);
        assert_eq!(x.get(&p), 7.5);
        assert_eq!(p.y, 2.0, "writing x must not disturb y");
    }

    #[test]
    fn lens_set_after_get() {
        let y = lens!(Point, y);
        let mut p = Point { x: 1.0, y: 2.0 };
        let current = y.get(&p);
        y.set(&mut p, current);
        assert_eq!(p, Point { x: 1.0, y: 2.0 });
    }

    #[test]
    fn lens_clones_share_identity() {
        let x = lens!(Point, x);
        let also_x = x.clone();
        assert_eq!(x, also_x);
        assert_eq!(hash_of(&x), hash_of(&also_x));
    }

    #[test]
    fn independent_lenses_are_distinct() {
        let a = lens!(Point, x);
        let b = lens!(Point, x);
        assert_ne!(a, b, "identity is per construction, not per field");
    }

    #[test]
    fn case_path_round_trip() {
        let active = case_path!(Status::Active);
        assert_eq!(active.extract(&active.embed(9)), Some(9));
        assert_eq!(active.embed(9), Status::Active(9));
        assert_eq!(active.extract(&Status::Idle), None);
    }

    #[test]
    fn case_path_identity() {
        let a = case_path!(Status::Active);
        let b = a.clone();
        let c = case_path!(Status::Active);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, c);
    }

    #[test]
    fn hand_written_case_path_for_unit_variant() {
        let idle = CasePath::new(
            |value: &Status| matches!(value, Status::Idle).then_some(()),
            |()| Status::Idle,
        );
        assert_eq!(idle.extract(&Status::Idle), Some(()));
        assert_eq!(idle.extract(&Status::Active(1)), None);
        assert_eq!(idle.embed(()), Status::Idle);
    }
}
