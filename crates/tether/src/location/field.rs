#![forbid(unsafe_code)]

//! Field projection over another location.

use core::any::Any;
use core::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::lens::Lens;
use crate::location::{Location, tag};

/// Projects a field out of a base location's value.
///
/// Reads apply the lens to the base's current value. Writes copy the base's
/// value out, apply the lens write, and hand the whole value back, so the
/// write reaches the root through every intermediate strategy.
pub struct FieldLocation<S: Clone + 'static, A> {
    base: Rc<dyn Location<Value = S>>,
    lens: Lens<S, A>,
}

impl<S: Clone + 'static, A> FieldLocation<S, A> {
    pub fn new(base: Rc<dyn Location<Value = S>>, lens: Lens<S, A>) -> Self {
        Self { base, lens }
    }
}

impl<S: Clone + 'static, A: Clone + 'static> Location for FieldLocation<S, A> {
    type Value = A;

    fn get(&self) -> A {
        self.lens.get(&self.base.get())
    }

    fn set(&self, value: A) {
        let mut enclosing = self.base.get();
        self.lens.set(&mut enclosing, value);
        self.base.set(enclosing);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_location(&self, other: &dyn Any) -> bool {
        other
            .downcast_ref::<Self>()
            .is_some_and(|o| self.base.eq_location(o.base.as_any()) && self.lens == o.lens)
    }

    fn location_hash(&self, mut state: &mut dyn Hasher) {
        state.write_u8(tag::FIELD);
        self.base.location_hash(state);
        self.lens.hash(&mut state);
    }
}
