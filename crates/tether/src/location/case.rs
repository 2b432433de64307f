#![forbid(unsafe_code)]

//! Case projections over tagged unions.
//!
//! Both strategies read as `Option<V>`: the payload while the base holds the
//! projected case, `None` otherwise. Writes only land while the precondition
//! still holds at write time, which makes a stale projection harmless to
//! keep around; a write racing a case switch is dropped, not misapplied.

use core::any::Any;
use core::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::lens::CasePath;
use crate::location::{Location, tag};

/// Projects one case of an enum-valued base.
///
/// Writing `Some(payload)` re-embeds the payload while the base is still in
/// this case. Writing `None` is dropped: the base's type has no way to
/// represent absence.
pub struct CaseLocation<E: Clone + 'static, V> {
    base: Rc<dyn Location<Value = E>>,
    case: CasePath<E, V>,
}

impl<E: Clone + 'static, V> CaseLocation<E, V> {
    pub fn new(base: Rc<dyn Location<Value = E>>, case: CasePath<E, V>) -> Self {
        Self { base, case }
    }
}

impl<E: Clone + 'static, V: Clone + 'static> Location for CaseLocation<E, V> {
    type Value = Option<V>;

    fn get(&self) -> Option<V> {
        self.case.extract(&self.base.get())
    }

    fn set(&self, value: Option<V>) {
        let Some(payload) = value else {
            tracing::trace!(strategy = "case", "base cannot hold None, dropped");
            return;
        };
        if self.case.extract(&self.base.get()).is_some() {
            self.base.set(self.case.embed(payload));
        } else {
            tracing::trace!(strategy = "case", "base left the case, dropped");
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_location(&self, other: &dyn Any) -> bool {
        other
            .downcast_ref::<Self>()
            .is_some_and(|o| self.base.eq_location(o.base.as_any()) && self.case == o.case)
    }

    fn location_hash(&self, mut state: &mut dyn Hasher) {
        state.write_u8(tag::CASE);
        self.base.location_hash(state);
        self.case.hash(&mut state);
    }
}

/// Projects one case of an `Option<E>`-valued base.
///
/// The write-through condition is stricter than [`CaseLocation`]'s: the base
/// must be present and already in the projected case. When it is, writing
/// `Some(payload)` re-embeds and writing `None` clears the base, since
/// absence is representable there.
pub struct OptionalCaseLocation<E: Clone + 'static, V> {
    base: Rc<dyn Location<Value = Option<E>>>,
    case: CasePath<E, V>,
}

impl<E: Clone + 'static, V> OptionalCaseLocation<E, V> {
    pub fn new(base: Rc<dyn Location<Value = Option<E>>>, case: CasePath<E, V>) -> Self {
        Self { base, case }
    }
}

impl<E: Clone + 'static, V: Clone + 'static> Location for OptionalCaseLocation<E, V> {
    type Value = Option<V>;

    fn get(&self) -> Option<V> {
        self.base.get().as_ref().and_then(|e| self.case.extract(e))
    }

    fn set(&self, value: Option<V>) {
        let holds_case = self
            .base
            .get()
            .as_ref()
            .is_some_and(|e| self.case.extract(e).is_some());
        if holds_case {
            self.base.set(value.map(|payload| self.case.embed(payload)));
        } else {
            tracing::trace!(strategy = "optional_case", "base absent or in another case, dropped");
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_location(&self, other: &dyn Any) -> bool {
        other
            .downcast_ref::<Self>()
            .is_some_and(|o| self.base.eq_location(o.base.as_any()) && self.case == o.case)
    }

    fn location_hash(&self, mut state: &mut dyn Hasher) {
        state.write_u8(tag::OPTIONAL_CASE);
        self.base.location_hash(state);
        self.case.hash(&mut state);
    }
}
