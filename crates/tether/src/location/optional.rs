#![forbid(unsafe_code)]

//! Optional unwrap and wrap strategies.
//!
//! [`OptionalUnwrapLocation`] presents a `Location<Value = Option<T>>` as a
//! `Location<Value = T>` by remembering the last value it saw. The cache is
//! what keeps the projection alive after the base goes absent: reads fall
//! back to it, writes keep refreshing it, and the base is only touched while
//! it is still present. A projection can therefore only be constructed from
//! a currently-present base, which seeds the cache.
//!
//! [`OptionalWrapLocation`] is the inverse: a `Location<Value = T>` viewed
//! as `Location<Value = Option<T>>`. Reads are always `Some`; a write of
//! `None` has nowhere to go and is dropped.

use core::any::Any;
use core::cell::RefCell;
use core::hash::Hasher;
use std::rc::Rc;

use crate::location::{Location, tag};

/// Unwraps an optional base, falling back to the last seen value.
///
/// Cache contents never participate in identity; two unwrap projections are
/// equal exactly when their bases are.
pub struct OptionalUnwrapLocation<T: Clone + 'static> {
    base: Rc<dyn Location<Value = Option<T>>>,
    last_seen: RefCell<T>,
}

impl<T: Clone + 'static> OptionalUnwrapLocation<T> {
    /// `seed` is the value present at derivation time.
    pub fn new(base: Rc<dyn Location<Value = Option<T>>>, seed: T) -> Self {
        Self {
            base,
            last_seen: RefCell::new(seed),
        }
    }
}

impl<T: Clone + 'static> Location for OptionalUnwrapLocation<T> {
    type Value = T;

    fn get(&self) -> T {
        match self.base.get() {
            Some(value) => {
                *self.last_seen.borrow_mut() = value.clone();
                value
            }
            None => self.last_seen.borrow().clone(),
        }
    }

    fn set(&self, value: T) {
        *self.last_seen.borrow_mut() = value.clone();
        if self.base.get().is_some() {
            self.base.set(Some(value));
        } else {
            tracing::trace!(strategy = "optional_unwrap", "base absent, cached only");
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_location(&self, other: &dyn Any) -> bool {
        other
            .downcast_ref::<Self>()
            .is_some_and(|o| self.base.eq_location(o.base.as_any()))
    }

    fn location_hash(&self, state: &mut dyn Hasher) {
        state.write_u8(tag::OPTIONAL_UNWRAP);
        self.base.location_hash(state);
    }
}

/// Presents a non-optional base as optional.
pub struct OptionalWrapLocation<T: Clone + 'static> {
    base: Rc<dyn Location<Value = T>>,
}

impl<T: Clone + 'static> OptionalWrapLocation<T> {
    pub fn new(base: Rc<dyn Location<Value = T>>) -> Self {
        Self { base }
    }
}

impl<T: Clone + 'static> Location for OptionalWrapLocation<T> {
    type Value = Option<T>;

    fn get(&self) -> Option<T> {
        Some(self.base.get())
    }

    fn set(&self, value: Option<T>) {
        match value {
            Some(value) => self.base.set(value),
            None => {
                tracing::trace!(strategy = "optional_wrap", "base cannot hold None, dropped");
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_location(&self, other: &dyn Any) -> bool {
        other
            .downcast_ref::<Self>()
            .is_some_and(|o| self.base.eq_location(o.base.as_any()))
    }

    fn location_hash(&self, state: &mut dyn Hasher) {
        state.write_u8(tag::OPTIONAL_WRAP);
        self.base.location_hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lens;
    use crate::location::RootLocation;

    #[derive(Clone, Debug, PartialEq)]
    struct Form {
        draft: Option<String>,
        title: String,
    }

    fn form(draft: Option<&str>) -> Rc<RefCell<Form>> {
        Rc::new(RefCell::new(Form {
            draft: draft.map(str::to_owned),
            title: "untitled".into(),
        }))
    }

    fn draft_location(owner: &Rc<RefCell<Form>>) -> Rc<dyn Location<Value = Option<String>>> {
        Rc::new(RootLocation::new(Rc::clone(owner), lens!(Form, draft)))
    }

    #[test]
    fn unwrap_passes_through_while_present() {
        let owner = form(Some("hello"));
        let unwrap = OptionalUnwrapLocation::new(draft_location(&owner), "hello".into());

        assert_eq!(unwrap.get(), "hello");
        unwrap.set("edited".into());
        assert_eq!(owner.borrow().draft.as_deref(), Some("edited"));
    }

    #[test]
    fn unwrap_falls_back_to_cache_after_base_clears() {
        let owner = form(Some("hello"));
        let unwrap = OptionalUnwrapLocation::new(draft_location(&owner), "hello".into());
        assert_eq!(unwrap.get(), "hello");

        owner.borrow_mut().draft = None;
        assert_eq!(unwrap.get(), "hello", "read keeps the last seen value");

        unwrap.set("offline".into());
        assert_eq!(owner.borrow().draft, None, "absent base stays absent");
        assert_eq!(unwrap.get(), "offline", "the cache still took the write");
    }

    #[test]
    fn unwrap_refreshes_cache_on_read() {
        let owner = form(Some("one"));
        let unwrap = OptionalUnwrapLocation::new(draft_location(&owner), "one".into());

        owner.borrow_mut().draft = Some("two".into());
        assert_eq!(unwrap.get(), "two");

        owner.borrow_mut().draft = None;
        assert_eq!(unwrap.get(), "two", "fallback is the latest observed value");
    }

    #[test]
    fn wrap_reads_are_always_present() {
        let owner = form(None);
        let title: Rc<dyn Location<Value = String>> =
            Rc::new(RootLocation::new(Rc::clone(&owner), lens!(Form, title)));
        let wrapped = OptionalWrapLocation::new(title);

        assert_eq!(wrapped.get().as_deref(), Some("untitled"));

        wrapped.set(Some("named".into()));
        assert_eq!(owner.borrow().title, "named");

        wrapped.set(None);
        assert_eq!(owner.borrow().title, "named", "None writes are dropped");
    }

    #[test]
    fn unwrap_identity_ignores_cache() {
        let owner = form(Some("a"));
        let base = draft_location(&owner);
        let one = OptionalUnwrapLocation::new(Rc::clone(&base), "a".into());
        let two = OptionalUnwrapLocation::new(base, "completely different".into());
        assert!(one.eq_location(two.as_any()));
    }
}
