//! Law-style property tests: write-then-read agreement, identity laws,
//! and the optional-unwrap cache contract under arbitrary interleavings of
//! external mutation and binding writes.

#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use proptest::prelude::*;
use tether::{AnySequence, Binding, lens};

#[derive(Clone, Debug, PartialEq)]
struct Model {
    count: i64,
    label: String,
    slot: Option<u32>,
    items: Vec<u32>,
}

fn model() -> Rc<RefCell<Model>> {
    Rc::new(RefCell::new(Model {
        count: 0,
        label: String::new(),
        slot: Some(0),
        items: Vec::new(),
    }))
}

fn hash_of<T: Clone + 'static>(binding: &Binding<T>) -> u64 {
    let mut h = DefaultHasher::new();
    binding.hash(&mut h);
    h.finish()
}

/// One step against an optional-unwrap projection: either the owner
/// mutates underneath it, or the consumer writes through it.
#[derive(Clone, Debug)]
enum Step {
    ExternalSet(u32),
    ExternalClear,
    WriteThrough(u32),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        any::<u32>().prop_map(Step::ExternalSet),
        Just(Step::ExternalClear),
        any::<u32>().prop_map(Step::WriteThrough),
    ]
}

proptest! {
    #[test]
    fn last_write_wins(writes in proptest::collection::vec(any::<i64>(), 1..32)) {
        let owner = model();
        let count = Binding::root(&owner, lens!(Model, count));
        for &value in &writes {
            count.set(value);
        }
        let last = *writes.last().unwrap();
        prop_assert_eq!(count.get(), last);
        prop_assert_eq!(owner.borrow().count, last);
    }

    #[test]
    fn writes_to_one_field_never_leak_into_another(
        counts in proptest::collection::vec(any::<i64>(), 1..16),
        label in ".*",
    ) {
        let owner = model();
        owner.borrow_mut().label = label.clone();
        let count = Binding::root(&owner, lens!(Model, count));
        for &value in &counts {
            count.set(value);
        }
        prop_assert_eq!(&owner.borrow().label, &label);
    }

    #[test]
    fn wrapped_present_writes_round_trip(value in any::<i64>()) {
        let owner = model();
        let optional = Binding::root(&owner, lens!(Model, count)).wrapped();
        optional.set(Some(value));
        prop_assert_eq!(optional.get(), Some(value));
        optional.set(None);
        prop_assert_eq!(optional.get(), Some(value), "None writes drop");
    }

    #[test]
    fn unwrap_cache_matches_the_reference_model(
        steps in proptest::collection::vec(step(), 0..48),
    ) {
        let owner = model();
        let slot = Binding::root(&owner, lens!(Model, slot));
        let projection = slot.unwrapped().expect("seeded with Some(0)");

        // Reference model: the owner's option plus the projection's cache.
        let mut expected_base = Some(0u32);
        let mut expected_cache = 0u32;

        for step in steps {
            match step {
                Step::ExternalSet(v) => {
                    owner.borrow_mut().slot = Some(v);
                    expected_base = Some(v);
                }
                Step::ExternalClear => {
                    owner.borrow_mut().slot = None;
                    expected_base = None;
                }
                Step::WriteThrough(v) => {
                    projection.set(v);
                    expected_cache = v;
                    if expected_base.is_some() {
                        expected_base = Some(v);
                    }
                }
            }
            let expected_read = expected_base.unwrap_or(expected_cache);
            prop_assert_eq!(projection.get(), expected_read);
            // Reading refreshes the cache with any present base value.
            if let Some(v) = expected_base {
                expected_cache = v;
            }
            prop_assert_eq!(owner.borrow().slot, expected_base);
        }
    }

    #[test]
    fn sequence_erasure_is_faithful(items in proptest::collection::vec(any::<u32>(), 0..24)) {
        let owner = model();
        let erased = Binding::root(&owner, lens!(Model, items)).as_any_sequence::<u32>();

        erased.set(items.iter().copied().collect::<AnySequence<u32>>());
        prop_assert_eq!(&owner.borrow().items, &items);

        let view = erased.get();
        prop_assert_eq!(view.len(), items.len());
        prop_assert!(view.iter().eq(items.iter()));
    }

    #[test]
    fn equal_bindings_hash_equal(seed in any::<i64>()) {
        let owner = model();
        owner.borrow_mut().count = seed;
        let count_lens = lens!(Model, count);
        let a = Binding::root(&owner, count_lens.clone());
        let b = Binding::root(&owner, count_lens);

        prop_assert_eq!(&a, &a, "reflexive");
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(&b, &a, "symmetric");
        prop_assert_eq!(hash_of(&a), hash_of(&b));

        let fresh = Binding::root(&owner, lens!(Model, count));
        prop_assert_ne!(&a, &fresh, "independent accessors stay distinct");
    }
}

#[test]
fn equality_is_transitive_across_clones() {
    let owner = model();
    let count_lens = lens!(Model, count);
    let a = Binding::root(&owner, count_lens.clone());
    let b = Binding::root(&owner, count_lens.clone());
    let c = Binding::root(&owner, count_lens);
    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(a, c);
}
