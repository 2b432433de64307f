#![forbid(unsafe_code)]

//! Composable two-way bindings for UI state.
//!
//! A [`Binding<T>`] is a reference to a piece of mutable state held
//! somewhere else: an object's field, an element of a collection, the
//! payload of an enum case, a weakly-held owner. Consumers read and write
//! through the binding without knowing where the state lives, which lets
//! independently-built components share one source of truth while staying
//! decoupled from the container that owns it.
//!
//! The crate provides:
//!
//! - [`Binding`]: the public handle, with a derivation algebra producing
//!   new bindings to nested fields, enum cases, unwrapped or wrapped
//!   optionals, erased sequences, and weak copies.
//! - [`Location`]: the capability a binding delegates to, implemented by
//!   the storage strategies in [`location`].
//! - [`Lens`] / [`CasePath`]: explicit accessor pairs (with the [`lens!`]
//!   and [`case_path!`] macros) that make every projection statically
//!   checked.
//! - [`Transaction`] / [`Animation`]: write metadata propagated once per
//!   write cascade, with scoped batching via [`with_transaction`] and
//!   [`with_animation`].
//! - [`ThreadSafeBox`]: exclusive storage for owners whose state is also
//!   touched off-thread.
//!
//! # Architecture
//!
//! State ownership is `Rc<RefCell<..>>`, single-threaded, matching the
//! cooperative UI-thread model: no operation suspends, blocks, or notifies.
//! Change notification is the observation layer's concern; this crate
//! guarantees only that after `set` returns, every location in the chain
//! for which the write was not dropped reads the new value.
//!
//! # Invariants
//!
//! 1. Writes are total: every degenerate condition (absent optional,
//!    mismatched case, released weak referent) degrades to a no-op or a
//!    cache-only update, never a panic.
//! 2. Binding equality and hashing are location identity; the transaction
//!    does not participate.
//! 3. One write cascade runs under exactly one transaction context, the
//!    outermost write's, and the context is cleared when that write
//!    returns on every exit path.
//! 4. Derivation never mutates: every operator returns a new binding over
//!    a new location wrapping the old one.

pub mod binding;
pub mod lens;
pub mod location;
pub mod sync;
pub mod transaction;

pub use binding::Binding;
pub use lens::{CasePath, Lens};
pub use location::{AnySequence, Location};
pub use sync::ThreadSafeBox;
pub use transaction::{
    Animation, Curve, Transaction, TransactionKey, with_animation, with_transaction,
};
