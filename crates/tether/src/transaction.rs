#![forbid(unsafe_code)]

//! Write metadata and its propagation.
//!
//! A [`Transaction`] is an immutable bag of effects attached to a write:
//! an optional [`Animation`] directive plus arbitrary typed values keyed by
//! [`TransactionKey`] implementations. Bindings carry one and install it as
//! the thread's current transaction for the duration of the outermost write.
//!
//! # Current-transaction lifecycle
//!
//! The current context lives in a thread local with a strict scope: it is
//! installed when an outermost write begins and restored when that call
//! returns, on every exit path including unwinding. Writes that happen while
//! a context is already active (cascading writes, observation callbacks) do
//! not install their own; the outermost write's metadata governs the whole
//! cascade.
//!
//! # Invariants
//!
//! 1. At most one transaction is current per thread at any instant.
//! 2. A nested scope restores the exact previous context on exit, even when
//!    the body unwinds.
//! 3. `Transaction` values are immutable; the builder methods return new
//!    records and never mutate shared state.
//! 4. Cloning a `Transaction` is O(1); the typed-value map is shared.

use core::any::{Any, TypeId};
use core::cell::RefCell;
use core::fmt;
use core::time::Duration;
use std::rc::Rc;

use ahash::AHashMap;

/// Easing shape of an [`Animation`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Curve {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
}

/// Directive describing how a change should be presented.
///
/// The core attaches and propagates directives; interpreting them is the
/// rendering layer's concern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Animation {
    curve: Curve,
    duration: Duration,
    delay: Duration,
}

impl Animation {
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(200);

    #[must_use]
    pub fn new(curve: Curve, duration: Duration) -> Self {
        Self {
            curve,
            duration,
            delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn linear(duration: Duration) -> Self {
        Self::new(Curve::Linear, duration)
    }

    #[must_use]
    pub fn ease_in(duration: Duration) -> Self {
        Self::new(Curve::EaseIn, duration)
    }

    #[must_use]
    pub fn ease_out(duration: Duration) -> Self {
        Self::new(Curve::EaseOut, duration)
    }

    #[must_use]
    pub fn ease_in_out(duration: Duration) -> Self {
        Self::new(Curve::EaseInOut, duration)
    }

    /// Same directive, starting after `delay`.
    #[must_use]
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn curve(&self) -> Curve {
        self.curve
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(Curve::EaseInOut, Self::DEFAULT_DURATION)
    }
}

/// Typed key for extension values carried by a [`Transaction`].
///
/// Implementors are usually uninhabited marker types; the key is the type,
/// the payload is `Value`.
///
/// # Examples
///
/// ```
/// use tether::{Transaction, TransactionKey};
///
/// enum Reason {}
/// impl TransactionKey for Reason {
///     type Value = &'static str;
///     fn default_value() -> &'static str {
///         "unspecified"
///     }
/// }
///
/// let t = Transaction::new().with_value::<Reason>("undo");
/// assert_eq!(t.value::<Reason>(), "undo");
/// assert_eq!(Transaction::new().value::<Reason>(), "unspecified");
/// ```
pub trait TransactionKey: 'static {
    type Value: Clone + 'static;

    /// Returned when a transaction carries no value for this key.
    fn default_value() -> Self::Value;
}

/// Immutable metadata attached to a write.
#[derive(Clone, Default)]
pub struct Transaction {
    animation: Option<Animation>,
    values: Rc<AHashMap<TypeId, Rc<dyn Any>>>,
}

impl Transaction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A new record with the animation directive replaced.
    #[must_use]
    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    #[must_use]
    pub fn animation(&self) -> Option<Animation> {
        self.animation
    }

    /// A new record carrying `value` under key `K`.
    #[must_use]
    pub fn with_value<K: TransactionKey>(mut self, value: K::Value) -> Self {
        Rc::make_mut(&mut self.values).insert(TypeId::of::<K>(), Rc::new(value));
        self
    }

    /// The value stored under `K`, or `K::default_value()`.
    #[must_use]
    pub fn value<K: TransactionKey>(&self) -> K::Value {
        self.values
            .get(&TypeId::of::<K>())
            .and_then(|stored| stored.downcast_ref::<K::Value>())
            .cloned()
            .unwrap_or_else(K::default_value)
    }

    /// The transaction currently governing writes on this thread, if an
    /// outermost write (or [`with_transaction`] scope) is in progress.
    #[must_use]
    pub fn current() -> Option<Transaction> {
        CURRENT.with(|current| current.borrow().clone())
    }

    /// Whether a transaction context is active on this thread.
    #[must_use]
    pub fn is_active() -> bool {
        CURRENT.with(|current| current.borrow().is_some())
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("animation", &self.animation)
            .field("values", &self.values.len())
            .finish()
    }
}

thread_local! {
    static CURRENT: RefCell<Option<Transaction>> = const { RefCell::new(None) };
}

/// RAII scope installing a transaction as current. Restores the previous
/// context on drop, which runs on every exit path including unwinding.
pub(crate) struct TransactionScope {
    previous: Option<Transaction>,
}

impl TransactionScope {
    pub(crate) fn enter(transaction: Transaction) -> Self {
        let previous = CURRENT.with(|current| current.borrow_mut().replace(transaction));
        Self { previous }
    }
}

impl Drop for TransactionScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}

/// Run `body` with `transaction` as the thread's current transaction.
///
/// Every binding write inside `body` sees an active context and applies its
/// state change directly, so `transaction` governs the whole batch. The
/// previous context is restored when `body` returns.
pub fn with_transaction<R>(transaction: Transaction, body: impl FnOnce() -> R) -> R {
    let _scope = TransactionScope::enter(transaction);
    body()
}

/// Shorthand for [`with_transaction`] carrying only an animation directive.
pub fn with_animation<R>(animation: Animation, body: impl FnOnce() -> R) -> R {
    with_transaction(Transaction::new().with_animation(animation), body)
}
