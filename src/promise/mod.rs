//! Single-resolution promises with deferred continuation delivery.
//!
//! A [`Promise`] is settled at most once, by [`resolve`](Promise::resolve) or
//! [`reject`](Promise::reject). Continuations attached with
//! [`then`](Promise::then), [`and_then`](Promise::and_then),
//! [`catch`](Promise::catch) and [`finally`](Promise::finally) each return a
//! new child promise and are *never* called inline: settlement hands one
//! delivery batch to the scheduler, which runs it on a later turn.
//!
//! # Delivery Model
//!
//! ```text
//!   then(a)  then(b)          resolve(v)                 later turn
//!     │        │                  │                          │
//!     ▼        ▼                  ▼                          ▼
//!   on_resolve: [a, b]  ──swap──► batch [a, b] ──schedule──► a(v), b(v)
//!   on_reject:  [a', b'] ──swap──► (discarded)
//!
//!   then(c) after settlement ──► on_resolve: [c] ──swap──► batch [c] ──► c(v)
//! ```
//!
//! Both callback queues are swapped for empty ones whenever a batch is cut,
//! so a callback fires at most once and only with the result fixed at
//! settlement. A late attach cuts its own batch.
//!
//! # Flattening
//!
//! A handler that returns [`Next::Chain`] does not settle the child with a
//! promise: the child adopts that promise's eventual outcome. Every hop is a
//! separate scheduled batch, so long adoption chains grow the task queue,
//! not the stack.
//!
//! # Panicking Handlers
//!
//! Every callback in a batch runs under `catch_unwind`, so a panic never
//! unwinds out of the scheduler or skips the callbacks queued after it. With
//! [`then_guarded`](Promise::then_guarded) and
//! [`and_then_guarded`](Promise::and_then_guarded) the panic also rejects the
//! child with a [`Panicked`] reason; with the plain continuations the child
//! stays pending.
//!
//! # Example
//!
//! ```
//! use promissory::{EventLoop, Next, Promise};
//!
//! let event_loop = EventLoop::new();
//! let handle = event_loop.handle();
//!
//! let source: Promise<i32, String> = Promise::new(&handle);
//! let doubled = source.and_then(|v| Next::Value(v * 2));
//! source.resolve(21);
//!
//! assert_eq!(doubled.wait_settlement().unwrap().into_result(), Ok(42));
//! ```

mod next;
mod state;
mod wait;

pub use next::{Cleanup, Next};
pub use state::{PromiseId, PromiseState, Settlement};

use core::fmt;
use std::cell::{Cell, RefCell};
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::error::Panicked;
use crate::scheduler::SchedulerHandle;
use crate::tracing_compat::{error, trace, warn};
use state::State;

type Callback<V> = Box<dyn FnOnce(V)>;

struct Inner<T, E> {
    id: PromiseId,
    state: State<T, E>,
    on_resolve: Vec<Callback<T>>,
    on_reject: Vec<Callback<E>>,
    scheduler: SchedulerHandle,
}

/// A single-resolution deferred value.
///
/// `Promise` is a handle: cloning it yields another handle onto the *same*
/// promise. Continuations always create new promises.
pub struct Promise<T, E> {
    inner: Rc<RefCell<Inner<T, E>>>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Promise")
            .field("id", &inner.id)
            .field("state", &inner.state.tag())
            .field("on_resolve", &inner.on_resolve.len())
            .field("on_reject", &inner.on_reject.len())
            .finish()
    }
}

impl<T, E> Promise<T, E> {
    /// Creates a pending promise delivering through `scheduler`.
    #[must_use]
    pub fn new(scheduler: &SchedulerHandle) -> Self {
        let id = PromiseId::next();
        trace!(promise = %id, "promise created");
        Self {
            inner: Rc::new(RefCell::new(Inner {
                id,
                state: State::Pending,
                on_resolve: Vec::new(),
                on_reject: Vec::new(),
                scheduler: scheduler.clone(),
            })),
        }
    }

    /// Returns this promise's id.
    #[must_use]
    pub fn id(&self) -> PromiseId {
        self.inner.borrow().id
    }

    /// Returns the current lifecycle tag.
    #[must_use]
    pub fn state(&self) -> PromiseState {
        self.inner.borrow().state.tag()
    }

    /// Returns true until the promise settles.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.inner.borrow().state, State::Pending)
    }

    /// Returns the scheduler handle this promise (and its children) use.
    #[must_use]
    pub fn scheduler(&self) -> SchedulerHandle {
        self.inner.borrow().scheduler.clone()
    }

    /// Returns true if both handles refer to the same promise.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Creates a promise that is already fulfilled with `value`.
    #[must_use]
    pub fn resolved(scheduler: &SchedulerHandle, value: T) -> Self {
        let promise = Self::new(scheduler);
        promise.resolve(value);
        promise
    }

    /// Creates a promise that is already rejected with `reason`.
    #[must_use]
    pub fn rejected(scheduler: &SchedulerHandle, reason: E) -> Self {
        let promise = Self::new(scheduler);
        promise.reject(reason);
        promise
    }

    /// Fulfills the promise if it is still pending; otherwise does nothing.
    pub fn resolve(&self, value: T) -> &Self {
        self.settle(Settlement::Resolved(value))
    }

    /// Rejects the promise if it is still pending; otherwise does nothing.
    pub fn reject(&self, reason: E) -> &Self {
        self.settle(Settlement::Rejected(reason))
    }

    /// Settles the promise with `settlement` if it is still pending.
    ///
    /// The result is fixed at this moment. Queued callbacks are handed to the
    /// scheduler as one batch; none of them run before this call returns.
    pub fn settle(&self, settlement: Settlement<T, E>) -> &Self {
        {
            let mut inner = self.inner.borrow_mut();
            if !matches!(inner.state, State::Pending) {
                trace!(
                    promise = %inner.id,
                    state = %inner.state.tag(),
                    ignored = %settlement.state(),
                    "settle on settled promise ignored"
                );
                return self;
            }
            trace!(promise = %inner.id, state = %settlement.state(), "promise settled");
            inner.state = State::Settled(settlement);
        }
        self.schedule_delivery();
        self
    }

    /// Settles this promise with `source`'s eventual outcome.
    ///
    /// This is flattening on the producer side: resolving with a promise
    /// instead of a value. A direct `resolve`/`reject` that lands before
    /// `source` settles still wins, since settlement is first-come.
    pub fn adopt(&self, source: &Self) -> &Self {
        if self.ptr_eq(source) {
            warn!(promise = %self.id(), "promise cannot adopt itself; ignored");
            return self;
        }
        trace!(promise = %self.id(), source = %source.id(), "adopting outcome");
        let on_ok = self.clone();
        let on_err = self.clone();
        source.observe(
            move |value| {
                on_ok.resolve(value);
            },
            move |reason| {
                on_err.reject(reason);
            },
        );
        self
    }

    /// Returns a copy of the fixed result, or `None` while pending.
    #[must_use]
    pub fn settlement(&self) -> Option<Settlement<T, E>> {
        match &self.inner.borrow().state {
            State::Pending => None,
            State::Settled(s) => Some(s.clone()),
        }
    }

    /// Attaches raw callbacks, one per branch, without creating a child.
    ///
    /// This is the primitive every continuation and combinator is built on.
    /// Exactly one of the two callbacks runs, on a later scheduler turn, once
    /// the promise settles. If it has already settled, delivery is scheduled
    /// immediately.
    pub fn observe<R, J>(&self, on_fulfilled: R, on_rejected: J)
    where
        R: FnOnce(T) + 'static,
        J: FnOnce(E) + 'static,
    {
        let settled = {
            let mut inner = self.inner.borrow_mut();
            inner.on_resolve.push(Box::new(on_fulfilled));
            inner.on_reject.push(Box::new(on_rejected));
            trace!(
                promise = %inner.id,
                queued = inner.on_resolve.len(),
                "continuation attached"
            );
            !matches!(inner.state, State::Pending)
        };
        // The queues only drain on settlement; a late attach drains itself.
        if settled {
            self.schedule_delivery();
        }
    }

    /// Attaches both handlers and returns the child promise they settle.
    ///
    /// Exactly one handler runs, with the parent's fixed result. Its [`Next`]
    /// decides the child's fate: `Value` resolves it, `Fail` rejects it, and
    /// `Chain` makes it adopt another promise's outcome. If the handler
    /// panics the child stays pending; see [`then_guarded`](Self::then_guarded).
    pub fn then<U, F, R, J>(&self, on_fulfilled: R, on_rejected: J) -> Promise<U, F>
    where
        U: Clone + 'static,
        F: Clone + 'static,
        R: FnOnce(T) -> Next<U, F> + 'static,
        J: FnOnce(E) -> Next<U, F> + 'static,
    {
        let child = Promise::new(&self.scheduler());
        let on_ok = child.clone();
        let on_err = child.clone();
        self.observe(
            move |value| on_ok.continue_with(on_fulfilled(value)),
            move |reason| on_err.continue_with(on_rejected(reason)),
        );
        child
    }

    /// Attaches a fulfillment handler; rejections pass through unchanged.
    pub fn and_then<U, R>(&self, on_fulfilled: R) -> Promise<U, E>
    where
        U: Clone + 'static,
        R: FnOnce(T) -> Next<U, E> + 'static,
    {
        self.then(on_fulfilled, Next::Fail)
    }

    /// Like [`then`](Self::then), but a panicking handler rejects the child.
    ///
    /// The panic is caught where the handler is invoked and converted into
    /// the child's reason type through [`Panicked`].
    pub fn then_guarded<U, F, R, J>(&self, on_fulfilled: R, on_rejected: J) -> Promise<U, F>
    where
        U: Clone + 'static,
        F: Clone + From<Panicked> + 'static,
        R: FnOnce(T) -> Next<U, F> + 'static,
        J: FnOnce(E) -> Next<U, F> + 'static,
    {
        self.then(
            move |value| guard(move || on_fulfilled(value)),
            move |reason| guard(move || on_rejected(reason)),
        )
    }

    /// Like [`and_then`](Self::and_then), but a panicking handler rejects the
    /// child with a [`Panicked`] reason.
    pub fn and_then_guarded<U, R>(&self, on_fulfilled: R) -> Promise<U, E>
    where
        U: Clone + 'static,
        E: From<Panicked>,
        R: FnOnce(T) -> Next<U, E> + 'static,
    {
        self.then_guarded(on_fulfilled, Next::Fail)
    }

    /// Attaches a rejection handler; fulfillments pass through unchanged.
    pub fn catch<F, J>(&self, on_rejected: J) -> Promise<T, F>
    where
        F: Clone + 'static,
        J: FnOnce(E) -> Next<T, F> + 'static,
    {
        self.then(Next::Value, on_rejected)
    }

    /// Runs `on_settled` for its side effects once the parent settles.
    ///
    /// The child always settles with the parent's own outcome. If
    /// `on_settled` returns a promise, the child waits for it to settle
    /// (either way) first, but its outcome is discarded.
    pub fn finally<C, S>(&self, on_settled: S) -> Self
    where
        C: Into<Cleanup>,
        S: FnOnce() -> C + 'static,
    {
        let child = Self::new(&self.scheduler());
        // Only one branch ever fires; both share the single handler.
        let on_ok = Rc::new(Cell::new(Some(on_settled)));
        let on_err = Rc::clone(&on_ok);
        let ok_child = child.clone();
        let err_child = child.clone();
        self.observe(
            move |value| {
                if let Some(handler) = on_ok.take() {
                    let cleanup: Cleanup = handler().into();
                    cleanup.then_resume(move || {
                        ok_child.resolve(value);
                    });
                }
            },
            move |reason| {
                if let Some(handler) = on_err.take() {
                    let cleanup: Cleanup = handler().into();
                    cleanup.then_resume(move || {
                        err_child.reject(reason);
                    });
                }
            },
        );
        child
    }

    fn continue_with(&self, next: Next<T, E>) {
        match next {
            Next::Value(value) => {
                self.resolve(value);
            }
            Next::Fail(reason) => {
                self.reject(reason);
            }
            Next::Chain(source) => {
                self.adopt(&source);
            }
        }
    }

    /// Swaps out both queues and schedules the matching one as one batch.
    fn schedule_delivery(&self) {
        let (scheduler, batch) = {
            let mut inner = self.inner.borrow_mut();
            if matches!(inner.state, State::Pending) {
                return;
            }
            let on_resolve = mem::take(&mut inner.on_resolve);
            let on_reject = mem::take(&mut inner.on_reject);
            let batch: Option<Box<dyn FnOnce()>> = match &inner.state {
                State::Pending => None,
                State::Settled(Settlement::Resolved(value)) => {
                    (!on_resolve.is_empty()).then(|| deliver(inner.id, value.clone(), on_resolve))
                }
                State::Settled(Settlement::Rejected(reason)) => {
                    (!on_reject.is_empty()).then(|| deliver(inner.id, reason.clone(), on_reject))
                }
            };
            (inner.scheduler.clone(), batch)
        };
        let Some(batch) = batch else {
            trace!(promise = %self.id(), "settled with no continuations queued");
            return;
        };
        if scheduler.schedule(batch).is_err() {
            warn!(
                promise = %self.id(),
                "scheduler dropped before delivery; continuations discarded"
            );
        }
    }
}

/// Builds a task that hands `value` to every callback in insertion order.
fn deliver<V: Clone + 'static>(
    id: PromiseId,
    value: V,
    callbacks: Vec<Callback<V>>,
) -> Box<dyn FnOnce()> {
    Box::new(move || {
        let mut callbacks = callbacks.into_iter().peekable();
        while let Some(callback) = callbacks.next() {
            if callbacks.peek().is_some() {
                invoke(id, callback, value.clone());
            } else {
                invoke(id, callback, value);
                break;
            }
        }
    })
}

/// Runs one callback, containing a panic to that callback.
#[cfg_attr(not(feature = "tracing-integration"), allow(unused_variables))]
fn invoke<V>(id: PromiseId, callback: Callback<V>, value: V) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || callback(value))) {
        let reason = Panicked::from_payload(payload.as_ref());
        error!(promise = %id, %reason, "continuation panicked; batch continues");
    }
}

/// Runs a handler, turning a panic into a rejection of its child.
fn guard<U, F, H>(handler: H) -> Next<U, F>
where
    F: From<Panicked>,
    H: FnOnce() -> Next<U, F>,
{
    panic::catch_unwind(AssertUnwindSafe(handler))
        .unwrap_or_else(|payload| Next::Fail(Panicked::from_payload(payload.as_ref()).into()))
}
