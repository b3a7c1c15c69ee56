//! Join combinators: wait for every input.
//!
//! # Semantics
//!
//! ```text
//! all([p0, p1, ..., pn]):
//!   slots ← [None; n], remaining ← n
//!   on pi fulfilled(v): slots[i] ← v; remaining -= 1
//!                       if remaining == 0: aggregate.resolve(slots)
//!   on pi rejected(e):  aggregate.reject(e)      // first rejection wins
//! ```
//!
//! Values are returned in *input* order regardless of the order in which the
//! inputs settle. An empty input resolves immediately with `vec![]`.
//!
//! [`all_settled`] has the same shape but records each input's
//! [`Settlement`] and never rejects.
//!
//! # Algebraic Laws
//!
//! - Identity: `all([a]) ≃ a.and_then(|v| Next::Value(vec![v]))`
//! - Unit: `all([]) ≃ resolved(vec![])`
//! - Absorption: `all([.., rejected(e), ..])` rejects, with `e` unless an
//!   earlier-delivered input rejected first

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use super::Slots;
use crate::promise::{Promise, Settlement};
use crate::scheduler::SchedulerHandle;
use crate::tracing_compat::trace;

/// Fulfills with every input's value in input order, or rejects with the
/// first rejection delivered.
pub fn all<T, E, I>(scheduler: &SchedulerHandle, promises: I) -> Promise<Vec<T>, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    let promises: Vec<_> = promises.into_iter().collect();
    let aggregate = Promise::new(scheduler);
    trace!(aggregate = %aggregate.id(), inputs = promises.len(), "all attached");
    if promises.is_empty() {
        aggregate.resolve(Vec::new());
        return aggregate;
    }

    let slots = Rc::new(RefCell::new(Slots::new(promises.len())));
    for (index, promise) in promises.iter().enumerate() {
        let on_ok = aggregate.clone();
        let on_err = aggregate.clone();
        let slots = Rc::clone(&slots);
        promise.observe(
            move |value| {
                let complete = slots.borrow_mut().fill(index, value);
                if let Some(values) = complete {
                    on_ok.resolve(values);
                }
            },
            move |reason| {
                on_err.reject(reason);
            },
        );
    }
    aggregate
}

/// Fulfills with every input's settlement in input order once all inputs
/// have settled. Never rejects.
pub fn all_settled<T, E, I>(
    scheduler: &SchedulerHandle,
    promises: I,
) -> Promise<Vec<Settlement<T, E>>, Infallible>
where
    T: Clone + 'static,
    E: Clone + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    let promises: Vec<_> = promises.into_iter().collect();
    let aggregate = Promise::new(scheduler);
    trace!(aggregate = %aggregate.id(), inputs = promises.len(), "all_settled attached");
    if promises.is_empty() {
        aggregate.resolve(Vec::new());
        return aggregate;
    }

    let slots = Rc::new(RefCell::new(Slots::new(promises.len())));
    for (index, promise) in promises.iter().enumerate() {
        let on_ok = aggregate.clone();
        let on_err = aggregate.clone();
        let ok_slots = Rc::clone(&slots);
        let err_slots = Rc::clone(&slots);
        promise.observe(
            move |value| {
                let complete = ok_slots
                    .borrow_mut()
                    .fill(index, Settlement::Resolved(value));
                if let Some(settlements) = complete {
                    on_ok.resolve(settlements);
                }
            },
            move |reason| {
                let complete = err_slots
                    .borrow_mut()
                    .fill(index, Settlement::Rejected(reason));
                if let Some(settlements) = complete {
                    on_err.resolve(settlements);
                }
            },
        );
    }
    aggregate
}
