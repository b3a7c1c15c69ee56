//! Race combinators: first to settle wins.
//!
//! # Semantics
//!
//! ```text
//! race([p0, ..., pn]):
//!   on pi fulfilled(v): aggregate.resolve(v)
//!   on pi rejected(e):  aggregate.reject(e)
//!
//! any([p0, ..., pn]):
//!   on pi fulfilled(v): aggregate.resolve(v)
//!   on pi rejected(e):  reasons[i] ← e
//!                       if every input rejected: aggregate.reject(reasons)
//! ```
//!
//! Losers are not cancelled; there is nothing to cancel. They keep running
//! and their later settlements fall on an aggregate that has already
//! settled, which ignores them.
//!
//! "First" means first *delivered*: deliveries run in scheduler order, so
//! among inputs that are already settled when the race is built, the
//! earliest in the list wins.
//!
//! # Algebraic Laws
//!
//! - Identity: `race([a, never]) ≃ a`
//! - Commutativity: `race([a, b]) ≃ race([b, a])` up to which of two
//!   simultaneously settled inputs wins
//! - `race([]) ≃ never`, while `any([]) ≃ rejected(vec![])`

use std::cell::RefCell;
use std::rc::Rc;

use super::Slots;
use crate::promise::Promise;
use crate::scheduler::SchedulerHandle;
use crate::tracing_compat::{debug, trace};

/// Settles with the outcome of whichever input is delivered first.
///
/// With no inputs the returned promise stays pending forever.
pub fn race<T, E, I>(scheduler: &SchedulerHandle, promises: I) -> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    let aggregate = Promise::new(scheduler);
    let mut inputs = 0_usize;
    for promise in promises {
        let on_ok = aggregate.clone();
        let on_err = aggregate.clone();
        promise.observe(
            move |value| {
                on_ok.resolve(value);
            },
            move |reason| {
                on_err.reject(reason);
            },
        );
        inputs += 1;
    }
    if inputs == 0 {
        debug!(aggregate = %aggregate.id(), "race over no inputs never settles");
    } else {
        trace!(aggregate = %aggregate.id(), inputs, "race attached");
    }
    aggregate
}

/// Fulfills with the first fulfillment delivered, or rejects with every
/// input's reason in input order once all of them have rejected.
///
/// With no inputs the returned promise rejects immediately with `vec![]`.
pub fn any<T, E, I>(scheduler: &SchedulerHandle, promises: I) -> Promise<T, Vec<E>>
where
    T: Clone + 'static,
    E: Clone + 'static,
    I: IntoIterator<Item = Promise<T, E>>,
{
    let promises: Vec<_> = promises.into_iter().collect();
    let aggregate = Promise::new(scheduler);
    trace!(aggregate = %aggregate.id(), inputs = promises.len(), "any attached");
    if promises.is_empty() {
        aggregate.reject(Vec::new());
        return aggregate;
    }

    let reasons = Rc::new(RefCell::new(Slots::new(promises.len())));
    for (index, promise) in promises.iter().enumerate() {
        let on_ok = aggregate.clone();
        let on_err = aggregate.clone();
        let reasons = Rc::clone(&reasons);
        promise.observe(
            move |value| {
                on_ok.resolve(value);
            },
            move |reason| {
                let exhausted = reasons.borrow_mut().fill(index, reason);
                if let Some(reasons) = exhausted {
                    on_err.reject(reasons);
                }
            },
        );
    }
    aggregate
}
