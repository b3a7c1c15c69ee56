//! Combinators deriving one aggregate promise from many.
//!
//! - [`all`]: every input fulfills, or the first rejection wins
//! - [`all_settled`]: wait for every input, never reject
//! - [`race`]: first input to settle (either way) wins
//! - [`any`]: first fulfillment wins, or every reason once all reject
//!
//! All four take an explicit participant list and the scheduler the
//! aggregate delivers through. They are built only on
//! [`Promise::observe`](crate::Promise::observe) and the aggregate's own
//! write-once settlement: once the aggregate has settled, later input
//! settlements are ignored by the aggregate itself, with no extra guard.

pub mod join;
pub mod race;

pub use join::{all, all_settled};
pub use race::{any, race};

/// Fixed-size result slots filled out of order and released in input order.
#[derive(Debug)]
pub(crate) struct Slots<V> {
    values: Vec<Option<V>>,
    remaining: usize,
}

impl<V> Slots<V> {
    pub(crate) fn new(len: usize) -> Self {
        let mut values = Vec::with_capacity(len);
        values.resize_with(len, || None);
        Self {
            values,
            remaining: len,
        }
    }

    /// Stores `value` at `index`. Returns every value, in slot order, once
    /// the last empty slot has been filled.
    pub(crate) fn fill(&mut self, index: usize, value: V) -> Option<Vec<V>> {
        let slot = self.values.get_mut(index)?;
        if slot.replace(value).is_none() {
            self.remaining -= 1;
        }
        if self.remaining > 0 {
            return None;
        }
        Some(std::mem::take(&mut self.values).into_iter().flatten().collect())
    }
}
