//! Blocking adapter for a program's synchronous root.
//!
//! [`Promise::wait`] drives the promise's own scheduler until the promise
//! settles. It is meant for `main` or a test body, not for code already
//! running inside a scheduled task: there it is a no-op, because starting a
//! loop from inside itself is not supported.

use std::cell::Cell;
use std::rc::Rc;

use super::{Promise, Settlement};
use crate::error::{Error, ErrorKind, Result};
use crate::tracing_compat::debug;

impl<T, E> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    /// Runs the scheduler until this promise has settled.
    ///
    /// If the scheduler is already running this returns `Ok(())` immediately
    /// without doing anything. Otherwise it attaches a `finally` that stops
    /// the scheduler and then starts it; control returns once that stop has
    /// run. The stop is disarmed when `start` returns, so a `wait` that
    /// failed never stops a later run when its promise finally settles.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::SchedulerDropped`] if the scheduler no longer exists.
    /// - [`ErrorKind::SchedulerStalled`] if the scheduler ran out of work
    ///   before the promise settled.
    /// - [`ErrorKind::TickBudgetExhausted`] if the scheduler's budget ran out.
    pub fn wait(&self) -> Result<()> {
        let handle = self.scheduler();
        let scheduler = handle.upgrade().ok_or_else(Error::scheduler_dropped)?;
        if scheduler.is_running() {
            debug!(promise = %self.id(), "wait inside running scheduler is a no-op");
            return Ok(());
        }
        debug!(promise = %self.id(), state = %self.state(), "waiting for settlement");
        let armed = Rc::new(Cell::new(true));
        let stopper_armed = Rc::clone(&armed);
        let _stopper = self.finally(move || {
            if stopper_armed.get() {
                handle.stop();
            }
        });
        let outcome = scheduler.start();
        armed.set(false);
        outcome
    }

    /// Waits, then returns a copy of the fixed result.
    ///
    /// # Errors
    ///
    /// Everything [`wait`](Self::wait) returns, plus
    /// [`ErrorKind::NotSettled`] if the promise is still pending afterwards,
    /// which happens when called from inside the running scheduler.
    pub fn wait_settlement(&self) -> Result<Settlement<T, E>> {
        self.wait()?;
        self.settlement().ok_or_else(|| {
            Error::new(ErrorKind::NotSettled)
                .with_message(format!("promise {} is still pending", self.id()))
        })
    }
}
