//! The cooperative scheduler contract promises deliver through.
//!
//! A promise never runs continuation callbacks inline. It hands a [`Task`]
//! to a [`Scheduler`], which runs it on a later turn, FIFO relative to other
//! scheduled work. Promises reach their scheduler through a
//! [`SchedulerHandle`], a non-owning reference: a loop is kept alive by
//! whoever drives it, never by the promises queued on it.
//!
//! [`EventLoop`] is the single-threaded reference implementation.

pub mod config;
pub mod event_loop;

pub use config::{ConfigError, EventLoopConfig};
pub use event_loop::EventLoop;

use core::fmt;
use std::rc::{Rc, Weak};

use crate::error::{Error, Result};

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + 'static>;

/// The contract a run loop must provide to drive promise delivery.
pub trait Scheduler {
    /// Enqueues `task` to run on a future turn.
    ///
    /// Must be FIFO with respect to other scheduled tasks and must never run
    /// `task` synchronously from inside this call.
    fn schedule(&self, task: Task);

    /// Returns true while [`start`](Self::start) is executing.
    fn is_running(&self) -> bool;

    /// Runs the loop, blocking the caller until [`stop`](Self::stop) is
    /// invoked from within a scheduled task.
    fn start(&self) -> Result<()>;

    /// Requests that a running loop return from [`start`](Self::start).
    fn stop(&self);
}

/// Non-owning reference to a [`Scheduler`].
///
/// Every promise stores one, and every promise derived from it inherits the
/// same handle.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<dyn Scheduler>,
}

impl SchedulerHandle {
    /// Creates a handle that does not keep `scheduler` alive.
    #[must_use]
    pub fn new<S: Scheduler + 'static>(scheduler: &Rc<S>) -> Self {
        Self {
            inner: Rc::downgrade(scheduler) as Weak<dyn Scheduler>,
        }
    }

    /// Creates a handle from an already type-erased scheduler.
    #[must_use]
    pub fn from_dyn(scheduler: &Rc<dyn Scheduler>) -> Self {
        Self {
            inner: Rc::downgrade(scheduler),
        }
    }

    /// Returns the scheduler if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Rc<dyn Scheduler>> {
        self.inner.upgrade()
    }

    /// Returns true if the scheduler is still alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Returns true if the scheduler is alive and currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.upgrade().is_some_and(|s| s.is_running())
    }

    /// Schedules `task` on the referenced scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::SchedulerDropped`](crate::ErrorKind::SchedulerDropped)
    /// if the scheduler no longer exists; `task` is dropped unrun.
    pub fn schedule(&self, task: Task) -> Result<()> {
        let scheduler = self.upgrade().ok_or_else(Error::scheduler_dropped)?;
        scheduler.schedule(task);
        Ok(())
    }

    /// Requests a stop if the scheduler is still alive.
    pub fn stop(&self) {
        if let Some(scheduler) = self.upgrade() {
            scheduler.stop();
        }
    }
}

impl fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
