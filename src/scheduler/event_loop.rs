//! Single-threaded FIFO run loop.
//!
//! ```text
//!   schedule(task) ──► [ t0 | t1 | t2 | ... ] ──► start(): pop front, run, repeat
//!                                                   │
//!                     stop() from inside a task ────┘ return Ok(())
//!                     queue empty, no stop ─────────► Err(SchedulerStalled)
//! ```
//!
//! The loop has no I/O or timer sources: once its queue is empty nothing can
//! ever enqueue more work, so `start` reports a stall instead of blocking
//! forever.

use core::fmt;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use super::config::EventLoopConfig;
use super::{Scheduler, SchedulerHandle, Task};
use crate::error::{Error, ErrorKind, Result};
use crate::tracing_compat::{debug, debug_span, trace};

/// A cooperative, single-threaded task queue.
pub struct EventLoop {
    config: EventLoopConfig,
    queue: RefCell<VecDeque<Task>>,
    running: Cell<bool>,
    stop_requested: Cell<bool>,
    ticks: Cell<u64>,
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("name", &self.config.name)
            .field("pending_tasks", &self.pending_tasks())
            .field("running", &self.running.get())
            .field("ticks", &self.ticks.get())
            .finish()
    }
}

/// Clears the running flag even if a task unwinds out of `start`.
struct RunGuard<'a> {
    event_loop: &'a EventLoop,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.event_loop.running.set(false);
        self.event_loop.stop_requested.set(false);
    }
}

impl EventLoop {
    /// Creates a loop with the default configuration.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Self::with_config(EventLoopConfig::default())
    }

    /// Creates a loop with the given configuration.
    #[must_use]
    pub fn with_config(config: EventLoopConfig) -> Rc<Self> {
        Rc::new(Self {
            queue: RefCell::new(VecDeque::with_capacity(config.queue_capacity)),
            config,
            running: Cell::new(false),
            stop_requested: Cell::new(false),
            ticks: Cell::new(0),
        })
    }

    /// Returns a non-owning handle for promises to schedule onto.
    #[must_use]
    pub fn handle(self: &Rc<Self>) -> SchedulerHandle {
        SchedulerHandle::new(self)
    }

    /// Returns the loop configuration.
    #[must_use]
    pub fn config(&self) -> &EventLoopConfig {
        &self.config
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Total tasks run by this loop since creation.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    /// Runs the task at the front of the queue, if any.
    ///
    /// Returns `false` when the queue was empty.
    pub fn tick(&self) -> bool {
        // The borrow ends before the task runs: tasks schedule more tasks.
        let next = self.queue.borrow_mut().pop_front();
        match next {
            Some(task) => {
                self.ticks.set(self.ticks.get() + 1);
                task();
                true
            }
            None => false,
        }
    }

    /// Runs tasks until the queue is empty, including tasks scheduled along
    /// the way. Returns the number of tasks run.
    ///
    /// Stop requests are ignored; this is a driver for tests and embedders
    /// that own the outer loop.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.tick() {
            ran += 1;
        }
        trace!(loop_name = %self.config.name, ran, "run_until_idle drained queue");
        ran
    }
}

impl Scheduler for EventLoop {
    fn schedule(&self, task: Task) {
        self.queue.borrow_mut().push_back(task);
    }

    fn is_running(&self) -> bool {
        self.running.get()
    }

    fn start(&self) -> Result<()> {
        if self.running.get() {
            return Err(Error::new(ErrorKind::AlreadyRunning)
                .with_message(format!("event loop {:?} is already running", self.config.name)));
        }
        let _span = debug_span!("event_loop", name = %self.config.name).entered();
        self.running.set(true);
        self.stop_requested.set(false);
        let _guard = RunGuard { event_loop: self };

        let mut ran: u64 = 0;
        loop {
            if self.stop_requested.get() {
                debug!(ran, "event loop stopped");
                return Ok(());
            }
            if let Some(budget) = self.config.tick_budget {
                if ran >= budget {
                    debug!(ran, budget, "event loop tick budget exhausted");
                    return Err(Error::budget_exhausted(budget));
                }
            }
            if !self.tick() {
                debug!(ran, "event loop stalled with empty queue");
                return Err(Error::stalled(ran));
            }
            ran += 1;
        }
    }

    fn stop(&self) {
        if self.running.get() {
            self.stop_requested.set(true);
        }
    }
}
