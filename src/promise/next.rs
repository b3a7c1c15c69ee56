//! Continuation return types.
//!
//! A `then`/`and_then`/`catch` handler returns a [`Next`], which decides how
//! the child promise settles. A `finally` handler returns a [`Cleanup`],
//! which can only delay the child, never change its outcome.

use std::cell::Cell;
use std::rc::Rc;

use super::Promise;

/// How a continuation handler settles the promise it feeds.
#[derive(Debug)]
pub enum Next<T, E> {
    /// Resolve the child with this value.
    Value(T),
    /// Reject the child with this reason.
    ///
    /// This is how a handler fails synchronously.
    Fail(E),
    /// Settle the child with whatever this promise eventually produces.
    Chain(Promise<T, E>),
}

impl<T, E> From<Result<T, E>> for Next<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Value(v),
            Err(e) => Self::Fail(e),
        }
    }
}

impl<T, E> From<Promise<T, E>> for Next<T, E> {
    fn from(promise: Promise<T, E>) -> Self {
        Self::Chain(promise)
    }
}

type Resume = Box<dyn FnOnce()>;

/// What a `finally` handler returns.
///
/// Either nothing, or a promise of any type whose settlement (either branch)
/// the child waits for before propagating the parent's original outcome.
pub struct Cleanup {
    pending: Option<Box<dyn FnOnce(Resume)>>,
}

impl Cleanup {
    /// No side-effect promise to wait for.
    #[must_use]
    pub fn done() -> Self {
        Self { pending: None }
    }

    /// Returns true if this cleanup waits on a promise.
    #[must_use]
    pub fn is_deferred(&self) -> bool {
        self.pending.is_some()
    }

    /// Runs `resume` now, or once the awaited promise settles.
    pub(crate) fn then_resume(self, resume: impl FnOnce() + 'static) {
        match self.pending {
            None => resume(),
            Some(attach) => attach(Box::new(resume)),
        }
    }
}

impl core::fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Cleanup")
            .field("deferred", &self.is_deferred())
            .finish()
    }
}

impl From<()> for Cleanup {
    fn from((): ()) -> Self {
        Self::done()
    }
}

impl<U, F> From<Promise<U, F>> for Cleanup
where
    U: Clone + 'static,
    F: Clone + 'static,
{
    fn from(promise: Promise<U, F>) -> Self {
        Self {
            pending: Some(Box::new(move |resume: Resume| {
                // Only one branch ever fires; both share the single resume.
                let on_ok = Rc::new(Cell::new(Some(resume)));
                let on_err = Rc::clone(&on_ok);
                promise.observe(
                    move |_| {
                        if let Some(resume) = on_ok.take() {
                            resume();
                        }
                    },
                    move |_| {
                        if let Some(resume) = on_err.take() {
                            resume();
                        }
                    },
                );
            })),
        }
    }
}

impl<U, F> From<Option<Promise<U, F>>> for Cleanup
where
    U: Clone + 'static,
    F: Clone + 'static,
{
    fn from(promise: Option<Promise<U, F>>) -> Self {
        promise.map_or_else(Self::done, Self::from)
    }
}
