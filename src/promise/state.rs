//! Settlement state for a promise.
//!
//! The state is a tagged variant so that "both resolved and rejected" or
//! "settled without a result" cannot be represented:
//!
//! ```text
//!   Pending ──resolve(v)──► Settled(Resolved(v))
//!      │
//!      └─────reject(e)───► Settled(Rejected(e))
//! ```
//!
//! Both settled states are terminal.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PROMISE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier for a promise, used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PromiseId(u64);

impl PromiseId {
    pub(crate) fn next() -> Self {
        Self(NEXT_PROMISE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PromiseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// The fixed outcome of a settled promise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<T, E> {
    /// Fulfilled with a value.
    Resolved(T),
    /// Rejected with a reason.
    Rejected(E),
}

impl<T, E> Settlement<T, E> {
    /// Returns true if this is a fulfillment.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Returns true if this is a rejection.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Returns the observable tag of this settlement.
    #[must_use]
    pub const fn state(&self) -> PromiseState {
        match self {
            Self::Resolved(_) => PromiseState::Resolved,
            Self::Rejected(_) => PromiseState::Rejected,
        }
    }

    /// Converts into a `Result`.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Resolved(v) => Ok(v),
            Self::Rejected(e) => Err(e),
        }
    }

    /// Borrows the contents.
    pub const fn as_ref(&self) -> Settlement<&T, &E> {
        match self {
            Self::Resolved(v) => Settlement::Resolved(v),
            Self::Rejected(e) => Settlement::Rejected(e),
        }
    }
}

impl<T, E> From<Result<T, E>> for Settlement<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Resolved(v),
            Err(e) => Self::Rejected(e),
        }
    }
}

/// Observable lifecycle tag of a promise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromiseState {
    /// Not yet settled.
    Pending,
    /// Fulfilled.
    Resolved,
    /// Rejected.
    Rejected,
}

impl PromiseState {
    /// Returns true for either terminal state.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for PromiseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Resolved => write!(f, "resolved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug)]
pub(crate) enum State<T, E> {
    Pending,
    Settled(Settlement<T, E>),
}

impl<T, E> State<T, E> {
    pub(crate) const fn tag(&self) -> PromiseState {
        match self {
            Self::Pending => PromiseState::Pending,
            Self::Settled(s) => s.state(),
        }
    }
}
