//! Error types for the promise core and its run loop.
//!
//! Rejection reasons are *not* errors in this sense: a promise's reason type
//! is chosen by the caller and travels through the reject path untouched.
//! The types here describe failures of the machinery around promises:
//!
//! - **Scheduler**: the loop is gone, already running, or ran dry
//! - **Settlement**: a blocking read found the promise still pending
//! - **Config**: invalid event loop configuration
//!
//! [`Panicked`] is the one reason type this module offers to promises: the
//! guarded continuations reject their child with it when a handler panics.
//!
//! Double settlement is deliberately absent from this list. Resolving or
//! rejecting an already-settled promise is silently ignored.

use core::fmt;
use std::any::Any;
use std::sync::Arc;

use crate::scheduler::config::ConfigError;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // === Scheduler ===
    /// The scheduler referenced by a promise has been dropped.
    SchedulerDropped,
    /// `start` was called on a loop that is already running.
    AlreadyRunning,
    /// The run loop drained its queue without anyone requesting a stop.
    SchedulerStalled,
    /// The per-start tick budget was exhausted before a stop was requested.
    TickBudgetExhausted,

    // === Settlement ===
    /// A blocking read found the promise still pending.
    NotSettled,

    // === Config ===
    /// Configuration value could not be parsed or is out of range.
    InvalidConfig,
}

impl ErrorKind {
    /// Returns the error category for this kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::SchedulerDropped
            | Self::AlreadyRunning
            | Self::SchedulerStalled
            | Self::TickBudgetExhausted => ErrorCategory::Scheduler,
            Self::NotSettled => ErrorCategory::Settlement,
            Self::InvalidConfig => ErrorCategory::Config,
        }
    }
}

/// High-level error category for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Run loop lifecycle failures.
    Scheduler,
    /// Reading a result that is not there yet.
    Settlement,
    /// Configuration failures.
    Config,
}

/// The main error type.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Adds a message to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Attaches an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Returns the error message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns true if the error concerns the run loop.
    #[must_use]
    pub const fn is_scheduler_error(&self) -> bool {
        matches!(self.kind.category(), ErrorCategory::Scheduler)
    }

    /// The scheduler behind a handle no longer exists.
    #[must_use]
    pub fn scheduler_dropped() -> Self {
        Self::new(ErrorKind::SchedulerDropped).with_message("scheduler handle is no longer alive")
    }

    /// The loop ran out of work before a stop was requested.
    #[must_use]
    pub fn stalled(ticks: u64) -> Self {
        Self::new(ErrorKind::SchedulerStalled)
            .with_message(format!("task queue drained after {ticks} ticks without a stop"))
    }

    /// The loop hit its per-start tick budget.
    #[must_use]
    pub fn budget_exhausted(budget: u64) -> Self {
        Self::new(ErrorKind::TickBudgetExhausted)
            .with_message(format!("tick budget of {budget} exhausted before stop"))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::new(ErrorKind::InvalidConfig)
            .with_message(e.to_string())
            .with_source(e)
    }
}

/// A continuation handler panicked instead of returning.
///
/// Carries the panic message when the payload was a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panicked {
    message: String,
}

impl Panicked {
    /// Creates a panic reason with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Extracts a readable message from a caught panic payload.
    #[must_use]
    pub fn from_payload(payload: &(dyn Any + Send)) -> Self {
        if let Some(s) = payload.downcast_ref::<&str>() {
            Self::new(*s)
        } else if let Some(s) = payload.downcast_ref::<String>() {
            Self::new(s.clone())
        } else {
            Self::new("unknown panic")
        }
    }

    /// Returns the panic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Panicked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler panicked: {}", self.message)
    }
}

impl std::error::Error for Panicked {}

/// A specialized Result type for promise machinery.
pub type Result<T> = core::result::Result<T, Error>;
