//! Promissory: single-resolution promises with scheduler-driven delivery.
//!
//! # Overview
//!
//! A [`Promise`] is a deferred value that settles exactly once, by
//! fulfillment or rejection. Consumers chain continuations onto it, each of
//! which yields a new promise; combinators derive one promise from many.
//! Nothing here runs a callback inline: every delivery is handed to a
//! [`Scheduler`] and runs on a later turn.
//!
//! # Core Guarantees
//!
//! - **Write-once settlement**: the first `resolve`/`reject` wins; later ones are ignored
//! - **At-most-once delivery**: each continuation runs once, with the fixed result
//! - **Ordered batches**: continuations attached before settlement run in attach order, in one task
//! - **Flattening**: a handler returning a promise settles its child with that promise's outcome
//! - **Non-owning scheduler reference**: promises never keep their loop alive
//!
//! # Module Structure
//!
//! - [`promise`]: The promise state machine, continuations and the blocking `wait` adapter
//! - [`combinator`]: `all`, `all_settled`, `race`, `any`
//! - [`scheduler`]: The scheduler contract, its non-owning handle, and the reference event loop
//! - [`diagnostics`]: Failure records with source-line context, usable as rejection reasons
//! - [`error`]: Error types
//! - [`tracing_compat`]: Logging macros that compile away without `tracing-integration`
//!
//! # Example
//!
//! ```
//! use promissory::{all, EventLoop, Next, Promise, Settlement};
//!
//! let event_loop = EventLoop::new();
//! let handle = event_loop.handle();
//!
//! let a: Promise<i32, String> = Promise::new(&handle);
//! let b = a.and_then(|v| Next::Value(v + 1));
//! let both = all(&handle, [a.clone(), b]);
//! a.resolve(1);
//!
//! assert_eq!(both.wait_settlement().unwrap(), Settlement::Resolved(vec![1, 2]));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_inception)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]

pub mod combinator;
pub mod diagnostics;
pub mod error;
pub mod promise;
pub mod scheduler;
pub mod tracing_compat;

#[cfg(test)]
mod test_utils;

// Re-exports for convenient access to core types
pub use combinator::{all, all_settled, any, race};
pub use diagnostics::{ContextLine, FailureContext};
pub use error::{Error, ErrorCategory, ErrorKind, Panicked, Result};
pub use promise::{Cleanup, Next, Promise, PromiseId, PromiseState, Settlement};
pub use scheduler::{ConfigError, EventLoop, EventLoopConfig, Scheduler, SchedulerHandle, Task};
