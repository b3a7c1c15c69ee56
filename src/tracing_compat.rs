//! Tracing compatibility layer for structured logging and spans.
//!
//! This module provides a unified interface for tracing that works whether or not
//! the `tracing-integration` feature is enabled:
//!
//! - **With feature enabled**: Re-exports from the `tracing` crate.
//! - **Without feature**: No-op macros that compile to nothing.
//!
//! # Usage
//!
//! ```rust,ignore
//! use promissory::tracing_compat::{debug, trace, debug_span};
//!
//! trace!(promise = %id, "settled");
//! let _span = debug_span!("event_loop", name = %name).entered();
//! ```
//!
//! # Feature Flag
//!
//! ```toml
//! promissory = { version = "0.1", features = ["tracing-integration"] }
//! ```

#[cfg(feature = "tracing-integration")]
pub use tracing::{debug, debug_span, error, trace, warn};

#[cfg(not(feature = "tracing-integration"))]
mod noop {
    //! No-op implementations when tracing is disabled.

    /// No-op trace-level logging macro.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op debug-level logging macro.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op warn-level logging macro.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// No-op error-level logging macro.
    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }

    /// No-op debug_span macro.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::tracing_compat::NoopSpan
        };
    }

    pub use crate::{debug, debug_span, error, trace, warn};
}

#[cfg(not(feature = "tracing-integration"))]
pub use noop::*;

/// A no-op span that does nothing.
///
/// When tracing is disabled, `debug_span!` returns this type so that
/// `span.entered()` keeps compiling.
#[cfg(not(feature = "tracing-integration"))]
#[derive(Debug, Clone, Copy)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing-integration"))]
impl NoopSpan {
    /// Returns self (no-op).
    #[inline]
    #[must_use]
    pub fn entered(self) -> Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;

    fn init_test(test_name: &str) {
        init_test_logging();
        crate::test_phase!(test_name);
    }

    #[test]
    fn test_macros_compile() {
        init_test("test_macros_compile");
        trace!("trace message");
        debug!("debug message");
        warn!("warn message");
        error!("error message");

        trace!(promise = 7, "trace with field");
        debug!(ticks = 42, "debug with field");
        crate::test_complete!("test_macros_compile");
    }

    #[test]
    fn test_span_compile() {
        init_test("test_span_compile");
        let span = debug_span!("event_loop", name = "test");
        let _entered = span.entered();
        crate::test_complete!("test_span_compile");
    }
}
