//! Test utilities for unit tests.
//!
//! - Consistent tracing-based logging initialization
//! - Phase/completion macros for readable test output
//! - Event loop constructors

use crate::scheduler::{EventLoop, EventLoopConfig, SchedulerHandle};
use std::rc::Rc;
use std::sync::Once;
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();

/// Tick budget used by [`test_loop`] so a runaway test fails instead of hanging.
pub const TEST_TICK_BUDGET: u64 = 10_000;

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .try_init();
    });
}

/// Create an event loop with a test tick budget, plus a handle onto it.
#[must_use]
pub fn test_loop() -> (Rc<EventLoop>, SchedulerHandle) {
    let event_loop = EventLoop::with_config(
        EventLoopConfig::new()
            .with_name("test-loop")
            .with_tick_budget(TEST_TICK_BUDGET),
    );
    let handle = event_loop.handle();
    (event_loop, handle)
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log test completion.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
}
