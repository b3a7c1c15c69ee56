#![allow(dead_code)]
#![allow(unused_imports)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use promissory::{EventLoop, EventLoopConfig, SchedulerHandle};
use proptest::prelude::ProptestConfig;
use proptest::test_runner::RngSeed;
use std::rc::Rc;
use std::sync::Once;
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();

/// Default seed for property tests when running under CI.
pub const DEFAULT_PROPTEST_SEED: u64 = 0x5EED_5EED;
/// Tick budget for loops built by [`test_loop`].
pub const TEST_TICK_BUDGET: u64 = 100_000;

const PROPTEST_SEED_ENV: &str = "PROMISSORY_PROPTEST_SEED";

/// Build a ProptestConfig with deterministic seed support for CI.
#[must_use]
pub fn test_proptest_config(cases: u32) -> ProptestConfig {
    let mut config = ProptestConfig::with_cases(cases);
    // Honor an existing PROPTEST_RNG_SEED, otherwise apply our own.
    if matches!(config.rng_seed, RngSeed::Random) {
        if let Some(seed) = read_proptest_seed() {
            config.rng_seed = RngSeed::Fixed(seed);
        }
    }
    config
}

fn read_proptest_seed() -> Option<u64> {
    if let Ok(value) = std::env::var(PROPTEST_SEED_ENV) {
        return value.parse::<u64>().ok();
    }
    if std::env::var("CI").is_ok() {
        return Some(DEFAULT_PROPTEST_SEED);
    }
    None
}

/// Initialize test logging with trace-level output.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(false)
            .try_init();
    });
}

/// Create a bounded event loop and a handle onto it.
#[must_use]
pub fn test_loop() -> (Rc<EventLoop>, SchedulerHandle) {
    let event_loop = EventLoop::with_config(
        EventLoopConfig::new()
            .with_name("integration-loop")
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

/// Log a section within a test phase.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        tracing::debug!(section = %$name, "--- {} ---", $name);
    };
}

/// Log test completion with summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info!(
            test = %$name,
            $($key = %$value,)*
            "test completed successfully: {}",
            $name
        );
    };
}

/// Assert that a promise has fulfilled with a specific value.
#[macro_export]
macro_rules! assert_resolved {
    ($promise:expr, $expected:expr) => {
        match $promise.settlement() {
            Some(::promissory::Settlement::Resolved(v)) => assert_eq!(v, $expected),
            other => panic!("expected Resolved, got {other:?}"),
        }
    };
}

/// Assert that a promise has rejected with a specific reason.
#[macro_export]
macro_rules! assert_rejected {
    ($promise:expr, $expected:expr) => {
        match $promise.settlement() {
            Some(::promissory::Settlement::Rejected(e)) => assert_eq!(e, $expected),
            other => panic!("expected Rejected, got {other:?}"),
        }
    };
}
