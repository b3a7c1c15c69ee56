//! Blocking adapter tests: driving the loop from a synchronous root.

mod common;
use common::*;

use promissory::{all, ErrorKind, EventLoop, EventLoopConfig, Next, Promise, Scheduler, Settlement};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn wait_drives_a_chain_to_completion() {
    init_test_logging();
    test_phase!("wait_drives_a_chain_to_completion");
    let (event_loop, handle) = test_loop();

    let source: Promise<u32, String> = Promise::new(&handle);
    let producer = source.clone();
    event_loop.schedule(Box::new(move || {
        producer.resolve(20);
    }));
    let answer = source
        .and_then(|v| Next::Value(v + 1))
        .and_then(|v| Next::Value(v * 2));

    let settled = answer.wait_settlement().expect("loop stops on settlement");
    assert_eq!(settled, Settlement::Resolved(42));
    assert!(!event_loop.is_running());
    test_complete!("wait_drives_a_chain_to_completion");
}

#[test]
fn wait_stops_as_soon_as_the_promise_settles() {
    init_test_logging();
    test_phase!("wait_stops_as_soon_as_the_promise_settles");
    let (event_loop, handle) = test_loop();

    let target: Promise<(), ()> = Promise::new(&handle);
    let producer = target.clone();
    event_loop.schedule(Box::new(move || {
        producer.resolve(());
    }));
    let ran_after = Rc::new(Cell::new(false));
    let flag = Rc::clone(&ran_after);
    // Already queued ahead of the delivery that stops the loop.
    event_loop.schedule(Box::new(move || flag.set(true)));
    let straggler = Rc::new(Cell::new(false));

    target.wait().expect("settles");
    assert!(ran_after.get());

    let flag = Rc::clone(&straggler);
    event_loop.schedule(Box::new(move || flag.set(true)));
    assert!(!straggler.get(), "nothing runs once wait has returned");
    assert_eq!(event_loop.pending_tasks(), 1);
    test_complete!("wait_stops_as_soon_as_the_promise_settles");
}

#[test]
fn wait_on_rejection_returns_the_reason() {
    init_test_logging();
    test_phase!("wait_on_rejection_returns_the_reason");
    let (_event_loop, handle) = test_loop();

    let failed = Promise::<i32, &str>::resolved(&handle, 1).and_then(|_| Next::<i32, _>::Fail("nope"));
    let settled = failed.wait_settlement().expect("rejection still settles");
    assert_eq!(settled.into_result(), Err("nope"));
    test_complete!("wait_on_rejection_returns_the_reason");
}

#[test]
fn wait_on_aggregate() {
    init_test_logging();
    test_phase!("wait_on_aggregate");
    let (event_loop, handle) = test_loop();

    let inputs: Vec<Promise<char, ()>> = (0..3).map(|_| Promise::new(&handle)).collect();
    for (promise, value) in inputs.iter().rev().zip(['c', 'b', 'a']) {
        let producer = promise.clone();
        event_loop.schedule(Box::new(move || {
            producer.resolve(value);
        }));
    }
    let joined = all(&handle, inputs);
    assert_eq!(
        joined.wait_settlement().expect("all inputs settle"),
        Settlement::Resolved(vec!['a', 'b', 'c'])
    );
    test_complete!("wait_on_aggregate");
}

#[test]
fn reentrant_wait_does_nothing() {
    init_test_logging();
    test_phase!("reentrant_wait_does_nothing");
    let (event_loop, handle) = test_loop();

    let outer: Promise<i32, ()> = Promise::new(&handle);
    let never: Promise<i32, ()> = Promise::new(&handle);
    let observed = Rc::new(RefCell::new(None));

    let inner = never.clone();
    let slot = Rc::clone(&observed);
    let producer = outer.clone();
    event_loop.schedule(Box::new(move || {
        *slot.borrow_mut() = Some(inner.wait().is_ok() && inner.is_pending());
        producer.resolve(1);
    }));

    assert_eq!(outer.wait_settlement().expect("outer settles"), Settlement::Resolved(1));
    assert_eq!(*observed.borrow(), Some(true));
    test_complete!("reentrant_wait_does_nothing");
}

#[test]
fn wait_reports_stall_when_nothing_can_settle() {
    init_test_logging();
    test_phase!("wait_reports_stall_when_nothing_can_settle");
    let (_event_loop, handle) = test_loop();

    let orphan: Promise<i32, ()> = Promise::new(&handle);
    let err = orphan.wait().expect_err("no producer");
    assert_eq!(err.kind(), ErrorKind::SchedulerStalled);
    assert!(err.is_scheduler_error());
    test_complete!("wait_reports_stall_when_nothing_can_settle");
}

#[test]
fn wait_reports_exhausted_budget() {
    fn spin(event_loop: Rc<EventLoop>) {
        let again = Rc::clone(&event_loop);
        event_loop.schedule(Box::new(move || spin(again)));
    }

    init_test_logging();
    test_phase!("wait_reports_exhausted_budget");
    let event_loop = EventLoop::with_config(EventLoopConfig::new().with_tick_budget(3));
    let handle = event_loop.handle();

    spin(Rc::clone(&event_loop));

    let orphan: Promise<i32, ()> = Promise::new(&handle);
    let err = orphan.wait().expect_err("budget runs out first");
    assert_eq!(err.kind(), ErrorKind::TickBudgetExhausted);
    test_complete!("wait_reports_exhausted_budget");
}

#[test]
fn stalled_wait_leaves_no_stop_behind() {
    init_test_logging();
    test_phase!("stalled_wait_leaves_no_stop_behind");
    let (event_loop, handle) = test_loop();

    let first: Promise<i32, ()> = Promise::new(&handle);
    let err = first.wait().expect_err("nothing produces first");
    assert_eq!(err.kind(), ErrorKind::SchedulerStalled);

    // first settles during the next run, two ticks before second does.
    let second: Promise<i32, ()> = Promise::new(&handle);
    let early = first.clone();
    let late = second.clone();
    let relay = Rc::clone(&event_loop);
    event_loop.schedule(Box::new(move || {
        early.resolve(1);
        relay.schedule(Box::new(move || {
            late.resolve(2);
        }));
    }));

    assert_eq!(
        second.wait_settlement().expect("second settles"),
        Settlement::Resolved(2)
    );
    assert_resolved!(first, 1);
    test_complete!("stalled_wait_leaves_no_stop_behind");
}

#[test]
fn wait_after_loop_dropped() {
    init_test_logging();
    test_phase!("wait_after_loop_dropped");
    let (event_loop, handle) = test_loop();
    let promise: Promise<i32, ()> = Promise::resolved(&handle, 1);
    drop(event_loop);

    let err = promise.wait_settlement().expect_err("loop is gone");
    assert_eq!(err.kind(), ErrorKind::SchedulerDropped);
    assert_eq!(promise.settlement(), Some(Settlement::Resolved(1)));
    test_complete!("wait_after_loop_dropped");
}
