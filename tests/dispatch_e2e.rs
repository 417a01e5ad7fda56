//! End-to-end dispatch behavior: executor routing, async launches,
//! failure capture, and the serialization boundary.

use parlay::test_utils::{init_test_logging, MockExecutor};
use parlay::{
    DispatchError, Executor, ExecutorCategory, IndexDispatch, Parallel, Policy, PAR, PAR_ASYNC,
    SEQ, SEQ_ASYNC,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn parallel_dispatch_routes_exclusively_through_the_bound_executor() {
    init_test_logging();
    let mock = MockExecutor::new(ExecutorCategory::Parallel);
    let sum = Arc::new(AtomicUsize::new(0));
    let body_sum = Arc::clone(&sum);

    let result = PAR.on(&mock).with_chunk_size(4).for_each_index(16, move |i| {
        body_sum.fetch_add(i, Ordering::Relaxed);
        Ok(())
    });

    assert_eq!(result, Ok(()));
    // 16 indices in chunks of 4: exactly 4 submissions, all on the mock.
    assert_eq!(mock.execution_count(), 4);
    // Every index ran exactly once; double scheduling through another
    // executor would break the sum.
    assert_eq!(sum.load(Ordering::Relaxed), (0..16).sum::<usize>());
}

#[test]
fn chunk_size_rebind_order_does_not_matter() {
    init_test_logging();
    let mock = MockExecutor::new(ExecutorCategory::Parallel);
    let result = PAR
        .with_chunk_size(5)
        .on(&mock)
        .for_each_index(10, |_| Ok(()));
    assert_eq!(result, Ok(()));
    assert_eq!(mock.execution_count(), 2);
}

#[test]
fn sequential_async_returns_a_handle_without_blocking() {
    init_test_logging();
    let started = Arc::new(AtomicUsize::new(0));
    let body_started = Arc::clone(&started);

    let policy = SEQ.to_async();
    assert_eq!(policy.launch_policy(), parlay::LaunchPolicy::Async);

    let handle = policy.for_each_index(4, move |_| {
        body_started.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(50));
        Ok(())
    });

    // The dispatch call returned while the work is still running; four
    // 50ms bodies cannot have finished yet.
    assert!(!handle.is_finished());
    assert_eq!(handle.wait(), Ok(()));
    assert!(handle.is_finished());
    assert_eq!(started.load(Ordering::SeqCst), 4);
}

#[test]
fn parallel_async_schedules_through_a_static_bound_executor() {
    init_test_logging();
    static MOCK: MockExecutor = MockExecutor::new(ExecutorCategory::Parallel);

    let count = Arc::new(AtomicUsize::new(0));
    let body_count = Arc::clone(&count);
    let handle = PAR_ASYNC
        .on(&MOCK)
        .with_chunk_size(2)
        .for_each_index(8, move |_| {
            body_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

    assert_eq!(handle.wait(), Ok(()));
    assert_eq!(MOCK.execution_count(), 4);
    assert_eq!(count.load(Ordering::SeqCst), 8);
}

#[test]
fn async_failure_surfaces_only_when_the_handle_is_observed() {
    init_test_logging();
    let handle = PAR_ASYNC.with_chunk_size(1).for_each_index(4, |i| {
        if i == 3 {
            Err(DispatchError::body("index 3 rejected"))
        } else {
            Ok(())
        }
    });

    // Scheduling itself never reports the failure; observation does.
    assert!(handle.wait_timeout(Duration::from_secs(5)));
    assert_eq!(handle.wait(), Err(DispatchError::body("index 3 rejected")));
}

#[test]
fn panic_in_a_chunk_is_captured_and_reported() {
    init_test_logging();
    let mock = MockExecutor::new(ExecutorCategory::Parallel);
    let visited = Arc::new(AtomicUsize::new(0));
    let body_visited = Arc::clone(&visited);

    let result = PAR.on(&mock).with_chunk_size(1).for_each_index(6, move |i| {
        if i == 2 {
            panic!("boom at 2");
        }
        body_visited.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    match result {
        Err(DispatchError::Panicked { payload }) => {
            assert_eq!(payload.message(), "boom at 2");
        }
        other => panic!("expected Panicked, got {other:?}"),
    }
    // Sibling chunks are not cancelled by the failure.
    assert_eq!(visited.load(Ordering::SeqCst), 5);
    assert_eq!(mock.execution_count(), 6);
}

#[test]
fn sync_parallel_error_propagates_at_the_call_site() {
    init_test_logging();
    let result = PAR.with_chunk_size(2).for_each_index(8, |i| {
        if i >= 6 {
            Err(DispatchError::body(format!("index {i} out of range")))
        } else {
            Ok(())
        }
    });
    assert!(matches!(result, Err(DispatchError::Body { .. })));
}

#[test]
fn dispatch_through_the_default_pool_completes() {
    init_test_logging();
    let count = Arc::new(AtomicUsize::new(0));
    let body_count = Arc::clone(&count);
    let result = PAR.for_each_index(1000, move |_| {
        body_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    });
    assert_eq!(result, Ok(()));
    assert_eq!(count.load(Ordering::Relaxed), 1000);
}

#[test]
fn chunk_size_round_trips_across_the_serialization_boundary() {
    init_test_logging();
    // Originating side: a bound policy with an explicit chunk size.
    let mock = MockExecutor::new(ExecutorCategory::Parallel);
    let local = PAR_ASYNC.on(&mock).with_chunk_size(9);

    // Only the chunk size crosses the wire; executor state never does.
    let wire = serde_json::to_string(&local).expect("serialize");
    assert_eq!(wire, r#"{"chunk_size":9}"#);

    // Simulated remote side: the numeric value round-trips exactly and
    // the policy resolves to the local default executor.
    let remote: parlay::ParallelAsync<'_> = serde_json::from_str(&wire).expect("deserialize");
    assert_eq!(remote.chunk_size(), 9);
    assert!(std::ptr::addr_eq(
        remote.executor(),
        parlay::default_parallel() as &dyn Executor
    ));

    // The sync kind serializes the same way.
    let sync_wire = serde_json::to_string(&PAR.with_chunk_size(9)).expect("serialize");
    let sync_remote: Parallel<'_> = serde_json::from_str(&sync_wire).expect("deserialize");
    assert_eq!(sync_remote.chunk_size(), 9);
}

#[test]
fn sequential_async_default_executor_is_sequential() {
    init_test_logging();
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    let body_order = Arc::clone(&order);

    let handle = SEQ_ASYNC.for_each_index(5, move |i| {
        if let Ok(mut order) = body_order.lock() {
            order.push(i);
        }
        Ok(())
    });

    assert_eq!(handle.wait(), Ok(()));
    // Sequenced execution: indices observed in order.
    assert_eq!(*order.lock().expect("order"), vec![0, 1, 2, 3, 4]);
}
