//! Behavior of the type-erased execution policy container.

use parlay::test_utils::{init_test_logging, MockExecutor};
use parlay::{
    ExecutionPolicy, Executor, ExecutorCategory, LaunchPolicy, Parallel, ParallelAsync,
    PolicyKind, Sequential, SequentialAsync, Vectorized, PAR, PAR_ASYNC, SEQ, SEQ_ASYNC, VEC,
};

#[test]
fn get_recovers_the_boxed_value_exactly() {
    init_test_logging();
    let policy = PAR.with_chunk_size(4);
    let handle = ExecutionPolicy::new(policy);

    assert_eq!(handle.kind(), PolicyKind::Parallel);
    assert_eq!(handle.get::<Parallel>(), Some(&policy));
}

#[test]
fn get_on_a_mismatched_kind_is_none_for_every_pair() {
    init_test_logging();
    let handles = [
        ExecutionPolicy::new(SEQ),
        ExecutionPolicy::new(SEQ_ASYNC),
        ExecutionPolicy::new(PAR),
        ExecutionPolicy::new(PAR_ASYNC),
        ExecutionPolicy::new(VEC),
    ];

    for (index, handle) in handles.iter().enumerate() {
        assert_eq!(handle.get::<Sequential>().is_some(), index == 0);
        assert_eq!(handle.get::<SequentialAsync>().is_some(), index == 1);
        assert_eq!(handle.get::<Parallel>().is_some(), index == 2);
        assert_eq!(handle.get::<ParallelAsync>().is_some(), index == 3);
        assert_eq!(handle.get::<Vectorized>().is_some(), index == 4);
    }
}

#[test]
fn kind_matches_the_wrapped_policy() {
    init_test_logging();
    assert_eq!(ExecutionPolicy::new(SEQ).kind(), PolicyKind::Sequential);
    assert_eq!(
        ExecutionPolicy::new(SEQ_ASYNC).kind(),
        PolicyKind::SequentialAsync
    );
    assert_eq!(ExecutionPolicy::new(PAR).kind(), PolicyKind::Parallel);
    assert_eq!(
        ExecutionPolicy::new(PAR_ASYNC).kind(),
        PolicyKind::ParallelAsync
    );
    assert_eq!(ExecutionPolicy::new(VEC).kind(), PolicyKind::Vectorized);
}

#[test]
fn forwarded_async_tag_rewraps_the_result() {
    init_test_logging();
    let handle = ExecutionPolicy::new(SEQ);
    let async_handle = handle.to_async();

    // The original handle is unchanged; the new one holds the converted
    // value.
    assert_eq!(handle.kind(), PolicyKind::Sequential);
    assert_eq!(async_handle.kind(), PolicyKind::SequentialAsync);
    assert_eq!(async_handle.launch_policy(), LaunchPolicy::Async);
    assert!(async_handle.get::<SequentialAsync>().is_some());

    // Chunk size survives the forwarded conversion.
    let chunked = ExecutionPolicy::new(PAR.with_chunk_size(6)).to_async();
    assert_eq!(chunked.chunk_size(), 6);
    assert_eq!(chunked.kind(), PolicyKind::ParallelAsync);

    // Vectorized is a no-op through the handle as well.
    assert_eq!(
        ExecutionPolicy::new(VEC).to_async().kind(),
        PolicyKind::Vectorized
    );
}

#[test]
fn forwarded_rebind_reaches_the_boxed_value() {
    init_test_logging();
    let mock = MockExecutor::new(ExecutorCategory::Parallel);
    let handle = ExecutionPolicy::new(PAR.with_chunk_size(5)).on(&mock);

    assert!(std::ptr::addr_eq(handle.executor(), &mock as &dyn Executor));
    let recovered = handle.get::<Parallel>().expect("kind preserved by rebind");
    assert_eq!(recovered.chunk_size(), 5);
}

#[test]
fn clones_share_and_outlive_the_original() {
    init_test_logging();
    let handle = ExecutionPolicy::new(PAR.with_chunk_size(11));
    let copy = handle.clone();
    drop(handle);

    assert_eq!(copy.kind(), PolicyKind::Parallel);
    assert_eq!(copy.chunk_size(), 11);
    assert_eq!(copy.get::<Parallel>().map(Parallel::chunk_size), Some(11));
}

#[test]
fn launch_policy_and_chunk_size_forward_without_unboxing() {
    init_test_logging();
    assert_eq!(
        ExecutionPolicy::new(SEQ).launch_policy(),
        LaunchPolicy::Sync
    );
    assert_eq!(
        ExecutionPolicy::new(PAR_ASYNC).launch_policy(),
        LaunchPolicy::Async
    );
    assert_eq!(ExecutionPolicy::new(SEQ).chunk_size(), 0);
    assert_eq!(ExecutionPolicy::new(VEC).chunk_size(), 0);
    assert_eq!(
        ExecutionPolicy::new(PAR_ASYNC.with_chunk_size(3)).chunk_size(),
        3
    );
}

#[test]
fn heterogeneous_collections_dispatch_on_kind() {
    init_test_logging();
    let policies: Vec<ExecutionPolicy<'_>> = vec![
        ExecutionPolicy::new(SEQ),
        ExecutionPolicy::new(PAR.with_chunk_size(2)),
        ExecutionPolicy::new(VEC),
        ExecutionPolicy::new(PAR_ASYNC),
    ];

    let async_count = policies
        .iter()
        .filter(|p| p.launch_policy() == LaunchPolicy::Async)
        .count();
    assert_eq!(async_count, 1);

    let chunked: Vec<usize> = policies
        .iter()
        .filter(|p| p.kind().is_chunked())
        .map(ExecutionPolicy::chunk_size)
        .collect();
    assert_eq!(chunked, vec![2, 0]);
}
