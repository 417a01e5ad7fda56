//! Index-space dispatch through execution policies.
//!
//! This is the algorithm-facing surface of the crate: given a policy, an
//! index-space length, and a chunk body, [`IndexDispatch::for_each_index`]
//! partitions the space into chunks and schedules every chunk through
//! the policy's executor.
//!
//! Selection among the Sync, Async, and Vectorized code paths happens at
//! compile time through the policy's type: the associated
//! [`Completion`](IndexDispatch::Completion) type is
//! `Result<(), DispatchError>` for sync kinds, [`DispatchHandle`] for
//! async kinds, and `()` for [`Vectorized`] — vectorized failures abort
//! the process and therefore have no error channel at all.
//!
//! ```
//! use parlay::{IndexDispatch, PAR};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let sum = Arc::new(AtomicUsize::new(0));
//! let body_sum = Arc::clone(&sum);
//! PAR.with_chunk_size(4)
//!     .for_each_index(16, move |i| {
//!         body_sum.fetch_add(i, Ordering::Relaxed);
//!         Ok(())
//!     })
//!     .expect("dispatch");
//! assert_eq!(sum.load(Ordering::Relaxed), (0..16).sum());
//! ```
//!
//! # Async dispatch and executor lifetime
//!
//! Async kinds are dispatchable only when bound to a `'static` executor
//! (the process-wide defaults qualify). The scheduled work outlives the
//! dispatch call by an unbounded amount, so a shorter borrow cannot be
//! proven safe; the `'static` bound encodes the caller-keeps-the-executor-
//! alive precondition in the type system instead of documentation.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::process;
use std::sync::Arc;
use std::thread;

use crate::error::{DispatchError, PanicPayload};
use crate::executor::Executor;
use crate::policy::{
    Parallel, ParallelAsync, Policy, Sequential, SequentialAsync, Vectorized,
};

mod handle;

pub use handle::DispatchHandle;

use handle::CompletionState;

/// Chunks-per-worker factor for automatic chunk sizing.
const AUTO_CHUNKS_PER_WORKER: usize = 4;

/// Dispatch of an index space `0..len` through an execution policy.
///
/// The body receives each index exactly once. It must be `Fn` (chunks
/// may run concurrently) and `'static` (async kinds outlive the call).
pub trait IndexDispatch<'e>: Policy<'e> {
    /// What the dispatch call produces: an immediate result for sync
    /// kinds, a pending-result handle for async kinds, `()` for
    /// vectorized dispatch.
    type Completion;

    /// Runs `body` for every index in `0..len` according to this policy.
    fn for_each_index<F>(&self, len: usize, body: F) -> Self::Completion
    where
        F: Fn(usize) -> Result<(), DispatchError> + Send + Sync + 'static;
}

impl<'e> IndexDispatch<'e> for Sequential<'e> {
    type Completion = Result<(), DispatchError>;

    fn for_each_index<F>(&self, len: usize, body: F) -> Self::Completion
    where
        F: Fn(usize) -> Result<(), DispatchError> + Send + Sync + 'static,
    {
        tracing::trace!(len, policy = %Self::KIND, "dispatching index space");
        run_sync(self.executor(), len, len.max(1), body)
    }
}

impl<'e> IndexDispatch<'e> for Parallel<'e> {
    type Completion = Result<(), DispatchError>;

    fn for_each_index<F>(&self, len: usize, body: F) -> Self::Completion
    where
        F: Fn(usize) -> Result<(), DispatchError> + Send + Sync + 'static,
    {
        let chunk_len = resolve_chunk_len(len, self.chunk_size());
        tracing::trace!(len, chunk_len, policy = %Self::KIND, "dispatching index space");
        run_sync(self.executor(), len, chunk_len, body)
    }
}

impl IndexDispatch<'static> for SequentialAsync<'static> {
    type Completion = DispatchHandle;

    fn for_each_index<F>(&self, len: usize, body: F) -> Self::Completion
    where
        F: Fn(usize) -> Result<(), DispatchError> + Send + Sync + 'static,
    {
        tracing::trace!(len, policy = %Self::KIND, "dispatching index space");
        run_async(self.executor(), len, len.max(1), body)
    }
}

impl IndexDispatch<'static> for ParallelAsync<'static> {
    type Completion = DispatchHandle;

    fn for_each_index<F>(&self, len: usize, body: F) -> Self::Completion
    where
        F: Fn(usize) -> Result<(), DispatchError> + Send + Sync + 'static,
    {
        let chunk_len = resolve_chunk_len(len, self.chunk_size());
        tracing::trace!(len, chunk_len, policy = %Self::KIND, "dispatching index space");
        run_async(self.executor(), len, chunk_len, body)
    }
}

impl<'e> IndexDispatch<'e> for Vectorized<'e> {
    type Completion = ();

    /// Runs `body` for every index as vectorized lane batches.
    ///
    /// Failure here is not recoverable: a body error or panic in any
    /// lane terminates the process via [`process::abort`]. Partial
    /// lane results cannot be safely unwound, so fail-fast is the
    /// contract, by construction rather than by accident.
    fn for_each_index<F>(&self, len: usize, body: F)
    where
        F: Fn(usize) -> Result<(), DispatchError> + Send + Sync + 'static,
    {
        let chunk_len = resolve_chunk_len(len, 0);
        tracing::trace!(len, chunk_len, policy = %Self::KIND, "dispatching index space");
        run_vectorized(self.executor(), len, chunk_len, body);
    }
}

/// Picks a chunk length: the caller's hint, or a count proportional to
/// the index-space size and available parallelism.
fn resolve_chunk_len(len: usize, hint: usize) -> usize {
    if hint > 0 {
        return hint;
    }
    let workers = crate::executor::default_worker_count();
    len.div_ceil(workers * AUTO_CHUNKS_PER_WORKER).max(1)
}

fn chunk_count(len: usize, chunk_len: usize) -> usize {
    len.div_ceil(chunk_len)
}

/// Submits one chunk through the executor, recording its outcome.
fn submit_chunk<F>(
    executor: &dyn Executor,
    state: &Arc<CompletionState>,
    body: &Arc<F>,
    start: usize,
    end: usize,
) where
    F: Fn(usize) -> Result<(), DispatchError> + Send + Sync + 'static,
{
    let body = Arc::clone(body);
    let state = Arc::clone(state);
    executor.execute(Box::new(move || {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            for index in start..end {
                body(index)?;
            }
            Ok(())
        }));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(error)) => state.record_failure(error),
            Err(payload) => state.record_failure(DispatchError::Panicked {
                payload: PanicPayload::from_unwind(&*payload),
            }),
        }
        state.complete_one();
    }));
}

/// Schedules every chunk and blocks until the last one completes.
fn run_sync<F>(
    executor: &dyn Executor,
    len: usize,
    chunk_len: usize,
    body: F,
) -> Result<(), DispatchError>
where
    F: Fn(usize) -> Result<(), DispatchError> + Send + Sync + 'static,
{
    let body = Arc::new(body);
    let chunks = chunk_count(len, chunk_len);
    let state = Arc::new(CompletionState::new(chunks));
    for chunk in 0..chunks {
        let start = chunk * chunk_len;
        let end = (start + chunk_len).min(len);
        submit_chunk(executor, &state, &body, start, end);
    }
    state.wait();
    state.result()
}

/// Schedules every chunk from a coordinator thread and returns a handle
/// immediately.
///
/// Submission itself moves off the calling thread so that inline
/// executors (the sequential default) cannot block the caller.
fn run_async<F>(
    executor: &'static dyn Executor,
    len: usize,
    chunk_len: usize,
    body: F,
) -> DispatchHandle
where
    F: Fn(usize) -> Result<(), DispatchError> + Send + Sync + 'static,
{
    let body = Arc::new(body);
    let chunks = chunk_count(len, chunk_len);
    let state = Arc::new(CompletionState::new(chunks));

    let coordinator_state = Arc::clone(&state);
    let spawned = thread::Builder::new()
        .name("parlay-dispatch".to_string())
        .spawn(move || {
            for chunk in 0..chunks {
                let start = chunk * chunk_len;
                let end = (start + chunk_len).min(len);
                submit_chunk(executor, &coordinator_state, &body, start, end);
            }
        });

    if let Err(error) = spawned {
        tracing::error!(%error, "failed to spawn dispatch coordinator");
        state.abandon(DispatchError::CoordinatorSpawn {
            details: error.to_string(),
        });
    }

    DispatchHandle::new(state)
}

/// Schedules lane batches and blocks; any failure aborts the process.
fn run_vectorized<F>(executor: &dyn Executor, len: usize, chunk_len: usize, body: F)
where
    F: Fn(usize) -> Result<(), DispatchError> + Send + Sync + 'static,
{
    let body = Arc::new(body);
    let chunks = chunk_count(len, chunk_len);
    let state = Arc::new(CompletionState::new(chunks));
    for chunk in 0..chunks {
        let start = chunk * chunk_len;
        let end = (start + chunk_len).min(len);
        let body = Arc::clone(&body);
        let state = Arc::clone(&state);
        executor.execute(Box::new(move || {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                for index in start..end {
                    body(index)?;
                }
                Ok::<(), DispatchError>(())
            }));
            match outcome {
                Ok(Ok(())) => state.complete_one(),
                Ok(Err(error)) => {
                    tracing::error!(%error, start, end, "vectorized lane failed; aborting");
                    process::abort();
                }
                Err(_) => {
                    tracing::error!(start, end, "vectorized lane panicked; aborting");
                    process::abort();
                }
            }
        }));
    }
    state.wait();
}
