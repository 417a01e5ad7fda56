//! Executor capability contract and default executors.
//!
//! An executor is a capability object able to accept and run units of
//! work. Policies reference executors by borrow and never manage their
//! lifetime, thread count, or queue.
//!
//! - [`Executor`]: the structural contract a type must satisfy to be
//!   bindable to a policy via `on(...)`. Binding a non-conforming type
//!   fails at compile time through the trait bound; there is no runtime
//!   rejection path.
//! - [`CallingThread`]: runs work inline on the submitting thread.
//! - [`ThreadPool`]: fixed-size worker pool with a lock-free injection
//!   queue.
//! - [`LaneExecutor`]: runs lane batches inline for vectorized dispatch.
//!
//! # Default executors
//!
//! One process-wide default executor exists per policy kind, shared by
//! every policy value that has not been rebound. This is intentional
//! process-wide state: the defaults are created on first use and live for
//! the lifetime of the process, never torn down. The parallel default is
//! guarded by a [`OnceLock`](std::sync::OnceLock) so concurrent first use
//! from multiple threads initializes it exactly once.

use std::num::NonZeroUsize;
use std::sync::OnceLock;
use std::thread;

mod sequential;
mod thread_pool;
mod vector;

pub use sequential::CallingThread;
pub use thread_pool::ThreadPool;
pub use vector::LaneExecutor;

/// A boxed unit of work accepted by an executor.
pub type Work = Box<dyn FnOnce() + Send + 'static>;

/// Category tag describing an executor's execution semantics.
///
/// Algorithms use the category to pick a chunking strategy; it is
/// advisory and does not constrain which executors a policy may bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutorCategory {
    /// Work units run one at a time, in submission order.
    Sequential,
    /// Work units may run concurrently on multiple threads.
    Parallel,
    /// Work units are lane batches of a vectorized operation.
    Vectorized,
}

/// The capability contract an executor must satisfy.
///
/// A conforming type accepts units of work through [`execute`] and
/// reports its [`ExecutorCategory`]. The trait bound on policy `on(...)`
/// methods is the whole of the contract check: incompatible types are
/// rejected by the compiler, never at runtime.
///
/// Executors must be `Sync` because a single executor is shared by
/// reference across every policy bound to it, potentially from many
/// threads at once.
///
/// [`execute`]: Executor::execute
pub trait Executor: Sync {
    /// Accepts a unit of work for execution.
    ///
    /// Whether the work runs before this call returns is up to the
    /// executor: [`CallingThread`] runs it inline, [`ThreadPool`] queues
    /// it for a worker.
    fn execute(&self, work: Work);

    /// Returns the category tag for this executor.
    fn category(&self) -> ExecutorCategory;
}

/// Default executor for `Sequential` and `SequentialAsync` policies.
static DEFAULT_SEQUENTIAL: CallingThread = CallingThread::new();

/// Default executor for `Vectorized` policies.
static DEFAULT_VECTORIZED: LaneExecutor = LaneExecutor::new();

/// Default executor for `Parallel` and `ParallelAsync` policies.
static DEFAULT_PARALLEL: OnceLock<ThreadPool> = OnceLock::new();

/// Returns the process-wide default sequential executor.
#[must_use]
pub fn default_sequential() -> &'static CallingThread {
    &DEFAULT_SEQUENTIAL
}

/// Returns the process-wide default vectorized executor.
#[must_use]
pub fn default_vectorized() -> &'static LaneExecutor {
    &DEFAULT_VECTORIZED
}

/// Returns the process-wide default parallel executor.
///
/// The pool is created on first use with one worker per available CPU
/// and lives for the remainder of the process.
#[must_use]
pub fn default_parallel() -> &'static ThreadPool {
    DEFAULT_PARALLEL.get_or_init(|| {
        let workers = default_worker_count();
        tracing::debug!(workers, "initializing default parallel executor");
        ThreadPool::with_thread_name(workers, "parlay-worker")
    })
}

/// Worker count for the default pool: available parallelism, minimum 1.
pub(crate) fn default_worker_count() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}
