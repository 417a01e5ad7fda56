//! Fixed-size thread pool executor.
//!
//! The pool owns a set of OS worker threads fed from a lock-free
//! injection queue. Workers park on a condition variable when the queue
//! is empty and are woken on submission.
//!
//! # Lifecycle
//!
//! Owned pools shut down gracefully on drop: pending work is drained,
//! workers exit, and their join handles are reaped. The process-wide
//! default pool (see [`default_parallel`](super::default_parallel)) is
//! never dropped and lives for the life of the process.
//!
//! # Shutdown degradation
//!
//! `execute` on a pool that has been shut down runs the work inline on
//! the submitting thread instead of dropping it. Dispatched work is
//! tracked by completion latches; losing a unit would wedge every waiter.

use crossbeam_queue::SegQueue;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::{Executor, ExecutorCategory, Work};

/// How long an idle worker sleeps between queue polls.
const PARK_INTERVAL: Duration = Duration::from_millis(100);

/// A fixed-size pool of worker threads implementing [`Executor`].
pub struct ThreadPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    /// Number of workers this pool was built with.
    workers: usize,
    /// Workers currently inside the worker loop.
    active_workers: AtomicUsize,
    /// Work units queued but not yet picked up.
    pending: AtomicUsize,
    /// Injection queue.
    queue: SegQueue<Work>,
    /// Set once; workers drain the queue and exit.
    shutdown: AtomicBool,
    /// Parking for idle workers.
    condvar: Condvar,
    mutex: Mutex<()>,
    /// Worker thread name prefix.
    thread_name_prefix: String,
    /// Join handles, reaped on shutdown.
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPool {
    /// Creates a pool with the given number of workers.
    ///
    /// Workers are spawned eagerly and named `parlay-worker-<n>`.
    ///
    /// # Panics
    ///
    /// Panics if `workers` is 0.
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self::with_thread_name(workers, "parlay-worker")
    }

    /// Creates a pool with a custom worker thread name prefix.
    ///
    /// # Panics
    ///
    /// Panics if `workers` is 0.
    #[must_use]
    pub fn with_thread_name(workers: usize, prefix: &str) -> Self {
        assert!(workers > 0, "thread pool needs at least one worker");

        let inner = Arc::new(PoolInner {
            workers,
            active_workers: AtomicUsize::new(0),
            pending: AtomicUsize::new(0),
            queue: SegQueue::new(),
            shutdown: AtomicBool::new(false),
            condvar: Condvar::new(),
            mutex: Mutex::new(()),
            thread_name_prefix: prefix.to_string(),
            handles: Mutex::new(Vec::with_capacity(workers)),
        });

        let pool = Self { inner };
        for index in 0..workers {
            pool.spawn_worker(index);
        }
        pool
    }

    /// Returns the number of workers this pool was built with.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.inner.workers
    }

    /// Returns the number of queued work units not yet picked up.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.pending.load(Ordering::Relaxed)
    }

    /// Returns `true` if the pool has been shut down.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.inner.shutdown.load(Ordering::Acquire)
    }

    /// Initiates shutdown.
    ///
    /// Queued work still runs; workers exit once the queue is drained.
    /// Work submitted after this point runs inline on the submitter.
    pub fn shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::Release);
        self.notify_all();
    }

    /// Shuts down and waits for all workers to exit.
    ///
    /// Returns `true` if every worker exited within `timeout`.
    pub fn shutdown_and_wait(&self, timeout: Duration) -> bool {
        self.shutdown();

        let deadline = std::time::Instant::now() + timeout;
        while self.inner.active_workers.load(Ordering::Acquire) > 0 {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() {
                return false;
            }
            self.notify_all();
            thread::sleep(Duration::from_millis(5).min(remaining));
        }

        if let Ok(mut handles) = self.inner.handles.lock() {
            for handle in handles.drain(..) {
                let _ = handle.join();
            }
        }
        true
    }

    fn spawn_worker(&self, index: usize) {
        let inner = Arc::clone(&self.inner);
        let name = format!("{}-{index}", inner.thread_name_prefix);
        inner.active_workers.fetch_add(1, Ordering::AcqRel);

        let spawn_inner = Arc::clone(&inner);
        let spawned = thread::Builder::new()
            .name(name)
            .spawn(move || worker_loop(&spawn_inner, index));

        match spawned {
            Ok(handle) => {
                if let Ok(mut handles) = inner.handles.lock() {
                    handles.push(handle);
                }
            }
            Err(error) => {
                inner.active_workers.fetch_sub(1, Ordering::AcqRel);
                tracing::error!(worker = index, %error, "failed to spawn pool worker");
            }
        }
    }

    fn notify_all(&self) {
        let _guard = self.inner.mutex.lock();
        self.inner.condvar.notify_all();
    }
}

fn worker_loop(inner: &Arc<PoolInner>, index: usize) {
    tracing::trace!(worker = index, "pool worker started");
    loop {
        if let Some(work) = inner.queue.pop() {
            inner.pending.fetch_sub(1, Ordering::Relaxed);
            if catch_unwind(AssertUnwindSafe(work)).is_err() {
                tracing::error!(worker = index, "work unit panicked in pool worker");
            }
            continue;
        }
        if inner.shutdown.load(Ordering::Acquire) {
            break;
        }
        // The queue is lock-free, so a submission can land between the
        // pop above and parking here; the bounded wait covers that race.
        if let Ok(guard) = inner.mutex.lock() {
            let _ = inner.condvar.wait_timeout(guard, PARK_INTERVAL);
        }
    }
    inner.active_workers.fetch_sub(1, Ordering::AcqRel);
    tracing::trace!(worker = index, "pool worker exited");
}

impl Executor for ThreadPool {
    fn execute(&self, work: Work) {
        if self.is_shutdown() {
            tracing::debug!("pool is shut down; running work inline");
            work();
            return;
        }
        self.inner.queue.push(work);
        self.inner.pending.fetch_add(1, Ordering::Relaxed);
        let _guard = self.inner.mutex.lock();
        self.inner.condvar.notify_one();
    }

    fn category(&self) -> ExecutorCategory {
        ExecutorCategory::Parallel
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPool")
            .field("workers", &self.inner.workers)
            .field(
                "active_workers",
                &self.inner.active_workers.load(Ordering::Relaxed),
            )
            .field("pending", &self.inner.pending.load(Ordering::Relaxed))
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
        let _ = self.shutdown_and_wait(Duration::from_secs(5));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use std::sync::atomic::AtomicUsize;

    fn init_test(test_name: &str) {
        init_test_logging();
        crate::test_phase!(test_name);
    }

    #[test]
    fn executes_work_on_worker_threads() {
        init_test("executes_work_on_worker_threads");
        let pool = ThreadPool::with_thread_name(2, "pool-test");
        let counter = Arc::new(AtomicUsize::new(0));
        let on_worker = Arc::new(AtomicUsize::new(0));

        for _ in 0..8 {
            let counter = Arc::clone(&counter);
            let on_worker = Arc::clone(&on_worker);
            pool.execute(Box::new(move || {
                let name = thread::current().name().map(ToString::to_string);
                if name.is_some_and(|n| n.starts_with("pool-test")) {
                    on_worker.fetch_add(1, Ordering::SeqCst);
                }
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }

        assert!(pool.shutdown_and_wait(Duration::from_secs(5)));
        let ran = counter.load(Ordering::SeqCst);
        crate::assert_with_log!(ran == 8, "all work units should run", 8, ran);
        let named = on_worker.load(Ordering::SeqCst);
        crate::assert_with_log!(named == 8, "work should run on named workers", 8, named);
        crate::test_complete!("executes_work_on_worker_threads");
    }

    #[test]
    fn shutdown_degrades_to_inline_execution() {
        init_test("shutdown_degrades_to_inline_execution");
        let pool = ThreadPool::new(1);
        assert!(pool.shutdown_and_wait(Duration::from_secs(5)));

        let ran = Arc::new(AtomicUsize::new(0));
        let ran_in_work = Arc::clone(&ran);
        pool.execute(Box::new(move || {
            ran_in_work.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        crate::test_complete!("shutdown_degrades_to_inline_execution");
    }

    #[test]
    fn worker_survives_panicking_work() {
        init_test("worker_survives_panicking_work");
        let pool = ThreadPool::new(1);
        pool.execute(Box::new(|| panic!("deliberate")));

        let ran = Arc::new(AtomicUsize::new(0));
        let ran_in_work = Arc::clone(&ran);
        pool.execute(Box::new(move || {
            ran_in_work.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(pool.shutdown_and_wait(Duration::from_secs(5)));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
        crate::test_complete!("worker_survives_panicking_work");
    }

    #[test]
    #[should_panic(expected = "at least one worker")]
    fn zero_workers_is_rejected() {
        let _ = ThreadPool::new(0);
    }
}
