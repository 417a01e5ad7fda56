//! Pending-result handle for async dispatch.
//!
//! A [`DispatchHandle`] is returned immediately by dispatch with an
//! async-resolved policy. Completion is tracked by a latch counting
//! outstanding chunks; the first failure is captured and surfaces only
//! when the handle is observed.
//!
//! There is no cancellation: once chunks are scheduled they run to
//! completion or failure, and dropping the handle does not affect them.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::DispatchError;

/// Shared completion state for one dispatched index space.
pub(crate) struct CompletionState {
    /// Chunks not yet completed.
    remaining: AtomicUsize,
    /// First failure recorded by any chunk.
    failure: Mutex<Option<DispatchError>>,
    /// Parking for waiters.
    condvar: Condvar,
    mutex: Mutex<()>,
}

impl CompletionState {
    /// Creates a latch for `chunks` outstanding chunks.
    ///
    /// With zero chunks the latch is born complete.
    pub(crate) fn new(chunks: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(chunks),
            failure: Mutex::new(None),
            condvar: Condvar::new(),
            mutex: Mutex::new(()),
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        self.remaining.load(Ordering::Acquire) == 0
    }

    /// Records a failure; the first one wins.
    pub(crate) fn record_failure(&self, error: DispatchError) {
        if let Ok(mut slot) = self.failure.lock() {
            if slot.is_none() {
                *slot = Some(error);
            }
        }
    }

    /// Marks one chunk complete, waking waiters on the last one.
    pub(crate) fn complete_one(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            let _guard = self.mutex.lock();
            self.condvar.notify_all();
        }
    }

    /// Completes the latch early with a failure.
    ///
    /// Used when scheduling itself fails and the outstanding chunks will
    /// never run.
    pub(crate) fn abandon(&self, error: DispatchError) {
        self.record_failure(error);
        self.remaining.store(0, Ordering::Release);
        let _guard = self.mutex.lock();
        self.condvar.notify_all();
    }

    /// Blocks until every chunk has completed.
    pub(crate) fn wait(&self) {
        if self.is_done() {
            return;
        }
        if let Ok(mut guard) = self.mutex.lock() {
            while !self.is_done() {
                match self.condvar.wait(guard) {
                    Ok(next) => guard = next,
                    Err(_) => return,
                }
            }
        }
    }

    /// Blocks until completion or until `timeout` elapses.
    ///
    /// Returns `true` if the latch completed.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.is_done() {
            return true;
        }
        let deadline = Instant::now() + timeout;
        let Ok(mut guard) = self.mutex.lock() else {
            return self.is_done();
        };
        while !self.is_done() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.condvar.wait_timeout(guard, remaining) {
                Ok((next, _)) => guard = next,
                Err(_) => return self.is_done(),
            }
        }
        true
    }

    /// Returns the recorded outcome. Only meaningful once done.
    pub(crate) fn result(&self) -> Result<(), DispatchError> {
        match self.failure.lock() {
            Ok(slot) => slot.clone().map_or(Ok(()), Err),
            Err(_) => Ok(()),
        }
    }
}

/// A handle to a dispatched index space with an async launch.
///
/// The dispatch call that produced this handle has already returned;
/// the work is running (or queued) on the policy's executor. Observing
/// the handle is the only point where failures surface.
pub struct DispatchHandle {
    state: Arc<CompletionState>,
}

impl DispatchHandle {
    pub(crate) fn new(state: Arc<CompletionState>) -> Self {
        Self { state }
    }

    /// Returns `true` if every chunk has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.is_done()
    }

    /// Blocks until the work completes and returns its outcome.
    ///
    /// # Errors
    ///
    /// Returns the first failure captured from any chunk: a body error
    /// or a caught panic.
    pub fn wait(&self) -> Result<(), DispatchError> {
        self.state.wait();
        self.state.result()
    }

    /// Blocks until completion or until `timeout` elapses.
    ///
    /// Returns `true` if the work completed; the outcome can then be
    /// read with [`wait`](Self::wait) without further blocking.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.state.wait_timeout(timeout)
    }

    /// Returns the outcome without blocking, or `None` if the work is
    /// still running.
    #[must_use]
    pub fn try_result(&self) -> Option<Result<(), DispatchError>> {
        if self.state.is_done() {
            Some(self.state.result())
        } else {
            None
        }
    }
}

impl fmt::Debug for DispatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchHandle")
            .field("finished", &self.is_finished())
            .finish()
    }
}
