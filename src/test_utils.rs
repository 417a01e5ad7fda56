//! Test utilities.
//!
//! Shared helpers for unit and integration tests:
//!
//! - Tracing-based logging initialization
//! - Phase/completion macros for readable test output
//! - [`MockExecutor`], an instrumented executor for verifying that
//!   dispatch schedules work through the bound executor
//!
//! # Example
//!
//! ```
//! use parlay::test_utils::{init_test_logging, MockExecutor};
//! use parlay::{ExecutorCategory, IndexDispatch, PAR};
//!
//! init_test_logging();
//! let mock = MockExecutor::new(ExecutorCategory::Parallel);
//! PAR.on(&mock).with_chunk_size(4).for_each_index(8, |_| Ok(())).unwrap();
//! assert_eq!(mock.execution_count(), 2);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use crate::executor::{Executor, ExecutorCategory, Work};

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only the first call initializes.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "==== TEST PHASE: {} ====", $name);
    };
}

/// Log test completion.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
}

/// Log before assertions for context.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            "asserting: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}

/// An instrumented executor for tests.
///
/// Runs every unit of work inline and counts executions, so a test can
/// assert that dispatch routed work through this executor and nothing
/// else.
#[derive(Debug)]
pub struct MockExecutor {
    category: ExecutorCategory,
    executions: AtomicUsize,
}

impl MockExecutor {
    /// Creates a mock with the given category.
    ///
    /// `const` so mocks can live in `static`s, which async dispatch
    /// requires of its executors.
    #[must_use]
    pub const fn new(category: ExecutorCategory) -> Self {
        Self {
            category,
            executions: AtomicUsize::new(0),
        }
    }

    /// Returns how many units of work were submitted to this executor.
    #[must_use]
    pub fn execution_count(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

impl Executor for MockExecutor {
    fn execute(&self, work: Work) {
        self.executions.fetch_add(1, Ordering::SeqCst);
        work();
    }

    fn category(&self) -> ExecutorCategory {
        self.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_counts_submissions() {
        let mock = MockExecutor::new(ExecutorCategory::Parallel);
        assert_eq!(mock.execution_count(), 0);
        mock.execute(Box::new(|| {}));
        mock.execute(Box::new(|| {}));
        assert_eq!(mock.execution_count(), 2);
        assert_eq!(mock.category(), ExecutorCategory::Parallel);
    }
}
