//! Inline executor for sequential work.

use super::{Executor, ExecutorCategory, Work};

/// An executor that runs every unit of work inline on the calling thread.
///
/// This is the default executor for `Sequential` and `SequentialAsync`
/// policies. Submission order is execution order, and `execute` does not
/// return until the work has finished.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallingThread;

impl CallingThread {
    /// Creates a new inline executor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Executor for CallingThread {
    fn execute(&self, work: Work) {
        work();
    }

    fn category(&self) -> ExecutorCategory {
        ExecutorCategory::Sequential
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn runs_work_before_returning() {
        let ran = Arc::new(AtomicUsize::new(0));
        let ran_in_work = Arc::clone(&ran);
        let exec = CallingThread::new();
        exec.execute(Box::new(move || {
            ran_in_work.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn category_is_sequential() {
        assert_eq!(CallingThread::new().category(), ExecutorCategory::Sequential);
    }
}
