//! Policy kind discriminant and launch-policy resolution.

use core::fmt;

/// The five policy kinds.
///
/// `Vectorized` has no async form: vectorized work cannot be deferred
/// into a pending result because lane-level partial results are not
/// representable as a single resumable computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// Work runs sequentially, blocking the caller.
    Sequential,
    /// Work runs sequentially; the caller gets a pending-result handle.
    SequentialAsync,
    /// Work runs chunked in parallel, blocking the caller.
    Parallel,
    /// Work runs chunked in parallel; the caller gets a pending-result
    /// handle.
    ParallelAsync,
    /// Work runs as vectorized lane batches, blocking the caller.
    Vectorized,
}

impl PolicyKind {
    /// Resolves the launch policy for this kind.
    ///
    /// This is a pure function of the kind alone; chunk size and bound
    /// executor never influence it.
    #[must_use]
    pub const fn launch_policy(self) -> LaunchPolicy {
        match self {
            Self::Sequential | Self::Parallel | Self::Vectorized => LaunchPolicy::Sync,
            Self::SequentialAsync | Self::ParallelAsync => LaunchPolicy::Async,
        }
    }

    /// Returns the kind produced by the async-tag operation.
    ///
    /// Idempotent: async kinds map to themselves. `Vectorized` maps to
    /// itself; it is never produced from, and never produces, any other
    /// kind.
    #[must_use]
    pub const fn to_async(self) -> Self {
        match self {
            Self::Sequential => Self::SequentialAsync,
            Self::Parallel => Self::ParallelAsync,
            Self::SequentialAsync | Self::ParallelAsync | Self::Vectorized => self,
        }
    }

    /// Returns `true` for kinds whose launch policy is `Async`.
    #[must_use]
    pub const fn is_async(self) -> bool {
        matches!(self.launch_policy(), LaunchPolicy::Async)
    }

    /// Returns `true` for kinds that enable parallelization.
    #[must_use]
    pub const fn is_parallel(self) -> bool {
        matches!(self, Self::Parallel | Self::ParallelAsync | Self::Vectorized)
    }

    /// Returns `true` for kinds that require sequenced execution.
    #[must_use]
    pub const fn is_sequenced(self) -> bool {
        matches!(self, Self::Sequential | Self::SequentialAsync)
    }

    /// Returns `true` for kinds that carry a chunk-size hint.
    #[must_use]
    pub const fn is_chunked(self) -> bool {
        matches!(self, Self::Parallel | Self::ParallelAsync)
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sequential => "sequential",
            Self::SequentialAsync => "sequential-async",
            Self::Parallel => "parallel",
            Self::ParallelAsync => "parallel-async",
            Self::Vectorized => "vectorized",
        };
        f.write_str(name)
    }
}

/// Whether dispatching with a policy blocks the caller or returns a
/// pending-result handle immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaunchPolicy {
    /// The dispatch call blocks until the work completes; failures
    /// propagate at the call site.
    Sync,
    /// The dispatch call returns a pending-result handle immediately;
    /// failures surface when the handle is observed.
    Async,
}
