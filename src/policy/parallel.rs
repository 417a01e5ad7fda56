//! Parallel execution policies.
//!
//! These are the only kinds carrying a chunk-size hint. A chunk size of
//! `0` means the dispatch layer chooses automatically, proportional to
//! the index-space size and available parallelism.
//!
//! # Serialization
//!
//! Both types serialize only the chunk size. An executor borrow is
//! meaningless outside the originating process, so the executor field is
//! skipped; deserialized policies are unbound and resolve to the local
//! default parallel executor.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::executor::{default_parallel, Executor};

use super::erased::PolicyRepr;
use super::{same_executor, Policy, PolicyKind, Sealed};

/// Default parallel policy value.
pub const PAR: Parallel<'static> = Parallel::new();

/// Default parallel-async policy value.
pub const PAR_ASYNC: ParallelAsync<'static> = ParallelAsync::new();

/// Policy indicating that work may be chunked across threads.
///
/// Dispatching with this policy blocks the caller until every chunk
/// completes; the first failure propagates at the call site.
#[derive(Clone, Copy, Default, Serialize, Deserialize)]
pub struct Parallel<'e> {
    #[serde(skip)]
    executor: Option<&'e dyn Executor>,
    chunk_size: usize,
}

impl<'e> Parallel<'e> {
    /// Creates an unbound parallel policy with automatic chunking.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            executor: None,
            chunk_size: 0,
        }
    }

    /// Returns a new policy bound to the given executor.
    ///
    /// The chunk-size hint is preserved across the rebind.
    #[must_use]
    pub fn on(self, exec: &'e dyn Executor) -> Self {
        Self {
            executor: Some(exec),
            chunk_size: self.chunk_size,
        }
    }

    /// Returns a new policy with the given chunk-size hint.
    ///
    /// `0` is legal and means automatic.
    #[must_use]
    pub fn with_chunk_size(self, chunk_size: usize) -> Self {
        Self { chunk_size, ..self }
    }

    /// Returns the async counterpart, preserving the executor binding
    /// and chunk size.
    #[must_use]
    pub fn to_async(self) -> ParallelAsync<'e> {
        ParallelAsync {
            executor: self.executor,
            chunk_size: self.chunk_size,
        }
    }

    /// Returns the bound executor, or the default parallel executor.
    #[must_use]
    pub fn executor(&self) -> &'e dyn Executor {
        match self.executor {
            Some(exec) => exec,
            None => default_parallel(),
        }
    }

    /// Returns the chunk-size hint; `0` means automatic.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl<'e> Policy<'e> for Parallel<'e> {
    const KIND: PolicyKind = PolicyKind::Parallel;
    type Async = ParallelAsync<'e>;

    fn to_async(self) -> Self::Async {
        Self::to_async(self)
    }

    fn on(self, exec: &'e dyn Executor) -> Self {
        Self::on(self, exec)
    }

    fn executor(&self) -> &'e dyn Executor {
        Self::executor(self)
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl<'e> Sealed<'e> for Parallel<'e> {
    fn into_repr(self) -> PolicyRepr<'e> {
        PolicyRepr::Parallel(self)
    }

    fn from_repr<'r>(repr: &'r PolicyRepr<'e>) -> Option<&'r Self> {
        match repr {
            PolicyRepr::Parallel(policy) => Some(policy),
            _ => None,
        }
    }
}

impl fmt::Debug for Parallel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parallel")
            .field("custom_executor", &self.executor.is_some())
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl PartialEq for Parallel<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.chunk_size == other.chunk_size && same_executor(self.executor, other.executor)
    }
}

/// Policy indicating chunked parallel work with an async launch.
///
/// Dispatching with this policy returns a pending-result handle
/// immediately; failures are captured into the handle.
#[derive(Clone, Copy, Default, Serialize, Deserialize)]
pub struct ParallelAsync<'e> {
    #[serde(skip)]
    executor: Option<&'e dyn Executor>,
    chunk_size: usize,
}

impl<'e> ParallelAsync<'e> {
    /// Creates an unbound parallel-async policy with automatic chunking.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            executor: None,
            chunk_size: 0,
        }
    }

    /// Returns a new policy bound to the given executor.
    ///
    /// The chunk-size hint is preserved across the rebind.
    #[must_use]
    pub fn on(self, exec: &'e dyn Executor) -> Self {
        Self {
            executor: Some(exec),
            chunk_size: self.chunk_size,
        }
    }

    /// Returns a new policy with the given chunk-size hint.
    ///
    /// `0` is legal and means automatic.
    #[must_use]
    pub fn with_chunk_size(self, chunk_size: usize) -> Self {
        Self { chunk_size, ..self }
    }

    /// Returns itself; the policy is already async.
    #[must_use]
    pub fn to_async(self) -> Self {
        self
    }

    /// Returns the bound executor, or the default parallel executor.
    #[must_use]
    pub fn executor(&self) -> &'e dyn Executor {
        match self.executor {
            Some(exec) => exec,
            None => default_parallel(),
        }
    }

    /// Returns the chunk-size hint; `0` means automatic.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl<'e> Policy<'e> for ParallelAsync<'e> {
    const KIND: PolicyKind = PolicyKind::ParallelAsync;
    type Async = Self;

    fn to_async(self) -> Self {
        self
    }

    fn on(self, exec: &'e dyn Executor) -> Self {
        Self::on(self, exec)
    }

    fn executor(&self) -> &'e dyn Executor {
        Self::executor(self)
    }

    fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl<'e> Sealed<'e> for ParallelAsync<'e> {
    fn into_repr(self) -> PolicyRepr<'e> {
        PolicyRepr::ParallelAsync(self)
    }

    fn from_repr<'r>(repr: &'r PolicyRepr<'e>) -> Option<&'r Self> {
        match repr {
            PolicyRepr::ParallelAsync(policy) => Some(policy),
            _ => None,
        }
    }
}

impl fmt::Debug for ParallelAsync<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelAsync")
            .field("custom_executor", &self.executor.is_some())
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl PartialEq for ParallelAsync<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.chunk_size == other.chunk_size && same_executor(self.executor, other.executor)
    }
}
