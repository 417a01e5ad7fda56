//! Sequential execution policies.

use core::fmt;

use crate::executor::{default_sequential, Executor};

use super::erased::PolicyRepr;
use super::{same_executor, Policy, PolicyKind, Sealed};

/// Default sequential policy value.
pub const SEQ: Sequential<'static> = Sequential::new();

/// Default sequential-async policy value.
pub const SEQ_ASYNC: SequentialAsync<'static> = SequentialAsync::new();

/// Policy requiring that work may not be parallelized.
///
/// Dispatching with this policy blocks the caller until the work
/// completes; failures propagate at the call site.
#[derive(Clone, Copy, Default)]
pub struct Sequential<'e> {
    executor: Option<&'e dyn Executor>,
}

impl<'e> Sequential<'e> {
    /// Creates an unbound sequential policy.
    #[must_use]
    pub const fn new() -> Self {
        Self { executor: None }
    }

    /// Returns a new policy bound to the given executor.
    #[must_use]
    pub fn on(self, exec: &'e dyn Executor) -> Self {
        Self {
            executor: Some(exec),
        }
    }

    /// Returns the async counterpart, preserving the executor binding.
    #[must_use]
    pub fn to_async(self) -> SequentialAsync<'e> {
        SequentialAsync {
            executor: self.executor,
        }
    }

    /// Returns the bound executor, or the default sequential executor.
    #[must_use]
    pub fn executor(&self) -> &'e dyn Executor {
        match self.executor {
            Some(exec) => exec,
            None => default_sequential(),
        }
    }
}

impl<'e> Policy<'e> for Sequential<'e> {
    const KIND: PolicyKind = PolicyKind::Sequential;
    type Async = SequentialAsync<'e>;

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
        0
    }
}

impl<'e> Sealed<'e> for Sequential<'e> {
    fn into_repr(self) -> PolicyRepr<'e> {
        PolicyRepr::Sequential(self)
    }

    fn from_repr<'r>(repr: &'r PolicyRepr<'e>) -> Option<&'r Self> {
        match repr {
            PolicyRepr::Sequential(policy) => Some(policy),
            _ => None,
        }
    }
}

impl fmt::Debug for Sequential<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequential")
            .field("custom_executor", &self.executor.is_some())
            .finish()
    }
}

impl PartialEq for Sequential<'_> {
    fn eq(&self, other: &Self) -> bool {
        same_executor(self.executor, other.executor)
    }
}

/// Policy requiring sequenced execution with an async launch.
///
/// Dispatching with this policy returns a pending-result handle
/// immediately; the caller blocks only when observing the handle.
#[derive(Clone, Copy, Default)]
pub struct SequentialAsync<'e> {
    executor: Option<&'e dyn Executor>,
}

impl<'e> SequentialAsync<'e> {
    /// Creates an unbound sequential-async policy.
    #[must_use]
    pub const fn new() -> Self {
        Self { executor: None }
    }

    /// Returns a new policy bound to the given executor.
    #[must_use]
    pub fn on(self, exec: &'e dyn Executor) -> Self {
        Self {
            executor: Some(exec),
        }
    }

    /// Returns itself; the policy is already async.
    #[must_use]
    pub fn to_async(self) -> Self {
        self
    }

    /// Returns the bound executor, or the default sequential executor.
    #[must_use]
    pub fn executor(&self) -> &'e dyn Executor {
        match self.executor {
            Some(exec) => exec,
            None => default_sequential(),
        }
    }
}

impl<'e> Policy<'e> for SequentialAsync<'e> {
    const KIND: PolicyKind = PolicyKind::SequentialAsync;
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
        0
    }
}

impl<'e> Sealed<'e> for SequentialAsync<'e> {
    fn into_repr(self) -> PolicyRepr<'e> {
        PolicyRepr::SequentialAsync(self)
    }

    fn from_repr<'r>(repr: &'r PolicyRepr<'e>) -> Option<&'r Self> {
        match repr {
            PolicyRepr::SequentialAsync(policy) => Some(policy),
            _ => None,
        }
    }
}

impl fmt::Debug for SequentialAsync<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequentialAsync")
            .field("custom_executor", &self.executor.is_some())
            .finish()
    }
}

impl PartialEq for SequentialAsync<'_> {
    fn eq(&self, other: &Self) -> bool {
        same_executor(self.executor, other.executor)
    }
}
