//! Vectorized execution policy.

use core::fmt;

use crate::executor::{default_vectorized, Executor};

use super::erased::PolicyRepr;
use super::{same_executor, Policy, PolicyKind, Sealed};

/// Default vectorized policy value.
pub const VEC: Vectorized<'static> = Vectorized::new();

/// Policy indicating that work may be vectorized into lane batches.
///
/// There is no async form of this policy: lane-level partial results
/// cannot be represented as a single resumable computation, so
/// [`to_async`](Vectorized::to_async) returns the policy unchanged.
///
/// Failure during vectorized dispatch is not recoverable; any lane error
/// or panic aborts the process. See
/// [`IndexDispatch`](crate::dispatch::IndexDispatch).
#[derive(Clone, Copy, Default)]
pub struct Vectorized<'e> {
    executor: Option<&'e dyn Executor>,
}

impl<'e> Vectorized<'e> {
    /// Creates an unbound vectorized policy.
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

    /// Returns itself.
    ///
    /// Requesting the async form of a vectorized policy is a deliberate
    /// no-op, not an error: the conversion has no meaningful target.
    #[must_use]
    pub fn to_async(self) -> Self {
        self
    }

    /// Returns the bound executor, or the default vectorized executor.
    #[must_use]
    pub fn executor(&self) -> &'e dyn Executor {
        match self.executor {
            Some(exec) => exec,
            None => default_vectorized(),
        }
    }
}

impl<'e> Policy<'e> for Vectorized<'e> {
    const KIND: PolicyKind = PolicyKind::Vectorized;
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

impl<'e> Sealed<'e> for Vectorized<'e> {
    fn into_repr(self) -> PolicyRepr<'e> {
        PolicyRepr::Vectorized(self)
    }

    fn from_repr<'r>(repr: &'r PolicyRepr<'e>) -> Option<&'r Self> {
        match repr {
            PolicyRepr::Vectorized(policy) => Some(policy),
            _ => None,
        }
    }
}

impl fmt::Debug for Vectorized<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vectorized")
            .field("custom_executor", &self.executor.is_some())
            .finish()
    }
}

impl PartialEq for Vectorized<'_> {
    fn eq(&self, other: &Self) -> bool {
        same_executor(self.executor, other.executor)
    }
}
