//! Type-erased execution policy container.
//!
//! [`ExecutionPolicy`] holds any one of the five concrete policy values
//! behind a uniform interface, for heterogeneous contexts where the
//! concrete kind is chosen at runtime. The boxed value is immutable, so
//! handles share it on clone; every transforming operation produces a
//! new handle.
//!
//! The representation is a closed tagged union rather than `dyn Any`:
//! the set of policy kinds is fixed, so a kind discriminant plus match
//! dispatch covers every query without runtime type machinery.

use std::sync::Arc;

use crate::executor::Executor;

use super::{
    LaunchPolicy, Parallel, ParallelAsync, Policy, PolicyKind, Sequential, SequentialAsync,
    Vectorized,
};

/// Crate-private tagged storage for one concrete policy value.
pub(crate) enum PolicyRepr<'e> {
    Sequential(Sequential<'e>),
    SequentialAsync(SequentialAsync<'e>),
    Parallel(Parallel<'e>),
    ParallelAsync(ParallelAsync<'e>),
    Vectorized(Vectorized<'e>),
}

/// A shared, runtime-polymorphic container for any execution policy.
///
/// Construct one from any concrete policy value, recover the value with
/// [`get`](Self::get), or transform it without knowing its kind:
///
/// ```
/// use parlay::{ExecutionPolicy, LaunchPolicy, Parallel, PolicyKind, PAR};
///
/// let handle = ExecutionPolicy::new(PAR.with_chunk_size(4));
/// assert_eq!(handle.kind(), PolicyKind::Parallel);
/// assert_eq!(handle.get::<Parallel>().map(Parallel::chunk_size), Some(4));
///
/// let async_handle = handle.to_async();
/// assert_eq!(async_handle.launch_policy(), LaunchPolicy::Async);
/// ```
///
/// Cloning shares the boxed value (cheap; the value is immutable).
/// Moving a handle transfers ownership of the box; the moved-from
/// binding is unusable until reassigned, which the compiler enforces.
pub struct ExecutionPolicy<'e> {
    inner: Arc<PolicyRepr<'e>>,
}

impl<'e> ExecutionPolicy<'e> {
    /// Wraps a concrete policy value.
    #[must_use]
    pub fn new<P: Policy<'e>>(policy: P) -> Self {
        Self {
            inner: Arc::new(policy.into_repr()),
        }
    }

    /// Returns the kind tag of the boxed value without unboxing.
    #[must_use]
    pub fn kind(&self) -> PolicyKind {
        match &*self.inner {
            PolicyRepr::Sequential(_) => PolicyKind::Sequential,
            PolicyRepr::SequentialAsync(_) => PolicyKind::SequentialAsync,
            PolicyRepr::Parallel(_) => PolicyKind::Parallel,
            PolicyRepr::ParallelAsync(_) => PolicyKind::ParallelAsync,
            PolicyRepr::Vectorized(_) => PolicyKind::Vectorized,
        }
    }

    /// Recovers a reference to the boxed value if its kind is exactly
    /// `P`.
    ///
    /// A mismatch is a defined outcome, not an error: the method returns
    /// `None` and never panics. No conversion between kinds is ever
    /// performed.
    #[must_use]
    pub fn get<P: Policy<'e>>(&self) -> Option<&P> {
        P::from_repr(&self.inner)
    }

    /// Returns a new handle holding the boxed value converted to its
    /// async counterpart.
    #[must_use]
    pub fn to_async(&self) -> Self {
        match &*self.inner {
            PolicyRepr::Sequential(p) => Self::new(p.to_async()),
            PolicyRepr::SequentialAsync(p) => Self::new(p.to_async()),
            PolicyRepr::Parallel(p) => Self::new(p.to_async()),
            PolicyRepr::ParallelAsync(p) => Self::new(p.to_async()),
            PolicyRepr::Vectorized(p) => Self::new(p.to_async()),
        }
    }

    /// Returns a new handle holding the boxed value rebound to the given
    /// executor.
    #[must_use]
    pub fn on(&self, exec: &'e dyn Executor) -> Self {
        match &*self.inner {
            PolicyRepr::Sequential(p) => Self::new(p.on(exec)),
            PolicyRepr::SequentialAsync(p) => Self::new(p.on(exec)),
            PolicyRepr::Parallel(p) => Self::new(p.on(exec)),
            PolicyRepr::ParallelAsync(p) => Self::new(p.on(exec)),
            PolicyRepr::Vectorized(p) => Self::new(p.on(exec)),
        }
    }

    /// Resolves the launch policy of the boxed value.
    #[must_use]
    pub fn launch_policy(&self) -> LaunchPolicy {
        self.kind().launch_policy()
    }

    /// Returns the chunk-size hint of the boxed value; `0` for
    /// non-chunked kinds.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        match &*self.inner {
            PolicyRepr::Parallel(p) => p.chunk_size(),
            PolicyRepr::ParallelAsync(p) => p.chunk_size(),
            PolicyRepr::Sequential(_)
            | PolicyRepr::SequentialAsync(_)
            | PolicyRepr::Vectorized(_) => 0,
        }
    }

    /// Returns the executor of the boxed value.
    #[must_use]
    pub fn executor(&self) -> &'e dyn Executor {
        match &*self.inner {
            PolicyRepr::Sequential(p) => p.executor(),
            PolicyRepr::SequentialAsync(p) => p.executor(),
            PolicyRepr::Parallel(p) => p.executor(),
            PolicyRepr::ParallelAsync(p) => p.executor(),
            PolicyRepr::Vectorized(p) => p.executor(),
        }
    }
}

impl Clone for ExecutionPolicy<'_> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for ExecutionPolicy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionPolicy")
            .field("kind", &self.kind())
            .field("chunk_size", &self.chunk_size())
            .finish()
    }
}

impl<'e> From<Sequential<'e>> for ExecutionPolicy<'e> {
    fn from(policy: Sequential<'e>) -> Self {
        Self::new(policy)
    }
}

impl<'e> From<SequentialAsync<'e>> for ExecutionPolicy<'e> {
    fn from(policy: SequentialAsync<'e>) -> Self {
        Self::new(policy)
    }
}

impl<'e> From<Parallel<'e>> for ExecutionPolicy<'e> {
    fn from(policy: Parallel<'e>) -> Self {
        Self::new(policy)
    }
}

impl<'e> From<ParallelAsync<'e>> for ExecutionPolicy<'e> {
    fn from(policy: ParallelAsync<'e>) -> Self {
        Self::new(policy)
    }
}

impl<'e> From<Vectorized<'e>> for ExecutionPolicy<'e> {
    fn from(policy: Vectorized<'e>) -> Self {
        Self::new(policy)
    }
}
