//! Execution policy values and the type-erased policy container.
//!
//! An execution policy is an immutable value describing how and where a
//! unit of parallel work should run. Five kinds exist, one value type
//! per kind:
//!
//! - [`Sequential`] / [`SequentialAsync`]: work may not be parallelized.
//! - [`Parallel`] / [`ParallelAsync`]: work may be chunked across
//!   threads; these kinds carry a chunk-size hint.
//! - [`Vectorized`]: work runs as lane batches; has no async form.
//!
//! Policy values are immutable: every transformation (`on`,
//! `with_chunk_size`, `to_async`) returns a new value. The process-wide
//! defaults [`SEQ`], [`SEQ_ASYNC`], [`PAR`], [`PAR_ASYNC`], and [`VEC`]
//! are the usual starting points:
//!
//! ```
//! use parlay::{Policy, LaunchPolicy, PAR};
//!
//! let policy = PAR.with_chunk_size(64);
//! assert_eq!(policy.chunk_size(), 64);
//! assert_eq!(policy.launch_policy(), LaunchPolicy::Sync);
//! assert_eq!(policy.to_async().chunk_size(), 64);
//! ```
//!
//! For heterogeneous storage, any policy value can be wrapped in an
//! [`ExecutionPolicy`] handle, which preserves identity-checked recovery
//! of the original value via [`ExecutionPolicy::get`].

use crate::executor::Executor;
use core::fmt;

pub mod erased;
pub mod kind;
pub mod parallel;
pub mod sequential;
pub mod vector;

pub use erased::ExecutionPolicy;
pub use kind::{LaunchPolicy, PolicyKind};
pub use parallel::{Parallel, ParallelAsync, PAR, PAR_ASYNC};
pub use sequential::{Sequential, SequentialAsync, SEQ, SEQ_ASYNC};
pub use vector::{Vectorized, VEC};

mod sealed {
    use super::erased::PolicyRepr;

    /// Crate-internal bridge between concrete policy values and the
    /// type-erased representation. Sealing restricts [`super::Policy`]
    /// to exactly the five policy kinds.
    pub trait Sealed<'e>: Sized {
        fn into_repr(self) -> PolicyRepr<'e>;
        fn from_repr<'r>(repr: &'r PolicyRepr<'e>) -> Option<&'r Self>;
    }
}

pub(crate) use sealed::Sealed;

/// Common interface of the five execution policy value types.
///
/// This trait is sealed: only [`Sequential`], [`SequentialAsync`],
/// [`Parallel`], [`ParallelAsync`], and [`Vectorized`] implement it.
/// Algorithms generic over a policy use it to query the executor, chunk
/// size, and launch policy without naming a concrete kind.
///
/// The lifetime `'e` is the borrow of the bound executor; the caller
/// must keep that executor alive for the duration of every dispatch
/// using the policy, which the borrow checker enforces.
pub trait Policy<'e>: Sealed<'e> + Copy + fmt::Debug {
    /// The kind tag of this policy type.
    const KIND: PolicyKind;

    /// The policy type produced by the async-tag operation.
    type Async: Policy<'e>;

    /// Returns a new policy converted to its async counterpart.
    ///
    /// Idempotent; the executor binding and chunk size are preserved.
    /// [`Vectorized`] returns itself unchanged.
    #[must_use]
    fn to_async(self) -> Self::Async;

    /// Returns a new policy bound to the given executor.
    ///
    /// The chunk size is preserved. Only types implementing
    /// [`Executor`] can be passed, so binding an incompatible type is
    /// a compile error.
    #[must_use]
    fn on(self, exec: &'e dyn Executor) -> Self;

    /// Returns the bound executor, or the process-wide default of the
    /// matching kind if the policy has not been rebound.
    fn executor(&self) -> &'e dyn Executor;

    /// Returns the chunk-size hint; `0` means automatic.
    ///
    /// Always `0` for non-chunked kinds.
    fn chunk_size(&self) -> usize;

    /// Returns the kind tag of this policy value.
    fn kind(&self) -> PolicyKind {
        Self::KIND
    }

    /// Resolves the launch policy; pure in the kind.
    fn launch_policy(&self) -> LaunchPolicy {
        Self::KIND.launch_policy()
    }
}

/// Identity comparison for optionally bound executors.
///
/// Policies compare equal only when both are unbound or both borrow the
/// same executor object.
pub(crate) fn same_executor(a: Option<&dyn Executor>, b: Option<&dyn Executor>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => std::ptr::addr_eq(x, y),
        _ => false,
    }
}
