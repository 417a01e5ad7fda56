//! Parlay: execution policies and executor binding for parallel
//! algorithm dispatch.
//!
//! # Overview
//!
//! An execution policy is an immutable value describing how and where a
//! unit of parallel work should run: sequentially, chunked in parallel,
//! or vectorized; blocking the caller or returning a pending-result
//! handle; on a default executor or one supplied by the caller.
//! Algorithms accept a policy and query its executor, chunk size, and
//! launch policy to decide scheduling, without knowing the concrete
//! policy type.
//!
//! # Core Guarantees
//!
//! - **Immutable values**: every policy transformation (`on`,
//!   `with_chunk_size`, `to_async`) returns a new value; nothing is
//!   mutated in place
//! - **Compile-time capability checks**: only types implementing
//!   [`Executor`] can be bound to a policy; incompatible types are
//!   rejected by the compiler, never at runtime
//! - **Checked recovery**: [`ExecutionPolicy::get`] on a mismatched kind
//!   is a defined `None`, not a panic
//! - **Failure semantics by launch policy**: sync dispatch fails at the
//!   call site, async dispatch captures failures into the handle, and
//!   vectorized dispatch aborts the process — deliberately fail-fast
//!
//! # Module Structure
//!
//! - [`policy`]: Policy value types, kind/launch resolution, and the
//!   type-erased [`ExecutionPolicy`] container
//! - [`executor`]: The [`Executor`] capability contract and the default
//!   executors
//! - [`dispatch`]: Index-space dispatch through a policy and the
//!   pending-result [`DispatchHandle`]
//! - [`error`]: Dispatch error types
//! - [`test_utils`]: Logging initialization and the instrumented
//!   [`MockExecutor`](test_utils::MockExecutor)
//!
//! # Quick Start
//!
//! ```
//! use parlay::{IndexDispatch, PAR};
//!
//! // Chunked parallel dispatch on the default pool, blocking.
//! let policy = PAR.with_chunk_size(64);
//! policy.for_each_index(1024, |_index| Ok(())).expect("dispatch");
//!
//! // The async counterpart returns a handle instead of blocking.
//! let handle = policy.to_async().for_each_index(1024, |_index| Ok(()));
//! handle.wait().expect("dispatch");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]

pub mod dispatch;
pub mod error;
pub mod executor;
pub mod policy;
pub mod test_utils;

pub use dispatch::{DispatchHandle, IndexDispatch};
pub use error::{DispatchError, PanicPayload};
pub use executor::{
    default_parallel, default_sequential, default_vectorized, CallingThread, Executor,
    ExecutorCategory, LaneExecutor, ThreadPool, Work,
};
pub use policy::{
    ExecutionPolicy, LaunchPolicy, Parallel, ParallelAsync, Policy, PolicyKind, Sequential,
    SequentialAsync, Vectorized, PAR, PAR_ASYNC, SEQ, SEQ_ASYNC, VEC,
};
