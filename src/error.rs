//! Error types for dispatch failures.
//!
//! Failure semantics follow the launch policy of the dispatching policy:
//!
//! - **Sync**: a `DispatchError` is returned at the dispatch call site.
//! - **Async**: the error is captured into the
//!   [`DispatchHandle`](crate::dispatch::DispatchHandle) and surfaces only
//!   when the handle is observed, never at the scheduling call.
//! - **Vectorized**: lane failures are not recoverable and abort the
//!   process; no error value is ever constructed for them. See
//!   [`Vectorized`](crate::policy::Vectorized).

use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Payload from a caught panic.
///
/// Wraps the panic message for transport across chunk boundaries. The
/// original payload value is reduced to a string so the type stays
/// `Clone` and `Send` without holding the unwind box alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicPayload {
    message: String,
}

impl PanicPayload {
    /// Creates a new panic payload with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Extracts a message from a raw unwind payload.
    ///
    /// `panic!` with a string literal or a formatted message covers the
    /// common cases; anything else is reported as opaque.
    pub(crate) fn from_unwind(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&'static str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "opaque panic payload".to_string());
        Self { message }
    }

    /// Returns the panic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PanicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panic: {}", self.message)
    }
}

/// Error produced by a dispatched index-space operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A chunk body returned an error.
    #[error("chunk body failed: {message}")]
    Body {
        /// Description of the failure, supplied by the chunk body.
        message: String,
    },

    /// A chunk body panicked.
    ///
    /// The panic was caught at the chunk boundary; sibling chunks run to
    /// completion regardless.
    #[error("chunk body panicked: {payload}")]
    Panicked {
        /// The captured panic message.
        payload: PanicPayload,
    },

    /// The coordinator thread for an async dispatch could not be started.
    #[error("failed to start dispatch coordinator: {details}")]
    CoordinatorSpawn {
        /// The underlying spawn failure.
        details: String,
    },
}

impl DispatchError {
    /// Creates a body error with the given message.
    #[must_use]
    pub fn body(message: impl Into<String>) -> Self {
        Self::Body {
            message: message.into(),
        }
    }

    /// Returns `true` if this error was produced by a caught panic.
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payload_extracts_str_literal() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        let payload = PanicPayload::from_unwind(&*boxed);
        assert_eq!(payload.message(), "boom");
    }

    #[test]
    fn panic_payload_extracts_formatted_string() {
        let boxed: Box<dyn Any + Send> = Box::new(format!("lane {}", 3));
        let payload = PanicPayload::from_unwind(&*boxed);
        assert_eq!(payload.message(), "lane 3");
    }

    #[test]
    fn panic_payload_reports_opaque_values() {
        let boxed: Box<dyn Any + Send> = Box::new(17_u32);
        let payload = PanicPayload::from_unwind(&*boxed);
        assert_eq!(payload.message(), "opaque panic payload");
    }

    #[test]
    fn dispatch_error_display_includes_message() {
        let err = DispatchError::body("row 4 out of bounds");
        assert_eq!(err.to_string(), "chunk body failed: row 4 out of bounds");
        assert!(!err.is_panic());

        let err = DispatchError::Panicked {
            payload: PanicPayload::new("boom"),
        };
        assert_eq!(err.to_string(), "chunk body panicked: panic: boom");
        assert!(err.is_panic());
    }
}
