//! Custom error types for the videoport-hal core.
//!
//! Provides structured errors instead of `Box<dyn Error>`, so callers can
//! programmatically distinguish lifecycle misuse, bad parameters, and
//! operations that a given port role or platform table does not support.

use thiserror::Error;

/// Top-level error type for all video port operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortError {
    /// An operation was invoked before `init()` or after `term()`.
    #[error("video port module is not initialized")]
    NotInitialized,

    /// `init()` was invoked while the module was already ready.
    #[error("video port module is already initialized")]
    AlreadyInitialized,

    /// Bad handle, out-of-range value, or a setting outside the port's
    /// capability set.
    #[error("invalid parameter: {0}")]
    InvalidParam(&'static str),

    /// The operation is meaningful only for the opposite port role, or
    /// requires a capability the platform table marks absent.
    #[error("{operation} is not supported on this port ({reason})")]
    OperationNotSupported {
        operation: &'static str,
        reason: &'static str,
    },

    /// An underlying, unclassified platform failure. Reserved for the
    /// opaque hardware layer; never raised by the core's own logic.
    #[error("general platform failure: {0}")]
    General(String),
}

/// Shorthand result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PortError>;
