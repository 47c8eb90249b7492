//! # GatewayError
//!
//! Failure taxonomy for remote gateway operations. Every fault is surfaced
//! to the orchestrator un-swallowed; there is no retry at this layer.

use thiserror::Error;

/// A fault raised by the remote data gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport-level failure (connection refused, timeout, TLS).
    #[error("gateway transport error: {0}")]
    Transport(String),

    /// The backend executed the operation and reported an error.
    #[error("backend error: {message}")]
    Backend { message: String },

    /// The backend rejected a create because the record already exists
    /// (e.g., a uniqueness constraint on category topic). Callers may
    /// recover by re-resolving.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// The response arrived but did not match the expected shape.
    #[error("malformed gateway response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// True when the fault signals "this record already exists".
    pub fn is_conflict(&self) -> bool {
        matches!(self, GatewayError::Conflict { .. })
    }
}
