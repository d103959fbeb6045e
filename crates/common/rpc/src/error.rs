//! RPC error types.

use thiserror::Error;

/// Errors surfaced by node and wallet RPC implementations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// The endpoint could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),
    /// The endpoint answered with something that could not be interpreted.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// The wallet refused the request.
    #[error("Wallet error: {0}")]
    Wallet(String),
}

impl RpcError {
    /// Classifies whether an error is transient.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
