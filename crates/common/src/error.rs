//! Chain client errors

/// Errors that can occur while fetching chain data.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested transaction, receipt or block does not exist.
    #[error("{0}")]
    NotFound(String),
    /// The transaction is known to the node but has not been mined yet.
    #[error("Transaction is pending and has not been mined yet")]
    PendingTransaction,
    /// A transport or node failure, wrapped with the operation that failed.
    #[error("{context}: {message}")]
    Rpc {
        /// The operation that failed, e.g. `Failed to fetch transaction`.
        context: String,
        /// The original error message from the node or transport.
        message: String,
    },
    /// The node answered with a payload of an unexpected shape.
    #[error("Invalid response to {method}: {reason}")]
    InvalidResponse {
        /// The JSON-RPC method that was called.
        method: String,
        /// Why the payload was rejected.
        reason: String,
    },
    /// The transaction hash is not `0x` followed by 64 hex digits.
    #[error("Invalid transaction hash: {0}")]
    InvalidHash(String),
    /// Missing or unusable endpoint configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error means the requested object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
