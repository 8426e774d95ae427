/// Errors that end an inspection.
///
/// Decode-level problems never surface here; they degrade the result instead. Cache failures
/// are only surfaced when the cache itself can't be opened.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A chain error, e.g. a missing transaction, a pending transaction or a failed RPC.
    #[error(transparent)]
    Chain(#[from] txlens_common::error::Error),
    /// The cache could not be opened.
    #[error("Cache error: {0}")]
    Cache(#[from] txlens_cache::error::Error),
    /// The result could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the transaction or its receipt could not be found. Callers map this to a
    /// not-found response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Chain(e) if e.is_not_found())
    }

    /// Whether the transaction exists but hasn't been mined yet.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Chain(txlens_common::error::Error::PendingTransaction))
    }
}
