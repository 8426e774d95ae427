/// Errors raised while registering or decoding signatures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The signature could not be parsed or contains an unknown type.
    #[error("Invalid signature '{signature}': {reason}")]
    InvalidSignature {
        /// The signature as given.
        signature: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The data did not decode against the given types.
    #[error("Decoder error: {0}")]
    DecodeError(String),
}
