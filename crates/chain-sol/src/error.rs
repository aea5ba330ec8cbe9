use thiserror::Error;

/// Solana chain operation errors.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("size computation error: {0}")]
    SizeComputationError(String),
}
