use chain_sol::SolError;
use thiserror::Error;

use crate::types::MintProgress;

/// Failures reported by an external ledger or wallet connector.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("capability unsupported: {0}")]
    Unsupported(String),

    #[error("network error: {0}")]
    Network(String),
}

/// Launchpad operation errors.
#[derive(Debug, Error)]
pub enum LaunchpadError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("size computation error: {0}")]
    SizeComputation(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("signing rejected: {0}")]
    SigningRejected(String),

    #[error("signing unsupported: {0}")]
    SigningUnsupported(String),

    #[error("signature integrity check failed: {0}")]
    SignatureIntegrity(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("transaction {signature} not confirmed within {timeout_ms} ms")]
    ConfirmationTimeout { signature: String, timeout_ms: u64 },

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("chain error: {0}")]
    Chain(SolError),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// A later batch failed after earlier ones reached the ledger. Nothing
    /// is rolled back; `progress` says what exists.
    #[error("mint flow stopped at stage {}: {source}", .progress.stage)]
    PartialMint {
        progress: Box<MintProgress>,
        source: Box<LaunchpadError>,
    },
}

impl LaunchpadError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        LaunchpadError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// What was created before a partial failure, if anything.
    pub fn progress(&self) -> Option<&MintProgress> {
        match self {
            LaunchpadError::PartialMint { progress, .. } => Some(progress),
            _ => None,
        }
    }

    /// The underlying failure, looking through [`LaunchpadError::PartialMint`].
    pub fn root(&self) -> &LaunchpadError {
        match self {
            LaunchpadError::PartialMint { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<ConnectorError> for LaunchpadError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::Rejected(msg) => LaunchpadError::SigningRejected(msg),
            ConnectorError::Unsupported(msg) => LaunchpadError::SigningUnsupported(msg),
            ConnectorError::Network(msg) => LaunchpadError::Network(msg),
        }
    }
}

impl From<SolError> for LaunchpadError {
    fn from(err: SolError) -> Self {
        match err {
            SolError::EncodingError(msg) => LaunchpadError::Encoding(msg),
            SolError::SizeComputationError(msg) => LaunchpadError::SizeComputation(msg),
            other => LaunchpadError::Chain(other),
        }
    }
}

impl From<toml::de::Error> for LaunchpadError {
    fn from(err: toml::de::Error) -> Self {
        LaunchpadError::Config(err.to_string())
    }
}
