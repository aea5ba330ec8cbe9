//! Token launchpad core.
//!
//! Mints a Token-2022 token with embedded metadata through a connected
//! wallet, and signs / verifies text to prove key ownership. The ledger and
//! the wallet are external collaborators passed in as trait objects
//! ([`LedgerConnector`], [`WalletConnector`]); nothing here holds the
//! holder's key.

pub mod authenticator;
pub mod builder;
pub mod config;
pub mod connector;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod requirements;
pub mod types;

pub use authenticator::{sign_text, verify_text};
pub use config::{LaunchpadConfig, MetadataUriSource, SubmissionMode};
pub use connector::{LedgerConnector, WalletConnector};
pub use error::{ConnectorError, LaunchpadError};
pub use orchestrator::MintFlow;
pub use requirements::{compute_account_requirements, AccountRequirements};
pub use types::{
    MintIdentity, MintProgress, MintResult, MintStage, OffChainMetadata, TokenSpec,
    ValidatedTokenSpec,
};
