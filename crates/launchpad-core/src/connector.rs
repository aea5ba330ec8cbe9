//! Contracts for the external ledger and wallet.
//!
//! The launchpad never owns the holder's key and never talks to the network
//! directly; both capabilities are passed in explicitly.

use async_trait::async_trait;
use chain_sol::{Blockhash, Pubkey, Signature, Transaction};

use crate::error::ConnectorError;

/// Read-only ledger queries.
#[async_trait]
pub trait LedgerConnector: Send + Sync {
    /// Lamports an account of `data_len` bytes needs to be rent exempt
    /// under the ledger's current schedule.
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, ConnectorError>;

    /// A recent blockhash to stamp a transaction with.
    async fn get_latest_blockhash(&self) -> Result<Blockhash, ConnectorError>;

    /// Lamport balance of `address`.
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ConnectorError>;

    /// Base-unit balance of the token account at `address`.
    async fn get_token_account_balance(&self, address: &Pubkey) -> Result<u64, ConnectorError>;

    /// Whether the transaction identified by `signature` is confirmed.
    async fn is_signature_confirmed(&self, signature: &Signature)
        -> Result<bool, ConnectorError>;
}

/// The holder's wallet: signs with a key that never leaves it.
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// The connected account, or `None` when no wallet is connected.
    fn public_key(&self) -> Option<Pubkey>;

    /// Add the holder's signature and submit. Returns the transaction's
    /// signature once the ledger accepted it for processing.
    async fn sign_and_submit(&self, transaction: Transaction) -> Result<Signature, ConnectorError>;

    /// Sign arbitrary bytes. Wallets without this capability keep the
    /// default.
    async fn sign_message(&self, _message: &[u8]) -> Result<Signature, ConnectorError> {
        Err(ConnectorError::Unsupported(
            "wallet does not support message signing".into(),
        ))
    }
}
