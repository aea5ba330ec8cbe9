//! The token launch flow.
//!
//! Three transactions, submitted strictly one after another:
//!
//! 1. create + initialise the mint and its metadata (co-signed by the
//!    ephemeral mint key and the holder)
//! 2. create the holder's associated token account
//! 3. mint the initial supply, only when one was requested
//!
//! Batch n+1 is built only after batch n's submission returned. Nothing is
//! rolled back: once a batch reached the ledger, a later failure is reported
//! as [`LaunchpadError::PartialMint`] with the addresses created so far.

use std::time::Duration;

use chain_sol::{
    encode_signature, to_base58, Instruction, Pubkey, Signature, TokenMetadata, Transaction,
};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::builder::{
    build_associated_account_instruction, build_mint_instructions, build_mint_to_instruction,
    metadata_record, mint_extensions,
};
use crate::config::LaunchpadConfig;
use crate::connector::{LedgerConnector, WalletConnector};
use crate::error::LaunchpadError;
use crate::requirements::compute_account_requirements;
use crate::types::{
    MintIdentity, MintProgress, MintResult, MintStage, OffChainMetadata, TokenSpec,
    ValidatedTokenSpec,
};

/// Runs launches against an explicit ledger and wallet.
pub struct MintFlow<'a> {
    config: &'a LaunchpadConfig,
    ledger: &'a dyn LedgerConnector,
    wallet: &'a dyn WalletConnector,
}

impl<'a> MintFlow<'a> {
    pub fn new(
        config: &'a LaunchpadConfig,
        ledger: &'a dyn LedgerConnector,
        wallet: &'a dyn WalletConnector,
    ) -> Self {
        Self {
            config,
            ledger,
            wallet,
        }
    }

    /// Launch a token with a freshly generated mint identity.
    pub async fn execute(&self, spec: &TokenSpec) -> Result<MintResult, LaunchpadError> {
        let (valid, payer) = self.prepare(spec)?;
        self.run(valid, payer, MintIdentity::generate()).await
    }

    /// Launch with a caller-supplied mint identity.
    pub async fn execute_with_identity(
        &self,
        spec: &TokenSpec,
        identity: MintIdentity,
    ) -> Result<MintResult, LaunchpadError> {
        let (valid, payer) = self.prepare(spec)?;
        self.run(valid, payer, identity).await
    }

    /// Everything checked before the first network call.
    fn prepare(&self, spec: &TokenSpec) -> Result<(ValidatedTokenSpec, Pubkey), LaunchpadError> {
        self.config.validate()?;
        let payer = self
            .wallet
            .public_key()
            .ok_or_else(|| LaunchpadError::validation("wallet", "no wallet connected"))?;
        let valid = spec.validate(self.config).inspect_err(|e| {
            debug!(error = %e, "rejected launch request");
        })?;
        Ok((valid, payer))
    }

    async fn run(
        &self,
        spec: ValidatedTokenSpec,
        payer: Pubkey,
        identity: MintIdentity,
    ) -> Result<MintResult, LaunchpadError> {
        let mint = identity.pubkey();
        let mut progress = MintProgress::new(mint);
        info!(
            mint = %to_base58(&mint),
            payer = %to_base58(&payer),
            symbol = %spec.symbol,
            "launching token"
        );

        let uri = self.config.resolve_metadata_uri(&spec.image_uri);
        let metadata = metadata_record(&spec, &mint, &payer, uri);

        match self.run_batches(&spec, &payer, &metadata, identity, &mut progress).await {
            Ok((associated_account, minted)) => {
                info!(
                    mint = %to_base58(&mint),
                    stage = %progress.stage,
                    "token launched"
                );
                Ok(MintResult {
                    mint_address: mint,
                    associated_account,
                    offchain_metadata: OffChainMetadata::for_token(&spec),
                    metadata,
                    stage: progress.stage,
                    minted,
                    signatures: progress.signatures,
                })
            }
            // Nothing reached the ledger: a plain failure.
            Err(e) if progress.signatures.is_empty() => Err(e),
            Err(e) => {
                warn!(
                    mint = %to_base58(&mint),
                    stage = %progress.stage,
                    error = %e,
                    "launch stopped part way, earlier batches stay on the ledger"
                );
                Err(LaunchpadError::PartialMint {
                    progress: Box::new(progress),
                    source: Box::new(e),
                })
            }
        }
    }

    async fn run_batches(
        &self,
        spec: &ValidatedTokenSpec,
        payer: &Pubkey,
        metadata: &TokenMetadata,
        identity: MintIdentity,
        progress: &mut MintProgress,
    ) -> Result<(Pubkey, Option<u64>), LaunchpadError> {
        let mint = metadata.mint;

        // Batch 1: the only one needing two signatures.
        let requirements =
            compute_account_requirements(self.ledger, &mint_extensions(), metadata.tlv_size()?)
                .await?;
        let instructions =
            build_mint_instructions(metadata, payer, &requirements, self.config.decimals)?;
        let mut tx = self.assemble(&instructions, payer).await?;
        identity.co_sign(&mut tx)?;
        self.submit(tx, "create mint", progress).await?;
        progress.stage = MintStage::MintCreated;

        // Batch 2
        let (associated, ix) = build_associated_account_instruction(payer, &mint)?;
        let tx = self.assemble(&[ix], payer).await?;
        self.submit(tx, "create token account", progress).await?;
        progress.associated_account = Some(associated);
        progress.stage = MintStage::AssociatedAccountCreated;

        // Batch 3
        let Some(amount) = spec.mint_amount else {
            debug!("no initial supply requested");
            return Ok((associated, None));
        };
        let ix = build_mint_to_instruction(&mint, &associated, payer, amount)?;
        let tx = self.assemble(&[ix], payer).await?;
        self.submit(tx, "mint initial supply", progress).await?;
        progress.stage = MintStage::SupplyMinted;

        Ok((associated, Some(amount)))
    }

    /// Stamp `instructions` with a fresh blockhash, `payer` paying fees.
    async fn assemble(
        &self,
        instructions: &[Instruction],
        payer: &Pubkey,
    ) -> Result<Transaction, LaunchpadError> {
        let blockhash = self.ledger.get_latest_blockhash().await?;
        Ok(Transaction::from_instructions(instructions, payer, &blockhash)?)
    }

    async fn submit(
        &self,
        tx: Transaction,
        label: &str,
        progress: &mut MintProgress,
    ) -> Result<Signature, LaunchpadError> {
        let signature = self.wallet.sign_and_submit(tx).await?;
        progress.signatures.push(signature);
        info!(batch = label, signature = %encode_signature(&signature), "batch submitted");

        if let Some((limit, poll)) = self.config.submission.confirmation() {
            self.wait_for_confirmation(&signature, limit, poll).await?;
            debug!(batch = label, "batch confirmed");
        }
        Ok(signature)
    }

    /// Poll until `signature` is confirmed or `limit` elapses.
    pub async fn wait_for_confirmation(
        &self,
        signature: &Signature,
        limit: Duration,
        poll: Duration,
    ) -> Result<(), LaunchpadError> {
        let polling = async {
            loop {
                if self.ledger.is_signature_confirmed(signature).await? {
                    return Ok::<(), LaunchpadError>(());
                }
                sleep(poll).await;
            }
        };

        match timeout(limit, polling).await {
            Ok(result) => result,
            Err(_) => Err(LaunchpadError::ConfirmationTimeout {
                signature: encode_signature(signature),
                timeout_ms: limit.as_millis() as u64,
            }),
        }
    }
}
