use std::fmt;

use chain_sol::{to_base58, Pubkey, Signature, SolError, TokenMetadata, Transaction};
use ed25519_dalek::SigningKey;
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::config::LaunchpadConfig;
use crate::error::LaunchpadError;

// ─── Input ───────────────────────────────────────────────────────────

/// What the holder asked for, as typed into the launch form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub name: String,
    pub symbol: String,
    pub image_uri: String,
    /// Whole tokens to mint to the holder. `None` mints nothing yet.
    #[serde(default)]
    pub initial_supply: Option<u64>,
    /// Extra `(key, value)` pairs stored in the on-chain metadata.
    #[serde(default)]
    pub additional_metadata: Vec<(String, String)>,
}

impl TokenSpec {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        image_uri: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            image_uri: image_uri.into(),
            initial_supply: None,
            additional_metadata: Vec::new(),
        }
    }

    pub fn with_initial_supply(mut self, supply: u64) -> Self {
        self.initial_supply = Some(supply);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_metadata.push((key.into(), value.into()));
        self
    }

    /// Trim, normalise and bound-check the input.
    ///
    /// A zero initial supply is treated like an absent one.
    pub fn validate(&self, config: &LaunchpadConfig) -> Result<ValidatedTokenSpec, LaunchpadError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(LaunchpadError::validation("name", "must not be empty"));
        }

        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(LaunchpadError::validation("symbol", "must not be empty"));
        }
        let symbol_len = symbol.chars().count();
        if symbol_len > config.max_symbol_len {
            return Err(LaunchpadError::validation(
                "symbol",
                format!(
                    "{symbol_len} characters, at most {} allowed",
                    config.max_symbol_len
                ),
            ));
        }

        let image_uri = self.image_uri.trim();
        if image_uri.is_empty() {
            return Err(LaunchpadError::validation("image_uri", "must not be empty"));
        }

        let mint_amount = match self.initial_supply {
            Some(supply) if supply > 0 => Some(base_units(supply, config.decimals)?),
            _ => None,
        };

        for (key, _) in &self.additional_metadata {
            if key.trim().is_empty() {
                return Err(LaunchpadError::validation(
                    "additional_metadata",
                    "keys must not be empty",
                ));
            }
        }

        Ok(ValidatedTokenSpec {
            name: name.to_string(),
            symbol,
            image_uri: image_uri.to_string(),
            initial_supply: mint_amount.and(self.initial_supply),
            mint_amount,
            additional_metadata: self.additional_metadata.clone(),
        })
    }
}

/// Convert whole tokens into base units at `decimals`.
pub fn base_units(supply: u64, decimals: u8) -> Result<u64, LaunchpadError> {
    10u64
        .checked_pow(decimals as u32)
        .and_then(|scale| supply.checked_mul(scale))
        .ok_or_else(|| {
            LaunchpadError::validation(
                "initial_supply",
                format!("{supply} tokens at {decimals} decimals overflow u64 base units"),
            )
        })
}

/// A [`TokenSpec`] that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTokenSpec {
    pub name: String,
    /// Upper-cased.
    pub symbol: String,
    pub image_uri: String,
    /// Whole tokens, present only when strictly positive.
    pub initial_supply: Option<u64>,
    /// `initial_supply` in base units.
    pub mint_amount: Option<u64>,
    pub additional_metadata: Vec<(String, String)>,
}

// ─── Mint identity ───────────────────────────────────────────────────

/// Ephemeral keypair whose public half becomes the mint address.
///
/// Lives only for one launch. [`MintIdentity::co_sign`] consumes it, so the
/// secret signs exactly one transaction and is then dropped (and zeroised).
pub struct MintIdentity {
    key: SigningKey,
}

impl MintIdentity {
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild from a 32-byte seed. For tests only: a real launch, and every
    /// retry of one, uses [`MintIdentity::generate`].
    #[doc(hidden)]
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let mut copy = *seed;
        let key = SigningKey::from_bytes(&copy);
        copy.zeroize();
        Self { key }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.key.verifying_key().to_bytes()
    }

    /// Fill the mint's signature slot in `tx`, consuming the identity.
    pub fn co_sign(self, tx: &mut Transaction) -> Result<(), SolError> {
        tx.partial_sign(&self.key)
    }
}

impl fmt::Debug for MintIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MintIdentity")
            .field("pubkey", &to_base58(&self.pubkey()))
            .finish_non_exhaustive()
    }
}

// ─── Flow state ──────────────────────────────────────────────────────

/// How far a launch got. Each stage is reached when its batch was
/// submitted (and confirmed, in confirmed mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MintStage {
    NotStarted,
    MintCreated,
    AssociatedAccountCreated,
    SupplyMinted,
}

impl fmt::Display for MintStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MintStage::NotStarted => "not-started",
            MintStage::MintCreated => "mint-created",
            MintStage::AssociatedAccountCreated => "associated-account-created",
            MintStage::SupplyMinted => "supply-minted",
        };
        f.write_str(s)
    }
}

/// Observable progress of one launch, reported on partial failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintProgress {
    pub stage: MintStage,
    pub mint_address: Pubkey,
    pub associated_account: Option<Pubkey>,
    /// Signatures of every batch handed to the wallet, in order.
    pub signatures: Vec<Signature>,
}

impl MintProgress {
    pub fn new(mint_address: Pubkey) -> Self {
        Self {
            stage: MintStage::NotStarted,
            mint_address,
            associated_account: None,
            signatures: Vec::new(),
        }
    }
}

// ─── Output ──────────────────────────────────────────────────────────

/// JSON document meant to be hosted at the metadata URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffChainMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub image: String,
}

impl OffChainMetadata {
    pub fn for_token(spec: &ValidatedTokenSpec) -> Self {
        Self {
            name: spec.name.clone(),
            symbol: spec.symbol.clone(),
            description: format!("This is {} token for demonstration purposes.", spec.name),
            image: spec.image_uri.clone(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, LaunchpadError> {
        serde_json::to_string_pretty(self).map_err(|e| LaunchpadError::Encoding(e.to_string()))
    }
}

/// A completed launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintResult {
    pub mint_address: Pubkey,
    pub associated_account: Pubkey,
    pub metadata: TokenMetadata,
    pub offchain_metadata: OffChainMetadata,
    pub stage: MintStage,
    /// Base units minted to the holder, if any.
    pub minted: Option<u64>,
    pub signatures: Vec<Signature>,
}
