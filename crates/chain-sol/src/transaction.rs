//! Legacy Solana transaction wire format with multi-signer support.
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```
//!
//! A transaction holds one signature slot per required signer. Slots are
//! filled independently, so an ephemeral key can co-sign before the
//! transaction is handed to a wallet for the fee payer's signature.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

use crate::address::{to_base58, Pubkey};
use crate::error::SolError;

/// Recent blockhash proving a transaction was assembled recently.
pub type Blockhash = [u8; 32];

/// Raw 64-byte Ed25519 signature.
pub type Signature = [u8; 64];

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` in Solana's compact-u16 (7 bits per byte) format.
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

fn compact_len(len: usize, what: &str) -> Result<Vec<u8>, SolError> {
    let len = u16::try_from(len)
        .map_err(|_| SolError::SerializationError(format!("{what} count {len} exceeds u16")))?;
    Ok(encode_compact_u16(len))
}

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

/// An account reference with its access flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn writable(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// One atomic ledger operation, before compilation into a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// An instruction whose accounts are indices into the message's key list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// The signed portion of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,
    /// Canonical order: writable signers (fee payer first), read-only
    /// signers, writable non-signers, read-only non-signers.
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Blockhash,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compile `instructions` with `fee_payer` at account index 0.
    pub fn compile(
        instructions: &[Instruction],
        fee_payer: &Pubkey,
        recent_blockhash: &Blockhash,
    ) -> Result<Self, SolError> {
        if instructions.is_empty() {
            return Err(SolError::TransactionBuildError(
                "a transaction needs at least one instruction".into(),
            ));
        }

        struct Entry {
            pubkey: Pubkey,
            is_signer: bool,
            is_writable: bool,
        }

        let mut entries: Vec<Entry> = Vec::new();
        let mut upsert = |pubkey: Pubkey, signer: bool, writable: bool| {
            if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
                entry.is_signer |= signer;
                entry.is_writable |= writable;
            } else {
                entries.push(Entry {
                    pubkey,
                    is_signer: signer,
                    is_writable: writable,
                });
            }
        };

        upsert(*fee_payer, true, true);
        for ix in instructions {
            for meta in &ix.accounts {
                upsert(meta.pubkey, meta.is_signer, meta.is_writable);
            }
            upsert(ix.program_id, false, false);
        }

        // Stable sort keeps insertion order inside each class, so the fee
        // payer (inserted first, signer + writable) stays at index 0.
        entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
            (true, true) => 0u8,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        });

        // Indices are u8, so at most 256 keys; header counts are u8 too.
        if entries.len() > u8::MAX as usize + 1 {
            return Err(SolError::TransactionBuildError(format!(
                "{} accounts exceed the 256 addressable by a legacy message",
                entries.len()
            )));
        }
        let signers = entries.iter().filter(|e| e.is_signer).count();
        if signers > u8::MAX as usize {
            return Err(SolError::TransactionBuildError(format!(
                "{signers} signers exceed the 255 a legacy message header can count"
            )));
        }

        let count = |pred: fn(&Entry) -> bool| entries.iter().filter(|e| pred(e)).count() as u8;
        let num_required_signatures = count(|e| e.is_signer);
        let num_readonly_signed = count(|e| e.is_signer && !e.is_writable);
        let num_readonly_unsigned = count(|e| !e.is_signer && !e.is_writable);

        let account_keys: Vec<Pubkey> = entries.iter().map(|e| e.pubkey).collect();
        let index_of = |key: &Pubkey| -> Result<u8, SolError> {
            account_keys
                .iter()
                .position(|k| k == key)
                .map(|i| i as u8)
                .ok_or_else(|| {
                    SolError::TransactionBuildError(format!(
                        "{} missing from account keys",
                        to_base58(key)
                    ))
                })
        };

        let mut compiled = Vec::with_capacity(instructions.len());
        for ix in instructions {
            compiled.push(CompiledInstruction {
                program_id_index: index_of(&ix.program_id)?,
                account_indices: ix
                    .accounts
                    .iter()
                    .map(|meta| index_of(&meta.pubkey))
                    .collect::<Result<Vec<u8>, SolError>>()?,
                data: ix.data.clone(),
            });
        }

        Ok(Self {
            num_required_signatures,
            num_readonly_signed,
            num_readonly_unsigned,
            account_keys,
            recent_blockhash: *recent_blockhash,
            instructions: compiled,
        })
    }

    /// The accounts whose signatures this message requires, in slot order.
    pub fn signer_keys(&self) -> &[Pubkey] {
        &self.account_keys[..self.num_required_signatures as usize]
    }

    pub fn fee_payer(&self) -> Option<&Pubkey> {
        self.account_keys.first()
    }

    /// Serialize the message: these are the bytes every signer signs.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let mut buf = Vec::with_capacity(256);

        buf.push(self.num_required_signatures);
        buf.push(self.num_readonly_signed);
        buf.push(self.num_readonly_unsigned);

        buf.extend_from_slice(&compact_len(self.account_keys.len(), "account")?);
        for key in &self.account_keys {
            buf.extend_from_slice(key);
        }

        buf.extend_from_slice(&self.recent_blockhash);

        buf.extend_from_slice(&compact_len(self.instructions.len(), "instruction")?);
        for ix in &self.instructions {
            buf.push(ix.program_id_index);
            buf.extend_from_slice(&compact_len(ix.account_indices.len(), "account index")?);
            buf.extend_from_slice(&ix.account_indices);
            buf.extend_from_slice(&compact_len(ix.data.len(), "data byte")?);
            buf.extend_from_slice(&ix.data);
        }

        Ok(buf)
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A message plus one (possibly empty) signature slot per required signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<Option<Signature>>,
    pub message: Message,
}

impl Transaction {
    pub fn new_unsigned(message: Message) -> Self {
        let slots = message.num_required_signatures as usize;
        Self {
            signatures: vec![None; slots],
            message,
        }
    }

    /// Compile and wrap `instructions` in one step.
    pub fn from_instructions(
        instructions: &[Instruction],
        fee_payer: &Pubkey,
        recent_blockhash: &Blockhash,
    ) -> Result<Self, SolError> {
        Message::compile(instructions, fee_payer, recent_blockhash).map(Self::new_unsigned)
    }

    /// Sign with `key`, filling the slot that belongs to its public key.
    ///
    /// Fails if the key is not one of the message's required signers.
    pub fn partial_sign(&mut self, key: &SigningKey) -> Result<(), SolError> {
        let pubkey = key.verifying_key().to_bytes();
        let slot = self
            .message
            .signer_keys()
            .iter()
            .position(|k| *k == pubkey)
            .ok_or_else(|| {
                SolError::SigningError(format!(
                    "{} is not a required signer",
                    to_base58(&pubkey)
                ))
            })?;

        let message_bytes = self.message.serialize()?;
        self.signatures[slot] = Some(key.sign(&message_bytes).to_bytes());
        Ok(())
    }

    /// Signer keys whose slot is still empty.
    pub fn missing_signers(&self) -> Vec<Pubkey> {
        self.message
            .signer_keys()
            .iter()
            .zip(&self.signatures)
            .filter(|(_, sig)| sig.is_none())
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn is_fully_signed(&self) -> bool {
        self.signatures.iter().all(Option::is_some)
    }

    /// Check every filled slot against the message bytes; empty slots fail.
    pub fn verify_signatures(&self) -> Result<(), SolError> {
        let message_bytes = self.message.serialize()?;
        for (key, sig) in self.message.signer_keys().iter().zip(&self.signatures) {
            let sig = sig.ok_or_else(|| {
                SolError::SigningError(format!("missing signature for {}", to_base58(key)))
            })?;
            let verifying_key = VerifyingKey::from_bytes(key)
                .map_err(|e| SolError::InvalidPublicKey(e.to_string()))?;
            verifying_key
                .verify(&message_bytes, &ed25519_dalek::Signature::from_bytes(&sig))
                .map_err(|_| {
                    SolError::InvalidSignature(format!("bad signature for {}", to_base58(key)))
                })?;
        }
        Ok(())
    }

    /// The first signature, used by the ledger as the transaction id.
    pub fn id(&self) -> Option<Signature> {
        self.signatures.first().copied().flatten()
    }

    /// Serialize to wire format. Every slot must be filled.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let message_bytes = self.message.serialize()?;
        let mut wire = Vec::with_capacity(3 + 64 * self.signatures.len() + message_bytes.len());

        wire.extend_from_slice(&compact_len(self.signatures.len(), "signature")?);
        for (key, sig) in self.message.signer_keys().iter().zip(&self.signatures) {
            let sig = sig.ok_or_else(|| {
                SolError::SerializationError(format!(
                    "signature slot for {} is empty",
                    to_base58(key)
                ))
            })?;
            wire.extend_from_slice(&sig);
        }
        wire.extend_from_slice(&message_bytes);

        Ok(wire)
    }
}
