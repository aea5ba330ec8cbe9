//! Off-chain message signatures.
//!
//! Wallets sign arbitrary text as raw UTF-8 bytes with the account's Ed25519
//! key; signatures travel as Base58 strings.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

use crate::address::Pubkey;
use crate::error::SolError;
use crate::transaction::Signature;

/// Sign `message` with `key`.
pub fn sign_message(key: &SigningKey, message: &[u8]) -> Signature {
    key.sign(message).to_bytes()
}

/// Check `signature` over `message` against `pubkey`.
///
/// A well-formed but wrong signature is `Ok(false)`; a public key that is
/// not a curve point is an error.
pub fn verify_message(
    message: &[u8],
    signature: &Signature,
    pubkey: &Pubkey,
) -> Result<bool, SolError> {
    let verifying_key =
        VerifyingKey::from_bytes(pubkey).map_err(|e| SolError::InvalidPublicKey(e.to_string()))?;
    let signature = ed25519_dalek::Signature::from_bytes(signature);
    Ok(verifying_key.verify(message, &signature).is_ok())
}

/// Base58 form of a signature.
pub fn encode_signature(signature: &Signature) -> String {
    bs58::encode(signature).into_string()
}

/// Parse a Base58 signature, requiring exactly 64 bytes.
pub fn decode_signature(encoded: &str) -> Result<Signature, SolError> {
    let bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|e| SolError::InvalidSignature(format!("base58 decode failed: {e}")))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidSignature(format!("expected 64 bytes, got {}", v.len()))
    })
}
