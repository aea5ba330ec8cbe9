//! Proving key ownership by signing text.
//!
//! Signing goes through the wallet; the returned signature is checked
//! locally before anyone sees it, so a faulty wallet cannot hand out a
//! signature that does not verify. Verification is purely local.

use chain_sol::{decode_signature, encode_signature, verify_message, Pubkey};
use tracing::{debug, warn};

use crate::connector::WalletConnector;
use crate::error::LaunchpadError;

/// Sign `message` (as UTF-8) with the connected wallet and return the
/// Base58 signature.
pub async fn sign_text(
    message: &str,
    wallet: &dyn WalletConnector,
) -> Result<String, LaunchpadError> {
    let pubkey = wallet
        .public_key()
        .ok_or_else(|| LaunchpadError::validation("wallet", "no wallet connected"))?;
    if message.trim().is_empty() {
        return Err(LaunchpadError::validation("message", "must not be empty"));
    }

    let bytes = message.as_bytes();
    let signature = wallet.sign_message(bytes).await?;

    let valid = verify_message(bytes, &signature, &pubkey)
        .map_err(|e| LaunchpadError::SignatureIntegrity(e.to_string()))?;
    if !valid {
        warn!("wallet returned a signature that does not verify");
        return Err(LaunchpadError::SignatureIntegrity(
            "wallet signature does not match the connected public key".into(),
        ));
    }

    debug!(len = bytes.len(), "message signed and verified");
    Ok(encode_signature(&signature))
}

/// Check a Base58 `signature` over `message` against `pubkey`.
///
/// Malformed Base58 (or the wrong length) is an error, not `false`.
pub fn verify_text(
    message: &str,
    signature: &str,
    pubkey: &Pubkey,
) -> Result<bool, LaunchpadError> {
    let signature =
        decode_signature(signature).map_err(|e| LaunchpadError::MalformedSignature(e.to_string()))?;
    Ok(verify_message(message.as_bytes(), &signature, pubkey)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_sol::sign_message;
    use ed25519_dalek::SigningKey;

    fn key() -> SigningKey {
        SigningKey::from_bytes(&[42u8; 32])
    }

    #[test]
    fn verify_accepts_matching_signature() {
        let key = key();
        let sig = encode_signature(&sign_message(&key, "hello".as_bytes()));
        let pubkey = key.verifying_key().to_bytes();

        assert!(verify_text("hello", &sig, &pubkey).unwrap());
        assert!(!verify_text("goodbye", &sig, &pubkey).unwrap());
    }

    #[test]
    fn verify_rejects_malformed_base58() {
        let pubkey = key().verifying_key().to_bytes();
        assert!(matches!(
            verify_text("hello", "not base58 0OIl", &pubkey),
            Err(LaunchpadError::MalformedSignature(_))
        ));
        assert!(matches!(
            verify_text("hello", "abc", &pubkey),
            Err(LaunchpadError::MalformedSignature(_))
        ));
    }

    #[test]
    fn verify_handles_unicode() {
        let key = key();
        let message = "gm \u{1f680} wagmi";
        let sig = encode_signature(&sign_message(&key, message.as_bytes()));
        assert!(verify_text(message, &sig, &key.verifying_key().to_bytes()).unwrap());
    }
}
