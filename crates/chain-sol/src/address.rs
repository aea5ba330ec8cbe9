//! Solana addresses and program-derived addresses (PDAs).
//!
//! An address is the raw 32-byte Ed25519 public key, shown to users as
//! Base58. PDAs are SHA-256 digests that are deliberately *off* the Ed25519
//! curve, so no private key can ever exist for them.

use sha2::{Digest, Sha256};

use crate::error::SolError;

/// A 32-byte Solana account address.
pub type Pubkey = [u8; 32];

/// Suffix hashed into every PDA derivation.
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Render an address as Base58.
pub fn to_base58(pubkey: &Pubkey) -> String {
    bs58::encode(pubkey).into_string()
}

/// Parse a Base58 address string into its 32 bytes.
pub fn from_base58(address: &str) -> Result<Pubkey, SolError> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })
}

/// Find the canonical PDA for `seeds` under `program_id`.
///
/// Bump seeds are tried from 255 down to 0; the first digest
/// `SHA-256(seeds || bump || program_id || "ProgramDerivedAddress")` that
/// does not decompress to a curve point wins.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), SolError> {
    for bump in (0u8..=255).rev() {
        if let Some(address) = create_program_address(seeds, bump, program_id) {
            return Ok((address, bump));
        }
    }

    Err(SolError::InvalidAddress(
        "could not find valid PDA bump seed".into(),
    ))
}

fn create_program_address(seeds: &[&[u8]], bump: u8, program_id: &Pubkey) -> Option<Pubkey> {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.update(program_id);
    hasher.update(PDA_MARKER);

    let hash: Pubkey = hasher.finalize().into();
    if is_on_curve(&hash) {
        return None;
    }
    Some(hash)
}

/// Whether `bytes` decompress to a valid Ed25519 point.
pub fn is_on_curve(bytes: &Pubkey) -> bool {
    curve25519_dalek::edwards::CompressedEdwardsY(*bytes)
        .decompress()
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_program_is_all_ones() {
        assert_eq!(to_base58(&[0u8; 32]), "11111111111111111111111111111111");
    }

    #[test]
    fn parse_well_known_program() {
        let address = "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb";
        let bytes = from_base58(address).unwrap();
        assert_eq!(to_base58(&bytes), address);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(from_base58("not-a-valid-address!!!").is_err());
    }

    #[test]
    fn parse_rejects_wrong_length() {
        // "1" decodes to a single zero byte.
        let err = from_base58("1").unwrap_err();
        assert!(err.to_string().contains("expected 32 bytes, got 1"));
    }

    #[test]
    fn pda_is_off_curve_and_stable() {
        let program = [7u8; 32];
        let (a, bump_a) = find_program_address(&[b"seed", &[1u8; 32]], &program).unwrap();
        let (b, bump_b) = find_program_address(&[b"seed", &[1u8; 32]], &program).unwrap();
        assert_eq!(a, b);
        assert_eq!(bump_a, bump_b);
        assert!(!is_on_curve(&a));
    }

    #[test]
    fn pda_changes_with_program() {
        let (a, _) = find_program_address(&[b"seed"], &[1u8; 32]).unwrap();
        let (b, _) = find_program_address(&[b"seed"], &[2u8; 32]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn basepoint_is_on_curve() {
        let mut basepoint = [0x66u8; 32];
        basepoint[0] = 0x58;
        assert!(is_on_curve(&basepoint));
    }
}
