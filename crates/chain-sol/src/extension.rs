//! Token-2022 mint account sizing and rent exemption.
//!
//! A plain mint is 82 bytes. As soon as any extension is present the account
//! is padded to the 165-byte token-account length, followed by a one-byte
//! account-type tag and a TLV entry per extension:
//!
//! ```text
//! [mint 82][padding 83][account type 1][type u16 | len u16 | value] ...
//! ```

use std::collections::BTreeSet;

use crate::error::SolError;
use crate::metadata::{LENGTH_SIZE, TYPE_SIZE};

/// Size of a mint without extensions.
pub const MINT_SIZE: usize = 82;

/// Size of a token account; extended mints are padded to this length.
pub const BASE_ACCOUNT_SIZE: usize = 165;

/// Size of the account-type tag that precedes the TLV area.
pub const ACCOUNT_TYPE_SIZE: usize = 1;

/// Size of a multisig account. An extended mint of exactly this length
/// would be ambiguous, so it gets two extra bytes.
const MULTISIG_SIZE: usize = 355;

/// Largest TLV entry representable with a u16 length field.
pub const MAX_EXTENSION_TLV_SIZE: usize = TYPE_SIZE + LENGTH_SIZE + u16::MAX as usize;

/// Storage overhead charged per account on top of its data.
pub const ACCOUNT_STORAGE_OVERHEAD: u64 = 128;

/// Fixed-size mint extensions the launchpad can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtensionType {
    MintCloseAuthority,
    NonTransferable,
    PermanentDelegate,
    MetadataPointer,
}

impl ExtensionType {
    /// Discriminant stored in the TLV type field.
    pub fn tag(self) -> u16 {
        match self {
            ExtensionType::MintCloseAuthority => 3,
            ExtensionType::NonTransferable => 9,
            ExtensionType::PermanentDelegate => 12,
            ExtensionType::MetadataPointer => 18,
        }
    }

    /// Size of the extension's value.
    pub fn value_size(self) -> usize {
        match self {
            ExtensionType::MintCloseAuthority => 32,
            ExtensionType::NonTransferable => 0,
            ExtensionType::PermanentDelegate => 32,
            // authority + metadata address
            ExtensionType::MetadataPointer => 64,
        }
    }

    fn tlv_size(self) -> usize {
        TYPE_SIZE + LENGTH_SIZE + self.value_size()
    }
}

/// Storage layout of a mint account about to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintLayout {
    /// Bytes allocated by the create-account instruction.
    pub space_bytes: usize,
    /// Bytes the metadata TLV entry will add when it is written.
    pub metadata_bytes: usize,
}

impl MintLayout {
    /// Final account size, which rent exemption must cover.
    pub fn funded_bytes(&self) -> usize {
        self.space_bytes + self.metadata_bytes
    }
}

/// Size of a mint carrying `extensions`.
pub fn mint_len(extensions: &BTreeSet<ExtensionType>) -> usize {
    if extensions.is_empty() {
        return MINT_SIZE;
    }
    let len = BASE_ACCOUNT_SIZE
        + ACCOUNT_TYPE_SIZE
        + extensions.iter().map(|e| e.tlv_size()).sum::<usize>();
    if len == MULTISIG_SIZE {
        len + TYPE_SIZE
    } else {
        len
    }
}

/// Compute the layout of a mint with `extensions` whose metadata TLV entry
/// will be `metadata_tlv_len` bytes.
pub fn compute_mint_layout(
    extensions: &BTreeSet<ExtensionType>,
    metadata_tlv_len: usize,
) -> Result<MintLayout, SolError> {
    if metadata_tlv_len > MAX_EXTENSION_TLV_SIZE {
        return Err(SolError::SizeComputationError(format!(
            "metadata entry is {metadata_tlv_len} bytes, at most {MAX_EXTENSION_TLV_SIZE} fit"
        )));
    }
    if metadata_tlv_len > 0 && !extensions.contains(&ExtensionType::MetadataPointer) {
        return Err(SolError::SizeComputationError(
            "embedded metadata requires the metadata pointer extension".into(),
        ));
    }
    Ok(MintLayout {
        space_bytes: mint_len(extensions),
        metadata_bytes: metadata_tlv_len,
    })
}

/// Rent parameters, mirroring the ledger's rent sysvar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RentSchedule {
    pub lamports_per_byte_year: u64,
    pub exemption_threshold_years: f64,
}

impl Default for RentSchedule {
    fn default() -> Self {
        Self {
            lamports_per_byte_year: 3_480,
            exemption_threshold_years: 2.0,
        }
    }
}

impl RentSchedule {
    /// Minimum balance for an account of `data_len` bytes to be rent exempt.
    ///
    /// Saturates at `u64::MAX` rather than wrapping.
    pub fn minimum_balance(&self, data_len: usize) -> u64 {
        let bytes = ACCOUNT_STORAGE_OVERHEAD.saturating_add(data_len as u64);
        let per_year = bytes.saturating_mul(self.lamports_per_byte_year);
        (per_year as f64 * self.exemption_threshold_years) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(extensions: &[ExtensionType]) -> BTreeSet<ExtensionType> {
        extensions.iter().copied().collect()
    }

    #[test]
    fn plain_mint_is_82_bytes() {
        assert_eq!(mint_len(&BTreeSet::new()), 82);
    }

    #[test]
    fn metadata_pointer_mint_is_234_bytes() {
        assert_eq!(mint_len(&set(&[ExtensionType::MetadataPointer])), 234);
    }

    #[test]
    fn extensions_add_their_tlv_size() {
        let len = mint_len(&set(&[
            ExtensionType::MetadataPointer,
            ExtensionType::MintCloseAuthority,
            ExtensionType::NonTransferable,
        ]));
        assert_eq!(len, 166 + 68 + 36 + 4);
    }

    #[test]
    fn layout_is_pure() {
        let extensions = set(&[ExtensionType::MetadataPointer]);
        let a = compute_mint_layout(&extensions, 150).unwrap();
        let b = compute_mint_layout(&extensions, 150).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.space_bytes, 234);
        assert_eq!(a.funded_bytes(), 384);
    }

    #[test]
    fn oversized_metadata_is_rejected() {
        let extensions = set(&[ExtensionType::MetadataPointer]);
        assert!(compute_mint_layout(&extensions, MAX_EXTENSION_TLV_SIZE).is_ok());
        let err = compute_mint_layout(&extensions, MAX_EXTENSION_TLV_SIZE + 1).unwrap_err();
        assert!(matches!(err, SolError::SizeComputationError(_)));
    }

    #[test]
    fn metadata_without_pointer_is_rejected() {
        assert!(compute_mint_layout(&BTreeSet::new(), 100).is_err());
        assert!(compute_mint_layout(&BTreeSet::new(), 0).is_ok());
    }

    #[test]
    fn default_rent_matches_ledger() {
        // 82-byte mint on mainnet costs 1_461_600 lamports.
        assert_eq!(RentSchedule::default().minimum_balance(82), 1_461_600);
    }

    #[test]
    fn extreme_rent_schedule_saturates() {
        let rent = RentSchedule {
            lamports_per_byte_year: u64::MAX,
            exemption_threshold_years: 2.0,
        };
        assert_eq!(rent.minimum_balance(82), u64::MAX);
        assert_eq!(RentSchedule::default().minimum_balance(usize::MAX), u64::MAX);
    }

    #[test]
    fn rent_is_monotonic_in_size() {
        let rent = RentSchedule::default();
        let mut previous = 0;
        for size in (0..2_000).step_by(17) {
            let balance = rent.minimum_balance(size);
            assert!(balance >= previous);
            previous = balance;
        }
    }
}
