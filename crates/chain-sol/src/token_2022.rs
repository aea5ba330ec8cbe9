//! Token-2022 and Associated Token Account instructions.
//!
//! Encoded by hand, without `spl-token-2022`. Token instructions start with
//! a one-byte `TokenInstruction` index; token-metadata interface
//! instructions start with an 8-byte discriminator (the first 8 bytes of
//! `SHA-256("spl_token_metadata_interface:<name>")`) followed by Borsh data.

use crate::address::{find_program_address, Pubkey};
use crate::error::SolError;
use crate::system::SYSTEM_PROGRAM_ID;
use crate::transaction::{AccountMeta, Instruction};

// ---------------------------------------------------------------------------
// Well-known program IDs
// ---------------------------------------------------------------------------

/// Token-2022 program: `TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb`
pub const TOKEN_2022_PROGRAM_ID: Pubkey = [
    0x06, 0xdd, 0xf6, 0xe1, 0xee, 0x75, 0x8f, 0xde, 0x18, 0x42, 0x5d, 0xbc, 0xe4, 0x6c, 0xcd,
    0xda, 0xb6, 0x1a, 0xfc, 0x4d, 0x83, 0xb9, 0x0d, 0x27, 0xfe, 0xbd, 0xf9, 0x28, 0xd8, 0xa1,
    0x8b, 0xfc,
];

/// Associated Token Account program: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = [
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
];

/// Rent sysvar: `SysvarRent111111111111111111111111111111111`
pub const RENT_SYSVAR_ID: Pubkey = [
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x2c, 0x5c, 0x51, 0x21, 0x8c, 0xc9, 0x4c, 0x3d, 0x4a, 0xf1,
    0x7f, 0x58, 0xda, 0xee, 0x08, 0x9b, 0xa1, 0xfd, 0x44, 0xe3, 0xdb, 0xd9, 0x8a, 0x00, 0x00,
    0x00, 0x00,
];

// ---------------------------------------------------------------------------
// Instruction tags
// ---------------------------------------------------------------------------

const INITIALIZE_MINT: u8 = 0;
const MINT_TO: u8 = 7;
const METADATA_POINTER_EXTENSION: u8 = 39;
const METADATA_POINTER_INITIALIZE: u8 = 0;

/// `spl_token_metadata_interface:initialize_account`
const METADATA_INITIALIZE_DISCRIMINATOR: [u8; 8] = [0xd2, 0xe1, 0x1e, 0xa2, 0x58, 0xb8, 0x4d, 0x8d];

/// `spl_token_metadata_interface:updating_field`
const METADATA_UPDATE_FIELD_DISCRIMINATOR: [u8; 8] =
    [0xdd, 0xe9, 0x31, 0x2d, 0xb5, 0xca, 0xdc, 0xc8];

/// A token-metadata field addressed by `UpdateField`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataField {
    Name,
    Symbol,
    Uri,
    Key(String),
}

// ---------------------------------------------------------------------------
// Mint instructions
// ---------------------------------------------------------------------------

/// `InitializeMetadataPointer`: record where the mint's metadata lives.
///
/// Must run after the account is created and before `InitializeMint`.
/// `None` for either key is encoded as 32 zero bytes.
pub fn initialize_metadata_pointer(
    mint: &Pubkey,
    authority: Option<&Pubkey>,
    metadata_address: Option<&Pubkey>,
) -> Instruction {
    let mut data = Vec::with_capacity(66);
    data.push(METADATA_POINTER_EXTENSION);
    data.push(METADATA_POINTER_INITIALIZE);
    data.extend_from_slice(authority.unwrap_or(&[0u8; 32]));
    data.extend_from_slice(metadata_address.unwrap_or(&[0u8; 32]));

    Instruction {
        program_id: TOKEN_2022_PROGRAM_ID,
        accounts: vec![AccountMeta::writable(*mint, false)],
        data,
    }
}

/// `InitializeMint`: fix decimals and authorities.
pub fn initialize_mint(
    mint: &Pubkey,
    decimals: u8,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
) -> Instruction {
    // tag + decimals + authority + COption<Pubkey> (u8 flag + 32 bytes).
    let mut data = Vec::with_capacity(67);
    data.push(INITIALIZE_MINT);
    data.push(decimals);
    data.extend_from_slice(mint_authority);
    match freeze_authority {
        Some(key) => {
            data.push(1);
            data.extend_from_slice(key);
        }
        None => {
            data.push(0);
            data.extend_from_slice(&[0u8; 32]);
        }
    }

    Instruction {
        program_id: TOKEN_2022_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*mint, false),
            AccountMeta::readonly(RENT_SYSVAR_ID, false),
        ],
        data,
    }
}

/// Token-metadata `Initialize`: write name, symbol and uri into `metadata`
/// (the mint itself when the pointer targets the mint).
pub fn initialize_metadata(
    metadata: &Pubkey,
    update_authority: &Pubkey,
    mint: &Pubkey,
    mint_authority: &Pubkey,
    name: &str,
    symbol: &str,
    uri: &str,
) -> Result<Instruction, SolError> {
    let mut data = Vec::with_capacity(8 + 12 + name.len() + symbol.len() + uri.len());
    data.extend_from_slice(&METADATA_INITIALIZE_DISCRIMINATOR);
    borsh_string(&mut data, name)?;
    borsh_string(&mut data, symbol)?;
    borsh_string(&mut data, uri)?;

    Ok(Instruction {
        program_id: TOKEN_2022_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*metadata, false),
            AccountMeta::readonly(*update_authority, false),
            AccountMeta::readonly(*mint, false),
            AccountMeta::readonly(*mint_authority, true),
        ],
        data,
    })
}

/// Token-metadata `UpdateField`: set one field, adding `Key` fields that do
/// not exist yet.
pub fn update_metadata_field(
    metadata: &Pubkey,
    update_authority: &Pubkey,
    field: &MetadataField,
    value: &str,
) -> Result<Instruction, SolError> {
    let mut data = Vec::with_capacity(8 + 1 + 8 + value.len());
    data.extend_from_slice(&METADATA_UPDATE_FIELD_DISCRIMINATOR);
    match field {
        MetadataField::Name => data.push(0),
        MetadataField::Symbol => data.push(1),
        MetadataField::Uri => data.push(2),
        MetadataField::Key(key) => {
            data.push(3);
            borsh_string(&mut data, key)?;
        }
    }
    borsh_string(&mut data, value)?;

    Ok(Instruction {
        program_id: TOKEN_2022_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*metadata, false),
            AccountMeta::readonly(*update_authority, true),
        ],
        data,
    })
}

/// `MintTo`: create `amount` base units into `destination`.
pub fn mint_to(
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Result<Instruction, SolError> {
    if amount == 0 {
        return Err(SolError::TransactionBuildError(
            "mint amount must be > 0".into(),
        ));
    }

    let mut data = Vec::with_capacity(9);
    data.push(MINT_TO);
    data.extend_from_slice(&amount.to_le_bytes());

    Ok(Instruction {
        program_id: TOKEN_2022_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*mint, false),
            AccountMeta::writable(*destination, false),
            AccountMeta::readonly(*authority, true),
        ],
        data,
    })
}

// ---------------------------------------------------------------------------
// Associated token accounts
// ---------------------------------------------------------------------------

/// Derive the associated token account of `wallet` for `mint` under
/// `token_program_id`.
///
/// Seeds are `[wallet, token_program_id, mint]` under the Associated Token
/// Account program. Pure: no network access.
pub fn derive_associated_token_address(
    wallet: &Pubkey,
    mint: &Pubkey,
    token_program_id: &Pubkey,
) -> Result<Pubkey, SolError> {
    find_program_address(
        &[wallet.as_ref(), token_program_id.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Associated Token Account `Create` (empty instruction data).
pub fn create_associated_token_account(
    payer: &Pubkey,
    associated_account: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
    token_program_id: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*payer, true),
            AccountMeta::writable(*associated_account, false),
            AccountMeta::readonly(*wallet, false),
            AccountMeta::readonly(*mint, false),
            AccountMeta::readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::readonly(*token_program_id, false),
        ],
        data: Vec::new(),
    }
}

fn borsh_string(out: &mut Vec<u8>, value: &str) -> Result<(), SolError> {
    let len = u32::try_from(value.len()).map_err(|_| {
        SolError::EncodingError(format!("string of {} bytes overflows u32", value.len()))
    })?;
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(value.as_bytes());
    Ok(())
}
