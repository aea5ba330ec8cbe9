//! System Program instructions.

use crate::address::Pubkey;
use crate::transaction::{AccountMeta, Instruction};

/// The System Program: 32 zero bytes, `11111111111111111111111111111111`.
pub const SYSTEM_PROGRAM_ID: Pubkey = [0u8; 32];

/// `CreateAccount` instruction index (u32 LE).
const CREATE_ACCOUNT_IX_INDEX: u32 = 0;

/// Build a `CreateAccount` instruction.
///
/// Moves `lamports` from `payer` into `new_account`, allocates `space`
/// bytes and assigns the account to `owner`. Both `payer` and
/// `new_account` must sign.
pub fn create_account(
    payer: &Pubkey,
    new_account: &Pubkey,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
) -> Instruction {
    // u32 index + u64 lamports + u64 space + 32-byte owner = 52 bytes.
    let mut data = Vec::with_capacity(52);
    data.extend_from_slice(&CREATE_ACCOUNT_IX_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());
    data.extend_from_slice(owner);

    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*payer, true),
            AccountMeta::writable(*new_account, true),
        ],
        data,
    }
}
