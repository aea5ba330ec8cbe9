//! Solana chain support for the token launchpad.
//!
//! Address and PDA derivation, the legacy transaction wire format with
//! multi-signer slots, and the System / Token-2022 / Associated Token
//! Account instructions needed to launch a token with embedded metadata.
//! Nothing here performs I/O.
//!
//! Like the rest of the workspace this avoids `solana-sdk`; the wire
//! formats are implemented by hand on top of `ed25519-dalek` and `bs58`.

pub mod address;
pub mod error;
pub mod extension;
pub mod message;
pub mod metadata;
pub mod system;
pub mod token_2022;
pub mod transaction;

pub use address::{find_program_address, from_base58, to_base58, Pubkey};
pub use error::SolError;
pub use extension::{compute_mint_layout, mint_len, ExtensionType, MintLayout, RentSchedule};
pub use message::{decode_signature, encode_signature, sign_message, verify_message};
pub use metadata::TokenMetadata;
pub use system::{create_account, SYSTEM_PROGRAM_ID};
pub use token_2022::{
    create_associated_token_account, derive_associated_token_address, initialize_metadata,
    initialize_metadata_pointer, initialize_mint, mint_to, update_metadata_field, MetadataField,
    ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_2022_PROGRAM_ID,
};
pub use transaction::{
    encode_compact_u16, AccountMeta, Blockhash, CompiledInstruction, Instruction, Message,
    Signature, Transaction,
};
