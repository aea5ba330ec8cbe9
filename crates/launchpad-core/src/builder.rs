//! Pure construction of the launch instructions.
//!
//! Nothing here touches the network; identical inputs give byte-identical
//! instructions.

use std::collections::BTreeSet;

use chain_sol::{
    create_account, create_associated_token_account, derive_associated_token_address,
    initialize_metadata, initialize_metadata_pointer, initialize_mint, mint_to,
    update_metadata_field, ExtensionType, Instruction, MetadataField, Pubkey, TokenMetadata,
    TOKEN_2022_PROGRAM_ID,
};

use crate::error::LaunchpadError;
use crate::requirements::AccountRequirements;
use crate::types::ValidatedTokenSpec;

/// Extensions every launched mint carries.
pub fn mint_extensions() -> BTreeSet<ExtensionType> {
    BTreeSet::from([ExtensionType::MetadataPointer])
}

/// The on-chain metadata record for `spec`, with `payer` as update
/// authority.
pub fn metadata_record(
    spec: &ValidatedTokenSpec,
    mint: &Pubkey,
    payer: &Pubkey,
    uri: String,
) -> TokenMetadata {
    TokenMetadata {
        update_authority: Some(*payer),
        mint: *mint,
        name: spec.name.clone(),
        symbol: spec.symbol.clone(),
        uri,
        additional_metadata: spec.additional_metadata.clone(),
    }
}

/// Batch 1: create the mint account, point it at itself for metadata,
/// initialise it, then write the metadata.
///
/// Order matters: the pointer must precede `InitializeMint`, and metadata
/// can only be written to an initialised mint. Additional fields follow as
/// `UpdateField` instructions.
pub fn build_mint_instructions(
    metadata: &TokenMetadata,
    payer: &Pubkey,
    requirements: &AccountRequirements,
    decimals: u8,
) -> Result<Vec<Instruction>, LaunchpadError> {
    let mint = &metadata.mint;

    let mut instructions = vec![
        create_account(
            payer,
            mint,
            requirements.minimum_lamports,
            requirements.space_bytes,
            &TOKEN_2022_PROGRAM_ID,
        ),
        initialize_metadata_pointer(mint, Some(payer), Some(mint)),
        initialize_mint(mint, decimals, payer, None),
        initialize_metadata(
            mint,
            payer,
            mint,
            payer,
            &metadata.name,
            &metadata.symbol,
            &metadata.uri,
        )?,
    ];

    for (key, value) in &metadata.additional_metadata {
        instructions.push(update_metadata_field(
            mint,
            payer,
            &MetadataField::Key(key.clone()),
            value,
        )?);
    }

    Ok(instructions)
}

/// Address of `owner`'s token account for `mint`.
pub fn derive_associated_account_address(
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<Pubkey, LaunchpadError> {
    Ok(derive_associated_token_address(
        owner,
        mint,
        &TOKEN_2022_PROGRAM_ID,
    )?)
}

/// Batch 2: create `owner`'s associated token account, paid by `owner`.
pub fn build_associated_account_instruction(
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<(Pubkey, Instruction), LaunchpadError> {
    let associated = derive_associated_account_address(owner, mint)?;
    let ix = create_associated_token_account(
        owner,
        &associated,
        owner,
        mint,
        &TOKEN_2022_PROGRAM_ID,
    );
    Ok((associated, ix))
}

/// Batch 3: mint `amount` base units. Only built for a positive amount.
pub fn build_mint_to_instruction(
    mint: &Pubkey,
    associated_account: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Result<Instruction, LaunchpadError> {
    Ok(mint_to(mint, associated_account, authority, amount)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_sol::{ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID};

    use crate::config::{LaunchpadConfig, MetadataUriSource};
    use crate::types::TokenSpec;

    const MINT: Pubkey = [0x11; 32];
    const PAYER: Pubkey = [0x22; 32];

    fn requirements() -> AccountRequirements {
        AccountRequirements {
            space_bytes: 234,
            funded_bytes: 400,
            minimum_lamports: 3_674_160,
        }
    }

    fn record(spec: TokenSpec) -> TokenMetadata {
        let config = LaunchpadConfig::new(MetadataUriSource::ImageUri);
        let valid = spec.validate(&config).unwrap();
        metadata_record(&valid, &MINT, &PAYER, valid.image_uri.clone())
    }

    #[test]
    fn mint_batch_order_and_programs() {
        let metadata = record(TokenSpec::new("Demo Coin", "dmc", "https://x/y.png"));
        let ixs = build_mint_instructions(&metadata, &PAYER, &requirements(), 9).unwrap();

        assert_eq!(ixs.len(), 4);
        assert_eq!(ixs[0].program_id, SYSTEM_PROGRAM_ID);
        assert!(ixs[1..].iter().all(|ix| ix.program_id == TOKEN_2022_PROGRAM_ID));
        assert_eq!(&ixs[1].data[..2], &[39, 0]);
        assert_eq!(ixs[2].data[0], 0);
        assert_eq!(ixs[2].data[1], 9);
        assert_eq!(ixs[3].data.len(), 8 + (4 + 9) + (4 + 3) + (4 + 15));
    }

    #[test]
    fn create_account_uses_requirements() {
        let metadata = record(TokenSpec::new("Demo Coin", "DMC", "https://x/y.png"));
        let ixs = build_mint_instructions(&metadata, &PAYER, &requirements(), 9).unwrap();

        let data = &ixs[0].data;
        assert_eq!(&data[4..12], &3_674_160u64.to_le_bytes());
        assert_eq!(&data[12..20], &234u64.to_le_bytes());
        assert_eq!(&data[20..], &TOKEN_2022_PROGRAM_ID);
        assert_eq!(ixs[0].accounts[1].pubkey, MINT);
    }

    #[test]
    fn additional_fields_become_update_instructions() {
        let metadata = record(
            TokenSpec::new("Demo Coin", "DMC", "https://x/y.png")
                .with_field("website", "https://demo.example")
                .with_field("twitter", "@demo"),
        );
        let ixs = build_mint_instructions(&metadata, &PAYER, &requirements(), 9).unwrap();
        assert_eq!(ixs.len(), 6);
        assert_eq!(ixs[4].data[8], 3);
        assert_eq!(&ixs[4].data[13..20], b"website");
    }

    #[test]
    fn mint_batch_is_deterministic() {
        let metadata = record(TokenSpec::new("Demo Coin", "DMC", "https://x/y.png"));
        let a = build_mint_instructions(&metadata, &PAYER, &requirements(), 9).unwrap();
        let b = build_mint_instructions(&metadata, &PAYER, &requirements(), 9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn associated_account_instruction_targets_derived_address() {
        let (address, ix) = build_associated_account_instruction(&PAYER, &MINT).unwrap();
        assert_eq!(address, derive_associated_account_address(&PAYER, &MINT).unwrap());
        assert_eq!(ix.program_id, ASSOCIATED_TOKEN_PROGRAM_ID);
        assert_eq!(ix.accounts[1].pubkey, address);
        assert_eq!(ix.accounts[3].pubkey, MINT);
    }

    #[test]
    fn mint_to_requires_positive_amount() {
        let ata = derive_associated_account_address(&PAYER, &MINT).unwrap();
        let ix = build_mint_to_instruction(&MINT, &ata, &PAYER, 1_000_000_000_000).unwrap();
        assert_eq!(&ix.data[1..], &1_000_000_000_000u64.to_le_bytes());
        assert!(build_mint_to_instruction(&MINT, &ata, &PAYER, 0).is_err());
    }
}
