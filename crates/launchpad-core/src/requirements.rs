//! Space and funding needed by a new mint account.

use std::collections::BTreeSet;

use chain_sol::{compute_mint_layout, ExtensionType};
use tracing::debug;

use crate::connector::LedgerConnector;
use crate::error::LaunchpadError;

/// Storage and funding for one mint attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountRequirements {
    /// Bytes allocated at creation (base mint plus fixed extensions).
    pub space_bytes: u64,
    /// Bytes the account grows to once metadata is written.
    pub funded_bytes: u64,
    /// Rent-exempt minimum for `funded_bytes`.
    pub minimum_lamports: u64,
}

/// Size the mint and ask the ledger what rent exemption costs right now.
///
/// The lamport figure is fetched on every call: the rent schedule may change
/// between attempts.
pub async fn compute_account_requirements(
    ledger: &dyn LedgerConnector,
    extensions: &BTreeSet<ExtensionType>,
    metadata_tlv_len: usize,
) -> Result<AccountRequirements, LaunchpadError> {
    let layout = compute_mint_layout(extensions, metadata_tlv_len)?;
    let minimum_lamports = ledger
        .get_minimum_balance_for_rent_exemption(layout.funded_bytes())
        .await?;

    debug!(
        space = layout.space_bytes,
        funded = layout.funded_bytes(),
        lamports = minimum_lamports,
        "computed mint account requirements"
    );

    Ok(AccountRequirements {
        space_bytes: layout.space_bytes as u64,
        funded_bytes: layout.funded_bytes() as u64,
        minimum_lamports,
    })
}
