//! In-memory ledger and wallet used by the integration tests.
//!
//! The wallet signs with a real Ed25519 key, the "ledger" verifies every
//! signature and applies the few instructions a launch uses, so ordering
//! mistakes (initialising a mint that does not exist, minting into a
//! missing account) fail the same way they would on chain.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chain_sol::{
    derive_associated_token_address, sign_message, Blockhash, Pubkey, RentSchedule, Signature,
    Transaction, ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_2022_PROGRAM_ID,
};
use ed25519_dalek::SigningKey;
use launchpad_core::{ConnectorError, LedgerConnector, WalletConnector};

pub const BLOCKHASH: Blockhash = [0x5A; 32];

#[derive(Debug, Clone)]
pub struct Account {
    pub lamports: u64,
    pub space: u64,
    pub owner: Pubkey,
}

#[derive(Debug, Clone)]
pub struct LedgerState {
    pub rent: RentSchedule,
    pub accounts: HashMap<Pubkey, Account>,
    pub mints: HashSet<Pubkey>,
    pub token_accounts: HashMap<Pubkey, u64>,
    pub landed: HashSet<Signature>,
    /// Every connector call, in order.
    pub events: Vec<String>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            rent: RentSchedule::default(),
            accounts: HashMap::new(),
            mints: HashSet::new(),
            token_accounts: HashMap::new(),
            landed: HashSet::new(),
            events: Vec::new(),
        }
    }
}

pub type SharedState = Arc<Mutex<LedgerState>>;

pub struct FakeLedger {
    pub state: SharedState,
    /// Report landed transactions as confirmed.
    pub confirms: bool,
}

#[async_trait]
impl LedgerConnector for FakeLedger {
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, ConnectorError> {
        let mut state = self.state.lock().unwrap();
        state.events.push(format!("rent:{data_len}"));
        Ok(state.rent.minimum_balance(data_len))
    }

    async fn get_latest_blockhash(&self) -> Result<Blockhash, ConnectorError> {
        self.state.lock().unwrap().events.push("blockhash".into());
        Ok(BLOCKHASH)
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, ConnectorError> {
        let state = self.state.lock().unwrap();
        Ok(state.accounts.get(address).map_or(0, |a| a.lamports))
    }

    async fn get_token_account_balance(&self, address: &Pubkey) -> Result<u64, ConnectorError> {
        let state = self.state.lock().unwrap();
        state
            .token_accounts
            .get(address)
            .copied()
            .ok_or_else(|| ConnectorError::Network("token account not found".into()))
    }

    async fn is_signature_confirmed(
        &self,
        signature: &Signature,
    ) -> Result<bool, ConnectorError> {
        let state = self.state.lock().unwrap();
        Ok(self.confirms && state.landed.contains(signature))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSigning {
    Honest,
    Unsupported,
    Rejects,
    /// Signs with some other key.
    Faulty,
}

pub struct FakeWallet {
    pub key: SigningKey,
    pub connected: bool,
    pub state: SharedState,
    /// Zero-based submission index the holder declines.
    pub reject_submission: Option<usize>,
    pub messages: MessageSigning,
    submissions: AtomicUsize,
}

impl FakeWallet {
    pub fn pubkey(&self) -> Pubkey {
        self.key.verifying_key().to_bytes()
    }

    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletConnector for FakeWallet {
    fn public_key(&self) -> Option<Pubkey> {
        self.connected.then(|| self.pubkey())
    }

    async fn sign_and_submit(&self, mut tx: Transaction) -> Result<Signature, ConnectorError> {
        let n = self.submissions.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        state.events.push(format!("submit:{n}"));

        if self.reject_submission == Some(n) {
            return Err(ConnectorError::Rejected("user rejected the request".into()));
        }

        tx.partial_sign(&self.key)
            .map_err(|e| ConnectorError::Network(e.to_string()))?;
        tx.verify_signatures()
            .map_err(|e| ConnectorError::Network(format!("signature verification failed: {e}")))?;
        if tx.message.recent_blockhash != BLOCKHASH {
            return Err(ConnectorError::Network("blockhash not found".into()));
        }

        let mut next = state.clone();
        apply(&mut next, &tx).map_err(ConnectorError::Network)?;
        let signature = tx
            .id()
            .ok_or_else(|| ConnectorError::Network("unsigned transaction".into()))?;
        next.landed.insert(signature);
        *state = next;
        Ok(signature)
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, ConnectorError> {
        match self.messages {
            MessageSigning::Honest => Ok(sign_message(&self.key, message)),
            MessageSigning::Unsupported => Err(ConnectorError::Unsupported(
                "wallet does not support message signing".into(),
            )),
            MessageSigning::Rejects => {
                Err(ConnectorError::Rejected("user rejected the request".into()))
            }
            MessageSigning::Faulty => {
                Ok(sign_message(&SigningKey::from_bytes(&[0xEE; 32]), message))
            }
        }
    }
}

/// Apply a verified transaction to `state`, all or nothing.
fn apply(state: &mut LedgerState, tx: &Transaction) -> Result<(), String> {
    let keys = &tx.message.account_keys;
    for ix in &tx.message.instructions {
        let program = keys[ix.program_id_index as usize];
        let account = |i: usize| keys[ix.account_indices[i] as usize];
        let u64_at = |at: usize| u64::from_le_bytes(ix.data[at..at + 8].try_into().unwrap());

        if program == SYSTEM_PROGRAM_ID {
            let new_account = account(1);
            let lamports = u64_at(4);
            let space = u64_at(12);
            let owner: Pubkey = ix.data[20..52].try_into().unwrap();
            if state.accounts.contains_key(&new_account) {
                return Err("account already in use".into());
            }
            if lamports < state.rent.minimum_balance(space as usize) {
                return Err("insufficient funds for rent".into());
            }
            state.accounts.insert(
                new_account,
                Account {
                    lamports,
                    space,
                    owner,
                },
            );
        } else if program == TOKEN_2022_PROGRAM_ID {
            let mint = account(0);
            match ix.data[0] {
                // InitializeMint, metadata pointer
                0 | 39 => {
                    let owned = state
                        .accounts
                        .get(&mint)
                        .is_some_and(|a| a.owner == TOKEN_2022_PROGRAM_ID);
                    if !owned {
                        return Err("mint account missing".into());
                    }
                    if ix.data[0] == 0 && !state.mints.insert(mint) {
                        return Err("mint already initialized".into());
                    }
                }
                // MintTo
                7 => {
                    if !state.mints.contains(&mint) {
                        return Err("uninitialized mint".into());
                    }
                    let balance = state
                        .token_accounts
                        .get_mut(&account(1))
                        .ok_or("destination token account missing")?;
                    *balance += u64_at(1);
                }
                // Token-metadata interface instructions
                _ => {
                    if !state.mints.contains(&mint) {
                        return Err("metadata written before mint initialisation".into());
                    }
                }
            }
        } else if program == ASSOCIATED_TOKEN_PROGRAM_ID {
            let (address, owner, mint) = (account(1), account(2), account(3));
            if !state.mints.contains(&mint) {
                return Err("associated account for unknown mint".into());
            }
            let expected = derive_associated_token_address(&owner, &mint, &TOKEN_2022_PROGRAM_ID)
                .map_err(|e| e.to_string())?;
            if expected != address {
                return Err("associated address mismatch".into());
            }
            if state.token_accounts.insert(address, 0).is_some() {
                return Err("associated account already exists".into());
            }
        } else {
            return Err("unknown program".into());
        }
    }
    Ok(())
}

pub struct Harness {
    pub state: SharedState,
    pub ledger: FakeLedger,
    pub wallet: FakeWallet,
}

impl Harness {
    pub fn new() -> Self {
        let state: SharedState = Arc::new(Mutex::new(LedgerState::default()));
        Self {
            ledger: FakeLedger {
                state: state.clone(),
                confirms: true,
            },
            wallet: FakeWallet {
                key: SigningKey::from_bytes(&[0x77; 32]),
                connected: true,
                state: state.clone(),
                reject_submission: None,
                messages: MessageSigning::Honest,
                submissions: AtomicUsize::new(0),
            },
            state,
        }
    }

    pub fn rejecting_submission(mut self, n: usize) -> Self {
        self.wallet.reject_submission = Some(n);
        self
    }

    pub fn events(&self) -> Vec<String> {
        self.state.lock().unwrap().events.clone()
    }
}
