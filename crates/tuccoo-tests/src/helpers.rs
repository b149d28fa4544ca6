//! Shared test helpers: a fixed phrase and an in-memory chain.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use tuccoo_client::{ConfirmationStatus, DashboardError, WalletProvider};
use tuccoo_core::address::Pubkey;
use tuccoo_core::crypto::KeyPair;
use tuccoo_wallet::Phrase;

/// The BIP-39 phrase for all-zero 128-bit entropy.
pub const ZERO_PHRASE: &str = "abandon abandon abandon abandon abandon abandon \
                               abandon abandon abandon abandon abandon about";

/// Phrase built from `[byte; 16]` entropy.
pub fn phrase(byte: u8) -> Phrase {
    Phrase::from_entropy(&[byte; 16]).unwrap()
}

/// Deterministic address from a seed byte.
pub fn pubkey(seed: u8) -> Pubkey {
    Pubkey::new([seed; 32])
}

/// One provider call, in the order it was made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    GetBalance(Pubkey),
    RequestAirdrop(Pubkey, u64),
    Confirm(String),
    SubmitTransfer { from: Pubkey, to: Pubkey, lamports: u64 },
}

/// Which provider method should fail on its next calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    Balance,
    Airdrop,
    Confirm,
    Submit,
}

#[derive(Default)]
struct State {
    balances: HashMap<Pubkey, u64>,
    calls: Vec<Call>,
    failing: Option<Failure>,
    next_sig: u64,
}

/// A [`WalletProvider`] backed by a balance map.
///
/// Airdrops credit immediately, transfers move lamports (no fees) and
/// every signature confirms unless a [`Failure`] is armed.
#[derive(Default)]
pub struct FakeProvider {
    state: Mutex<State>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, address: Pubkey, lamports: u64) -> Self {
        self.state.lock().unwrap().balances.insert(address, lamports);
        self
    }

    pub fn fail(&self, failure: Failure) {
        self.state.lock().unwrap().failing = Some(failure);
    }

    pub fn recover(&self) {
        self.state.lock().unwrap().failing = None;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn balance_of(&self, address: &Pubkey) -> u64 {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(address)
            .copied()
            .unwrap_or(0)
    }

    fn record(&self, call: Call, failure: Failure, method: &'static str) -> Result<(), DashboardError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing == Some(failure) {
            return Err(DashboardError::Rpc {
                method,
                message: "simulated outage".into(),
            });
        }
        Ok(())
    }

    fn signature(&self) -> String {
        let mut state = self.state.lock().unwrap();
        state.next_sig += 1;
        format!("fakesig{}", state.next_sig)
    }
}

#[async_trait]
impl WalletProvider for FakeProvider {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, DashboardError> {
        self.record(Call::GetBalance(*address), Failure::Balance, "getBalance")?;
        Ok(self.balance_of(address))
    }

    async fn request_airdrop(
        &self,
        address: &Pubkey,
        lamports: u64,
    ) -> Result<String, DashboardError> {
        self.record(
            Call::RequestAirdrop(*address, lamports),
            Failure::Airdrop,
            "requestAirdrop",
        )?;
        *self.state.lock().unwrap().balances.entry(*address).or_default() += lamports;
        Ok(self.signature())
    }

    async fn confirm_transaction(
        &self,
        signature: &str,
    ) -> Result<ConfirmationStatus, DashboardError> {
        self.record(
            Call::Confirm(signature.to_string()),
            Failure::Confirm,
            "getSignatureStatuses",
        )?;
        Ok(ConfirmationStatus::Confirmed)
    }

    async fn submit_transfer(
        &self,
        from: &KeyPair,
        to: &Pubkey,
        lamports: u64,
    ) -> Result<String, DashboardError> {
        let from = from.pubkey();
        self.record(
            Call::SubmitTransfer { from, to: *to, lamports },
            Failure::Submit,
            "sendTransaction",
        )?;
        {
            let mut state = self.state.lock().unwrap();
            let available = state.balances.get(&from).copied().unwrap_or(0);
            if available < lamports {
                return Err(DashboardError::Rpc {
                    method: "sendTransaction",
                    message: "insufficient lamports".into(),
                });
            }
            state.balances.insert(from, available - lamports);
            *state.balances.entry(*to).or_default() += lamports;
        }
        Ok(self.signature())
    }
}
