//! The wallet/connection capability set the dashboard depends on.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use tuccoo_core::address::Pubkey;
use tuccoo_core::crypto::KeyPair;

use crate::error::DashboardError;

/// How far a transaction has progressed through consensus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    Processed,
    Confirmed,
    Finalized,
}

impl ConfirmationStatus {
    /// Confirmed or better.
    pub fn is_confirmed(self) -> bool {
        self >= ConfirmationStatus::Confirmed
    }
}

/// Balance, airdrop, confirmation and transfer against some chain backend.
///
/// Signatures are returned as base58 strings.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Balance of `address` in lamports.
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, DashboardError>;

    /// Ask the cluster faucet for `lamports`; returns the airdrop signature.
    async fn request_airdrop(&self, address: &Pubkey, lamports: u64)
    -> Result<String, DashboardError>;

    /// Wait until `signature` is confirmed, failed, or timed out.
    async fn confirm_transaction(
        &self,
        signature: &str,
    ) -> Result<ConfirmationStatus, DashboardError>;

    /// Sign and submit a transfer from `from` to `to`; returns its signature.
    async fn submit_transfer(
        &self,
        from: &KeyPair,
        to: &Pubkey,
        lamports: u64,
    ) -> Result<String, DashboardError>;
}

#[async_trait]
impl<T: WalletProvider + ?Sized> WalletProvider for Arc<T> {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, DashboardError> {
        (**self).get_balance(address).await
    }

    async fn request_airdrop(
        &self,
        address: &Pubkey,
        lamports: u64,
    ) -> Result<String, DashboardError> {
        (**self).request_airdrop(address, lamports).await
    }

    async fn confirm_transaction(
        &self,
        signature: &str,
    ) -> Result<ConfirmationStatus, DashboardError> {
        (**self).confirm_transaction(signature).await
    }

    async fn submit_transfer(
        &self,
        from: &KeyPair,
        to: &Pubkey,
        lamports: u64,
    ) -> Result<String, DashboardError> {
        (**self).submit_transfer(from, to, lamports).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ordering() {
        assert!(!ConfirmationStatus::Processed.is_confirmed());
        assert!(ConfirmationStatus::Confirmed.is_confirmed());
        assert!(ConfirmationStatus::Finalized.is_confirmed());
    }

    #[test]
    fn status_serde_lowercase() {
        let s: ConfirmationStatus = serde_json::from_str("\"finalized\"").unwrap();
        assert_eq!(s, ConfirmationStatus::Finalized);
        assert_eq!(
            serde_json::to_string(&ConfirmationStatus::Confirmed).unwrap(),
            "\"confirmed\""
        );
    }
}
