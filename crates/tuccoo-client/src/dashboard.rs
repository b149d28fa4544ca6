//! Fund request, balance refresh and transfer submission.
//!
//! Each action is a single pass/fail round trip through a
//! [`WalletProvider`]: no retries and no local state beyond what the caller
//! passes in. User input is validated before anything leaves the process.

use serde::Serialize;
use tracing::{info, warn};

use tuccoo_core::address::Pubkey;
use tuccoo_core::amount::parse_sol;
use tuccoo_core::constants::DEFAULT_AIRDROP_LAMPORTS;
use tuccoo_core::crypto::KeyPair;
use tuccoo_core::error::ValidationError;

use crate::error::DashboardError;
use crate::provider::{ConfirmationStatus, WalletProvider};

/// The wallet the dashboard acts for.
///
/// A wallet connected by address alone can receive airdrops and show a
/// balance; sending requires a signer, which derived wallets carry.
#[derive(Clone, Debug)]
pub struct ConnectedWallet {
    address: Pubkey,
    account: Option<u32>,
    signer: Option<KeyPair>,
}

impl ConnectedWallet {
    /// Watch-only connection to an arbitrary address.
    pub fn watch(address: Pubkey) -> Self {
        Self {
            address,
            account: None,
            signer: None,
        }
    }

    /// Connection to the wallet derived at `account`, able to sign.
    pub fn derived(account: u32, keypair: KeyPair) -> Self {
        Self {
            address: keypair.pubkey(),
            account: Some(account),
            signer: Some(keypair),
        }
    }

    pub fn address(&self) -> Pubkey {
        self.address
    }

    /// Derivation account, for wallets connected from the session.
    pub fn account(&self) -> Option<u32> {
        self.account
    }

    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    fn signer(&self) -> Result<&KeyPair, DashboardError> {
        self.signer
            .as_ref()
            .ok_or(DashboardError::WatchOnly(self.address))
    }
}

/// Outcome of a confirmed airdrop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AirdropReceipt {
    pub signature: String,
    pub address: Pubkey,
    pub lamports: u64,
    pub status: ConfirmationStatus,
    /// Balance read back after confirmation.
    pub balance: u64,
}

/// Outcome of a confirmed transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferReceipt {
    pub signature: String,
    pub from: Pubkey,
    pub to: Pubkey,
    pub lamports: u64,
    pub status: ConfirmationStatus,
}

/// Check a transfer form: recipient address and decimal SOL amount.
pub fn validate_transfer(to: &str, amount: &str) -> Result<(Pubkey, u64), ValidationError> {
    if to.trim().is_empty() {
        return Err(ValidationError::MissingField("recipient"));
    }
    if amount.trim().is_empty() {
        return Err(ValidationError::MissingField("amount"));
    }
    let lamports = parse_sol(amount)?;
    let recipient = Pubkey::decode(to).map_err(ValidationError::InvalidRecipient)?;
    Ok((recipient, lamports))
}

/// Dashboard actions over a provider.
pub struct Dashboard<P> {
    provider: P,
    airdrop_lamports: u64,
}

impl<P: WalletProvider> Dashboard<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            airdrop_lamports: DEFAULT_AIRDROP_LAMPORTS,
        }
    }

    /// Override the airdrop size (default 1 SOL).
    pub fn with_airdrop_lamports(mut self, lamports: u64) -> Self {
        self.airdrop_lamports = lamports;
        self
    }

    pub fn airdrop_lamports(&self) -> u64 {
        self.airdrop_lamports
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Current balance of the connected wallet, in lamports.
    pub async fn refresh_balance(
        &self,
        wallet: Option<&ConnectedWallet>,
    ) -> Result<u64, DashboardError> {
        let wallet = wallet.ok_or(DashboardError::NotConnected)?;
        self.provider.get_balance(&wallet.address).await
    }

    /// Request the configured airdrop, wait for confirmation, re-read the balance.
    pub async fn request_airdrop(
        &self,
        wallet: Option<&ConnectedWallet>,
    ) -> Result<AirdropReceipt, DashboardError> {
        let wallet = wallet.ok_or(DashboardError::NotConnected)?;
        let address = wallet.address;
        let lamports = self.airdrop_lamports;

        let signature = self
            .provider
            .request_airdrop(&address, lamports)
            .await
            .inspect_err(|e| warn!(%address, error = %e, "airdrop request failed"))?;
        let status = self.provider.confirm_transaction(&signature).await?;
        let balance = self.provider.get_balance(&address).await?;

        info!(%address, lamports, balance, %signature, "airdrop confirmed");
        Ok(AirdropReceipt {
            signature,
            address,
            lamports,
            status,
            balance,
        })
    }

    /// Validate the form, then sign, submit and confirm a transfer.
    pub async fn send_transfer(
        &self,
        wallet: Option<&ConnectedWallet>,
        to: &str,
        amount: &str,
    ) -> Result<TransferReceipt, DashboardError> {
        let wallet = wallet.ok_or(DashboardError::NotConnected)?;
        let (recipient, lamports) = validate_transfer(to, amount)?;
        let signer = wallet.signer()?;

        let signature = self
            .provider
            .submit_transfer(signer, &recipient, lamports)
            .await
            .inspect_err(|e| warn!(to = %recipient, lamports, error = %e, "transfer rejected"))?;
        let status = self.provider.confirm_transaction(&signature).await?;

        info!(from = %wallet.address, to = %recipient, lamports, %signature, "transfer confirmed");
        Ok(TransferReceipt {
            signature,
            from: wallet.address,
            to: recipient,
            lamports,
            status,
        })
    }
}
