//! Errors surfaced by dashboard actions.

use thiserror::Error;

use tuccoo_core::address::Pubkey;
use tuccoo_core::error::{TransactionError, ValidationError};
use tuccoo_wallet::WalletError;

/// Coarse classification used when reporting an error to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The action ran before its prerequisite state existed.
    Precondition,
    /// The wallet/connection/network dependency failed or was rejected.
    ExternalCall,
    /// Malformed user input.
    Validation,
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("wallet not connected")]
    NotConnected,

    #[error("wallet {0} is watch-only and cannot sign")]
    WatchOnly(Pubkey),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("RPC {method} failed: {message}")]
    Rpc { method: &'static str, message: String },

    #[error("transaction {signature} failed: {reason}")]
    TransactionFailed { signature: String, reason: String },

    #[error("transaction {0} was not confirmed in time")]
    ConfirmationTimeout(String),
}

impl DashboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DashboardError::NotConnected | DashboardError::WatchOnly(_) => ErrorKind::Precondition,
            DashboardError::Validation(_) => ErrorKind::Validation,
            DashboardError::Wallet(e) if e.is_precondition() => ErrorKind::Precondition,
            DashboardError::Wallet(WalletError::InvalidMnemonic(_))
            | DashboardError::Wallet(WalletError::InvalidPath(_))
            | DashboardError::Wallet(WalletError::NonHardenedPath(_)) => ErrorKind::Validation,
            DashboardError::Wallet(_)
            | DashboardError::Transaction(_)
            | DashboardError::Rpc { .. }
            | DashboardError::TransactionFailed { .. }
            | DashboardError::ConfirmationTimeout(_) => ErrorKind::ExternalCall,
        }
    }

    pub(crate) fn rpc(method: &'static str, err: impl std::fmt::Display) -> Self {
        DashboardError::Rpc {
            method,
            message: err.to_string(),
        }
    }
}
