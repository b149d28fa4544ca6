//! # tuccoo-client: talking to the chain.
//!
//! - [`provider`]: the `WalletProvider` capability set
//! - [`rpc`]: `RpcProvider`, a Solana JSON-RPC implementation over HTTP
//! - [`dashboard`]: fund request, balance refresh and transfer flows
//! - [`error`]: `DashboardError` and its three-way `ErrorKind`

pub mod dashboard;
pub mod error;
pub mod provider;
pub mod rpc;

pub use dashboard::{AirdropReceipt, ConnectedWallet, Dashboard, TransferReceipt, validate_transfer};
pub use error::{DashboardError, ErrorKind};
pub use provider::{ConfirmationStatus, WalletProvider};
pub use rpc::{RpcConfig, RpcProvider};
