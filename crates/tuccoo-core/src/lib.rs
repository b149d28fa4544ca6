//! # tuccoo-core
//! Foundation types for the TUCCOO wallet toolkit.
//!
//! - [`address`]: base58 [`Pubkey`](address::Pubkey) public identifiers
//! - [`amount`]: SOL/lamport parsing and formatting
//! - [`constants`]: protocol and default values
//! - [`crypto`]: Ed25519 [`KeyPair`](crypto::KeyPair)
//! - [`error`]: error enums shared by every crate
//! - [`transaction`]: legacy system-transfer transaction encoding

pub mod address;
pub mod amount;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod transaction;
