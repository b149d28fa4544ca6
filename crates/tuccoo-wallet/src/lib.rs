//! # tuccoo-wallet: recovery phrases and hierarchical key derivation.
//!
//! Generates BIP-39 recovery phrases, derives Solana keypairs along
//! `m/44'/501'/{account}'/0'` with SLIP-0010, and tracks the wallets derived
//! so far in an in-memory session.
//!
//! # Modules
//!
//! - [`error`]: `WalletError` enum
//! - [`mnemonic`]: `Phrase` and `Seed` secret types
//! - [`derivation`]: derivation paths and SLIP-0010 ed25519 derivation
//! - [`session`]: `DerivationSession` and its shared, serialized form

pub mod derivation;
pub mod error;
pub mod mnemonic;
pub mod session;

// Re-exports for convenient access
pub use derivation::{DerivationPath, DerivedWallet, derive_wallet};
pub use error::WalletError;
pub use mnemonic::{Phrase, Seed};
pub use session::{DerivationSession, DerivedKey, SessionEvent, SessionSnapshot, SharedSession};
