//! Wallet error types.

use thiserror::Error;

/// Errors that can occur in phrase handling and key derivation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Derivation was requested before a recovery phrase exists.
    #[error("generate a seed phrase first")]
    NoPhrase,

    /// A derivation is already running on this session.
    #[error("a wallet derivation is already in progress")]
    DerivationInFlight,

    /// The OS entropy source could not be read.
    #[error("entropy source unavailable: {0}")]
    Entropy(String),

    /// Invalid BIP-39 mnemonic phrase.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Malformed derivation path string.
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    /// Ed25519 derivation only supports hardened children.
    #[error("non-hardened derivation is not supported for ed25519: {0}")]
    NonHardenedPath(String),

    /// Every hardened account index has been used.
    #[error("account index {0} exceeds the hardened range")]
    IndexExhausted(u32),

    /// Key derivation failure.
    #[error("key derivation: {0}")]
    KeyDerivation(String),
}

impl WalletError {
    /// True for errors caused by calling an operation before its prerequisite state exists.
    pub fn is_precondition(&self) -> bool {
        matches!(self, WalletError::NoPhrase | WalletError::DerivationInFlight)
    }
}
