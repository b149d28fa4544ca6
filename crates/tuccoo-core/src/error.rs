//! Error types for the TUCCOO core.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("empty address")] Empty,
    #[error("invalid base58 encoding")] InvalidBase58,
    #[error("invalid length: expected 32 bytes, got {0}")] InvalidLength(usize),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("signature verification failed")] VerificationFailed,
}

/// Malformed user input, rejected before any external call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")] MissingField(&'static str),
    #[error("invalid amount: {0}")] InvalidAmount(String),
    #[error("amount must be greater than zero")] ZeroAmount,
    #[error("amount has more than {max} decimal places")] TooPrecise { max: u32 },
    #[error("amount overflow")] AmountOverflow,
    #[error("invalid recipient address: {0}")] InvalidRecipient(#[source] AddressError),
    #[error("invalid address: {0}")] InvalidAddress(#[source] AddressError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("invalid blockhash: {0}")] InvalidBlockhash(String),
    #[error("transfer amount must be greater than zero")] ZeroLamports,
    #[error("message is not signed")] Unsigned,
    #[error(transparent)] Crypto(#[from] CryptoError),
}
