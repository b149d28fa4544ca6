//! Ed25519 keypairs.
//!
//! Wraps ed25519-dalek. A keypair is expanded from 32 bytes of secret key
//! material, which is what SLIP-0010 derivation yields and what Solana calls
//! a keypair "seed".

use ed25519_dalek::{Signer, Verifier};
use std::fmt;

use crate::address::Pubkey;
use crate::error::CryptoError;

/// Ed25519 keypair for signing transactions.
///
/// The secret key is zeroized on drop by the underlying library.
pub struct KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

impl KeyPair {
    /// Expand 32 bytes of secret key material into a full keypair.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// The public half, as an account address.
    pub fn pubkey(&self) -> Pubkey {
        Pubkey::new(self.signing_key.verifying_key().to_bytes())
    }

    /// Raw secret key bytes (32 bytes). Handle with care.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Sign a message, returning the raw 64-byte Ed25519 signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl Clone for KeyPair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.secret_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("pubkey", &self.pubkey())
            .finish_non_exhaustive()
    }
}

/// Verify an Ed25519 signature made by `pubkey` over `message`.
pub fn verify(pubkey: &Pubkey, message: &[u8], signature: &[u8; 64]) -> Result<(), CryptoError> {
    let vk = ed25519_dalek::VerifyingKey::from_bytes(pubkey.as_bytes())
        .map_err(|_| CryptoError::InvalidPublicKey)?;
    let sig = ed25519_dalek::Signature::from_bytes(signature);
    vk.verify(message, &sig)
        .map_err(|_| CryptoError::VerificationFailed)
}
