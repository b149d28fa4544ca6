//! Public identifiers.
//!
//! A Solana account address is the raw 32-byte Ed25519 public key rendered
//! in base58 (Bitcoin alphabet). There is no version byte, prefix or
//! checksum: any 32-byte value is a syntactically valid address, including
//! program ids such as the all-zero system program.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;

/// A 32-byte account address, displayed as base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pubkey([u8; 32]);

impl Pubkey {
    /// Wrap raw key bytes.
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Base58 encoding of the key.
    pub fn encode(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Parse a base58 address.
    ///
    /// Surrounding whitespace is ignored; anything that does not decode to
    /// exactly 32 bytes is rejected.
    pub fn decode(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| AddressError::InvalidBase58)?;
        let len = bytes.len();
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| AddressError::InvalidLength(len))?;
        Ok(Self(arr))
    }

    /// `ABCD...WXYZ` form used where the full key does not fit.
    pub fn short(&self) -> String {
        let full = self.encode();
        if full.len() <= 8 {
            return full;
        }
        format!("{}...{}", &full[..4], &full[full.len() - 4..])
    }
}

impl From<[u8; 32]> for Pubkey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({})", self.encode())
    }
}

impl FromStr for Pubkey {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}
