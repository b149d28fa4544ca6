//! Hierarchical key derivation (SLIP-0010, ed25519 curve).
//!
//! Ed25519 has no public-parent-to-public-child derivation, so SLIP-0010
//! restricts it to hardened children:
//!
//! ```text
//! I_master = HMAC-SHA512(key = "ed25519 seed", data = seed)
//! I_child  = HMAC-SHA512(key = chain_code, data = 0x00 || key || ser32(index | 2^31))
//! key = I[0..32], chain_code = I[32..64]
//! ```
//!
//! Solana wallets live at `m/44'/501'/{account}'/0'`; the 32-byte key at
//! that path is the ed25519 secret key.

use hmac::{Hmac, Mac};
use serde::{Serialize, Serializer};
use sha2::Sha512;
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

use tuccoo_core::address::Pubkey;
use tuccoo_core::constants::{BIP44_PURPOSE, SOLANA_COIN_TYPE};
use tuccoo_core::crypto::KeyPair;

use crate::error::WalletError;
use crate::mnemonic::Phrase;

type HmacSha512 = Hmac<Sha512>;

/// HMAC key for the SLIP-0010 ed25519 master node.
const ED25519_CURVE_KEY: &[u8] = b"ed25519 seed";

/// Bit marking a child index as hardened.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// A fully hardened derivation path.
///
/// Components are stored without the hardened bit; every component is
/// hardened on use.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    /// `m/44'/501'/{account}'/0'`.
    pub fn solana_account(account: u32) -> Result<Self, WalletError> {
        if account >= HARDENED_OFFSET {
            return Err(WalletError::IndexExhausted(account));
        }
        Ok(Self(vec![BIP44_PURPOSE, SOLANA_COIN_TYPE, account, 0]))
    }

    /// Build a path from unhardened component values.
    pub fn from_components(components: Vec<u32>) -> Result<Self, WalletError> {
        if let Some(c) = components.iter().find(|c| **c >= HARDENED_OFFSET) {
            return Err(WalletError::IndexExhausted(*c));
        }
        Ok(Self(components))
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }

    /// The account component of a BIP-44 path, if the path has one.
    pub fn account(&self) -> Option<u32> {
        self.0.get(2).copied()
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for c in &self.0 {
            write!(f, "/{c}'")?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('/');
        if parts.next() != Some("m") {
            return Err(WalletError::InvalidPath(s.to_string()));
        }
        let mut components = Vec::new();
        for part in parts {
            let digits = part
                .strip_suffix('\'')
                .or_else(|| part.strip_suffix('h'))
                .or_else(|| part.strip_suffix('H'))
                .ok_or_else(|| WalletError::NonHardenedPath(s.to_string()))?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(WalletError::InvalidPath(s.to_string()));
            }
            let value: u32 = digits
                .parse()
                .map_err(|_| WalletError::InvalidPath(s.to_string()))?;
            components.push(value);
        }
        Self::from_components(components)
    }
}

impl Serialize for DerivationPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A private key and chain code at some node of the tree.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ExtendedKey {
    key: [u8; 32],
    chain_code: [u8; 32],
}

impl ExtendedKey {
    /// The SLIP-0010 ed25519 master node for `seed`.
    pub fn master(seed: &[u8]) -> Result<Self, WalletError> {
        Self::from_hmac(ED25519_CURVE_KEY, &[seed])
    }

    /// Hardened child `index` (the hardened bit is added here).
    pub fn child(&self, index: u32) -> Result<Self, WalletError> {
        if index >= HARDENED_OFFSET {
            return Err(WalletError::IndexExhausted(index));
        }
        let ser = (index | HARDENED_OFFSET).to_be_bytes();
        Self::from_hmac(&self.chain_code, &[&[0u8][..], &self.key[..], &ser[..]])
    }

    /// Walk `path` from this node.
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self, WalletError> {
        let mut node = Self {
            key: self.key,
            chain_code: self.chain_code,
        };
        for &c in path.components() {
            node = node.child(c)?;
        }
        Ok(node)
    }

    /// 32-byte ed25519 secret key at this node. Handle with care.
    pub fn secret_key(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    fn from_hmac(key: &[u8], data: &[&[u8]]) -> Result<Self, WalletError> {
        let mut mac = <HmacSha512 as Mac>::new_from_slice(key)
            .map_err(|e| WalletError::KeyDerivation(e.to_string()))?;
        for chunk in data {
            mac.update(chunk);
        }
        let out = mac.finalize().into_bytes();
        let mut node = Self {
            key: [0u8; 32],
            chain_code: [0u8; 32],
        };
        node.key.copy_from_slice(&out[..32]);
        node.chain_code.copy_from_slice(&out[32..]);
        Ok(node)
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey").finish_non_exhaustive()
    }
}

/// One wallet derived from a phrase.
#[derive(Clone, Debug)]
pub struct DerivedWallet {
    /// Account index the wallet was derived at.
    pub index: u32,
    /// Full path, `m/44'/501'/{index}'/0'`.
    pub path: DerivationPath,
    /// Signing keypair expanded from the derived key.
    pub keypair: KeyPair,
}

impl DerivedWallet {
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

/// 32 bytes of key material at `path` for `seed`.
pub fn derive_key(seed: &[u8], path: &DerivationPath) -> Result<[u8; 32], WalletError> {
    let node = ExtendedKey::master(seed)?.derive_path(path)?;
    Ok(*node.secret_key())
}

/// Derive the Solana wallet at `account` for `phrase`.
///
/// Deterministic: the same phrase and account always give the same keypair.
pub fn derive_wallet(phrase: &Phrase, account: u32) -> Result<DerivedWallet, WalletError> {
    let path = DerivationPath::solana_account(account)?;
    let seed = phrase.to_seed()?;
    let mut secret = derive_key(seed.as_bytes(), &path)?;
    let keypair = KeyPair::from_seed(&secret);
    secret.zeroize();
    Ok(DerivedWallet {
        index: account,
        path,
        keypair,
    })
}
