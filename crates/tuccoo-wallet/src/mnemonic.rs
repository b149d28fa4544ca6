//! BIP-39 recovery phrases and the binary seeds they expand into.

use bip39::{Language, Mnemonic};
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::WalletError;

/// Entropy of a freshly generated phrase: 128 bits, i.e. 12 words.
pub const PHRASE_ENTROPY_BYTES: usize = 16;

/// A secret recovery phrase.
///
/// Held only in memory, zeroized on drop, and redacted from `Debug`. Use
/// [`Phrase::reveal`] when the words must be shown to the user.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Phrase {
    words: String,
}

impl Phrase {
    /// Draw 128 bits from the OS RNG and encode them as an English phrase.
    pub fn generate() -> Result<Self, WalletError> {
        let mut entropy = [0u8; PHRASE_ENTROPY_BYTES];
        rand::rngs::OsRng
            .try_fill_bytes(&mut entropy)
            .map_err(|e| WalletError::Entropy(e.to_string()))?;
        let result = Self::from_entropy(&entropy);
        entropy.zeroize();
        result
    }

    /// Encode raw entropy (16 to 32 bytes, multiple of 4) as a phrase.
    pub fn from_entropy(entropy: &[u8]) -> Result<Self, WalletError> {
        let m = Mnemonic::from_entropy_in(Language::English, entropy)
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
        Ok(Self {
            words: m.to_string(),
        })
    }

    /// Parse an existing phrase.
    ///
    /// Normalizes whitespace and converts to lowercase before checking the
    /// words and checksum.
    pub fn parse(input: &str) -> Result<Self, WalletError> {
        let normalized = input
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let m = Mnemonic::parse_in_normalized(Language::English, &normalized)
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
        Ok(Self {
            words: m.to_string(),
        })
    }

    /// The words, space separated. Handle with care.
    pub fn reveal(&self) -> &str {
        &self.words
    }

    pub fn word_count(&self) -> usize {
        self.words.split(' ').count()
    }

    /// Expand into the 64-byte BIP-39 seed (PBKDF2, empty passphrase).
    ///
    /// This is 2048 rounds of HMAC-SHA512; async callers should run it on
    /// the blocking pool.
    pub fn to_seed(&self) -> Result<Seed, WalletError> {
        let m = Mnemonic::parse_in_normalized(Language::English, &self.words)
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
        Ok(Seed {
            bytes: m.to_seed_normalized(""),
        })
    }
}

impl fmt::Debug for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Phrase")
            .field("words", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for Phrase {
    fn eq(&self, other: &Self) -> bool {
        self.words == other.words
    }
}

impl Eq for Phrase {}

/// The 64-byte binary seed derived from a phrase.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    bytes: [u8; 64],
}

impl Seed {
    /// Create a seed from raw bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self { bytes }
    }

    /// Get the raw seed bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.bytes
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_PHRASE: &str = "abandon abandon abandon abandon abandon abandon \
                               abandon abandon abandon abandon abandon about";

    #[test]
    fn generated_phrase_has_12_words() {
        let phrase = Phrase::generate().unwrap();
        assert_eq!(phrase.word_count(), 12);
        assert_eq!(phrase.reveal().split_whitespace().count(), 12);
    }

    #[test]
    fn generated_phrases_differ() {
        let p1 = Phrase::generate().unwrap();
        let p2 = Phrase::generate().unwrap();
        assert_ne!(p1, p2);
    }

    #[test]
    fn generated_phrase_parses_back() {
        let phrase = Phrase::generate().unwrap();
        let parsed = Phrase::parse(phrase.reveal()).unwrap();
        assert_eq!(parsed, phrase);
    }

    #[test]
    fn zero_entropy_is_abandon_about() {
        let phrase = Phrase::from_entropy(&[0u8; 16]).unwrap();
        assert_eq!(phrase.reveal(), Phrase::parse(ZERO_PHRASE).unwrap().reveal());
    }

    #[test]
    fn bip39_seed_vector() {
        // Published BIP-39 seed for the all-zero 128-bit entropy, empty passphrase.
        let seed = Phrase::parse(ZERO_PHRASE).unwrap().to_seed().unwrap();
        assert_eq!(
            hex::encode(seed.as_bytes()),
            "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc1\
             9a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e4"
        );
    }

    #[test]
    fn whitespace_and_case_normalization() {
        let messy = format!("  {}  ", ZERO_PHRASE.to_uppercase().replace(' ', "\t "));
        let parsed = Phrase::parse(&messy).unwrap();
        assert_eq!(parsed, Phrase::parse(ZERO_PHRASE).unwrap());
    }

    #[test]
    fn invalid_word_rejected() {
        let result = Phrase::parse("abandon abandon abandon invalidword");
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("invalid mnemonic"), "error message was: {err_msg}");
    }

    #[test]
    fn bad_checksum_rejected() {
        let words = vec!["abandon"; 12];
        assert!(Phrase::parse(&words.join(" ")).is_err());
    }

    #[test]
    fn wrong_word_count_rejected() {
        assert!(Phrase::parse("abandon abandon").is_err());
    }

    #[test]
    fn debug_hides_words() {
        let phrase = Phrase::parse(ZERO_PHRASE).unwrap();
        let debug = format!("{phrase:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("abandon"));
    }

    #[test]
    fn seed_debug_hides_bytes() {
        let seed = Seed::from_bytes([0xAB; 64]);
        let debug = format!("{seed:?}");
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("ab"));
    }
}
