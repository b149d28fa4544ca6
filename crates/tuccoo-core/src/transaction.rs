//! Legacy Solana transactions carrying a single system-program transfer.
//!
//! # Wire format
//!
//! ```text
//! transaction = compact_u16(n_sigs) || sig[64] * n_sigs || message
//! message     = header[3] || compact_u16(n_keys) || key[32] * n_keys
//!               || recent_blockhash[32] || compact_u16(n_ix) || ix * n_ix
//! ix          = program_id_index[1] || compact_u16(n_acc) || acc_index[1] * n_acc
//!               || compact_u16(data_len) || data
//! ```
//!
//! Signatures cover the serialized message only.

use std::fmt;
use std::str::FromStr;

use crate::address::Pubkey;
use crate::constants::{SYSTEM_PROGRAM_ID, SYSTEM_TRANSFER_TAG};
use crate::crypto::{self, KeyPair};
use crate::error::TransactionError;

/// A recent blockhash, used as the transaction's lifetime and replay guard.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Blockhash([u8; 32]);

impl Blockhash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for Blockhash {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s.trim())
            .into_vec()
            .map_err(|_| TransactionError::InvalidBlockhash(s.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| TransactionError::InvalidBlockhash(s.to_string()))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blockhash({self})")
    }
}

/// Append a compact-u16 ("shortvec") length prefix.
pub fn encode_compact_u16(mut value: u16, out: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        byte |= 0x80;
        out.push(byte);
    }
}

/// Signer and read-only counts for the account key list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction whose program and accounts are indexes into the key list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// The signed portion of a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Blockhash,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Build a message moving `lamports` from `from` to `to`.
    ///
    /// Account keys are ordered writable-signer, writable, read-only; a
    /// self-transfer lists the payer once.
    pub fn transfer(
        from: &Pubkey,
        to: &Pubkey,
        lamports: u64,
        recent_blockhash: Blockhash,
    ) -> Result<Self, TransactionError> {
        if lamports == 0 {
            return Err(TransactionError::ZeroLamports);
        }

        let system = Pubkey::new(SYSTEM_PROGRAM_ID);
        let (account_keys, accounts) = if from == to {
            (vec![*from, system], vec![0, 0])
        } else {
            (vec![*from, *to, system], vec![0, 1])
        };
        let program_id_index = (account_keys.len() - 1) as u8;

        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&SYSTEM_TRANSFER_TAG.to_le_bytes());
        data.extend_from_slice(&lamports.to_le_bytes());

        Ok(Self {
            header: MessageHeader {
                num_required_signatures: 1,
                num_readonly_signed_accounts: 0,
                num_readonly_unsigned_accounts: 1,
            },
            account_keys,
            recent_blockhash,
            instructions: vec![CompiledInstruction {
                program_id_index,
                accounts,
                data,
            }],
        })
    }

    /// Serialize to the bytes that signers sign.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(3 + 1 + 32 * self.account_keys.len() + 32 + 32);
        out.push(self.header.num_required_signatures);
        out.push(self.header.num_readonly_signed_accounts);
        out.push(self.header.num_readonly_unsigned_accounts);

        encode_compact_u16(self.account_keys.len() as u16, &mut out);
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }

        out.extend_from_slice(self.recent_blockhash.as_bytes());

        encode_compact_u16(self.instructions.len() as u16, &mut out);
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            encode_compact_u16(ix.accounts.len() as u16, &mut out);
            out.extend_from_slice(&ix.accounts);
            encode_compact_u16(ix.data.len() as u16, &mut out);
            out.extend_from_slice(&ix.data);
        }
        out
    }

    /// The fee payer (first account key).
    pub fn payer(&self) -> Option<&Pubkey> {
        self.account_keys.first()
    }
}

/// A message plus its signatures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<[u8; 64]>,
    pub message: Message,
}

impl Transaction {
    /// Build and sign a system transfer paid for by `from`.
    pub fn signed_transfer(
        from: &KeyPair,
        to: &Pubkey,
        lamports: u64,
        recent_blockhash: Blockhash,
    ) -> Result<Self, TransactionError> {
        let message = Message::transfer(&from.pubkey(), to, lamports, recent_blockhash)?;
        let signature = from.sign(&message.serialize());
        Ok(Self {
            signatures: vec![signature],
            message,
        })
    }

    /// Base58 of the payer signature, which doubles as the transaction id.
    pub fn id(&self) -> Result<String, TransactionError> {
        self.signatures
            .first()
            .map(|sig| bs58::encode(sig).into_string())
            .ok_or(TransactionError::Unsigned)
    }

    /// Check the payer signature against the serialized message.
    pub fn verify(&self) -> Result<(), TransactionError> {
        let sig = self.signatures.first().ok_or(TransactionError::Unsigned)?;
        let payer = self.message.payer().ok_or(TransactionError::Unsigned)?;
        crypto::verify(payer, &self.message.serialize(), sig)?;
        Ok(())
    }

    /// Wire encoding.
    pub fn serialize(&self) -> Vec<u8> {
        let message = self.message.serialize();
        let mut out = Vec::with_capacity(1 + 64 * self.signatures.len() + message.len());
        encode_compact_u16(self.signatures.len() as u16, &mut out);
        for sig in &self.signatures {
            out.extend_from_slice(sig);
        }
        out.extend_from_slice(&message);
        out
    }

    /// Wire encoding as base58, the default `sendTransaction` encoding.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.serialize()).into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CryptoError;

    fn blockhash() -> Blockhash {
        Blockhash::new([0xAA; 32])
    }

    #[test]
    fn compact_u16_encoding() {
        let cases: [(u16, &[u8]); 6] = [
            (0, &[0x00]),
            (0x7f, &[0x7f]),
            (0x80, &[0x80, 0x01]),
            (0xff, &[0xff, 0x01]),
            (0x3fff, &[0xff, 0x7f]),
            (0xffff, &[0xff, 0xff, 0x03]),
        ];
        for (value, expected) in cases {
            let mut out = Vec::new();
            encode_compact_u16(value, &mut out);
            assert_eq!(out, expected, "value {value:#x}");
        }
    }

    #[test]
    fn blockhash_parse_display() {
        let bh = blockhash();
        let parsed: Blockhash = bh.to_string().parse().unwrap();
        assert_eq!(parsed, bh);
        assert!("bad!".parse::<Blockhash>().is_err());
        assert!(bs58::encode([1u8; 16]).into_string().parse::<Blockhash>().is_err());
    }

    #[test]
    fn transfer_message_layout() {
        let from = Pubkey::new([1u8; 32]);
        let to = Pubkey::new([2u8; 32]);
        let msg = Message::transfer(&from, &to, 5_000, blockhash()).unwrap();
        let bytes = msg.serialize();

        // header
        assert_eq!(&bytes[..3], &[1, 0, 1]);
        // three keys: payer, recipient, system program
        assert_eq!(bytes[3], 3);
        assert_eq!(&bytes[4..36], from.as_bytes());
        assert_eq!(&bytes[36..68], to.as_bytes());
        assert_eq!(&bytes[68..100], &SYSTEM_PROGRAM_ID);
        assert_eq!(&bytes[100..132], &[0xAA; 32]);
        // one instruction: program 2, accounts [0, 1], 12 bytes of data
        assert_eq!(&bytes[132..137], &[1, 2, 2, 0, 1]);
        assert_eq!(bytes[137], 12);
        assert_eq!(&bytes[138..142], &2u32.to_le_bytes());
        assert_eq!(&bytes[142..150], &5_000u64.to_le_bytes());
        assert_eq!(bytes.len(), 150);
    }

    #[test]
    fn self_transfer_lists_payer_once() {
        let from = Pubkey::new([1u8; 32]);
        let msg = Message::transfer(&from, &from, 1, blockhash()).unwrap();
        assert_eq!(msg.account_keys, vec![from, Pubkey::new(SYSTEM_PROGRAM_ID)]);
        assert_eq!(msg.instructions[0].program_id_index, 1);
        assert_eq!(msg.instructions[0].accounts, vec![0, 0]);
    }

    #[test]
    fn zero_lamports_rejected() {
        let from = Pubkey::new([1u8; 32]);
        let to = Pubkey::new([2u8; 32]);
        assert_eq!(
            Message::transfer(&from, &to, 0, blockhash()),
            Err(TransactionError::ZeroLamports)
        );
    }

    #[test]
    fn signed_transfer_verifies() {
        let kp = KeyPair::from_seed(&[5u8; 32]);
        let to = Pubkey::new([6u8; 32]);
        let tx = Transaction::signed_transfer(&kp, &to, 42, blockhash()).unwrap();
        assert_eq!(tx.signatures.len(), 1);
        assert_eq!(tx.message.payer(), Some(&kp.pubkey()));
        assert!(tx.verify().is_ok());
    }

    #[test]
    fn tampered_amount_fails_verification() {
        let kp = KeyPair::from_seed(&[5u8; 32]);
        let to = Pubkey::new([6u8; 32]);
        let mut tx = Transaction::signed_transfer(&kp, &to, 42, blockhash()).unwrap();
        tx.message.instructions[0].data[4] = 43;
        assert_eq!(
            tx.verify(),
            Err(TransactionError::Crypto(CryptoError::VerificationFailed))
        );
    }

    #[test]
    fn wire_encoding_prefixes_signatures() {
        let kp = KeyPair::from_seed(&[5u8; 32]);
        let to = Pubkey::new([6u8; 32]);
        let tx = Transaction::signed_transfer(&kp, &to, 42, blockhash()).unwrap();
        let wire = tx.serialize();
        assert_eq!(wire[0], 1);
        assert_eq!(&wire[1..65], &tx.signatures[0]);
        assert_eq!(&wire[65..], tx.message.serialize().as_slice());

        let decoded = bs58::decode(tx.to_base58()).into_vec().unwrap();
        assert_eq!(decoded, wire);
    }

    #[test]
    fn id_is_base58_signature() {
        let kp = KeyPair::from_seed(&[5u8; 32]);
        let to = Pubkey::new([6u8; 32]);
        let tx = Transaction::signed_transfer(&kp, &to, 42, blockhash()).unwrap();
        let id = tx.id().unwrap();
        assert_eq!(bs58::decode(&id).into_vec().unwrap(), tx.signatures[0].to_vec());
    }

    #[test]
    fn unsigned_has_no_id() {
        let msg = Message::transfer(&Pubkey::new([1; 32]), &Pubkey::new([2; 32]), 1, blockhash())
            .unwrap();
        let tx = Transaction {
            signatures: vec![],
            message: msg,
        };
        assert_eq!(tx.id(), Err(TransactionError::Unsigned));
        assert_eq!(tx.verify(), Err(TransactionError::Unsigned));
    }
}
