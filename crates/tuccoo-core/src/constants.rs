//! Protocol constants. All monetary values in lamports (1 SOL = 10^9 lamports).

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Number of fractional SOL digits representable in lamports.
pub const SOL_DECIMALS: u32 = 9;

/// Default airdrop request size (1 SOL).
pub const DEFAULT_AIRDROP_LAMPORTS: u64 = LAMPORTS_PER_SOL;

/// Public devnet JSON-RPC endpoint.
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// BIP-44 purpose field.
pub const BIP44_PURPOSE: u32 = 44;

/// SLIP-0044 registered coin type for Solana.
pub const SOLANA_COIN_TYPE: u32 = 501;

/// The system program that owns native SOL transfers (all-zero key).
pub const SYSTEM_PROGRAM_ID: [u8; 32] = [0u8; 32];

/// Instruction discriminant of `SystemInstruction::Transfer`.
pub const SYSTEM_TRANSFER_TAG: u32 = 2;

/// Commitment level used for reads and confirmations.
pub const DEFAULT_COMMITMENT: &str = "confirmed";
