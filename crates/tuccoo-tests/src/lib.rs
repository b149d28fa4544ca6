//! Scenario tests for TUCCOO.
//!
//! Exercises the derivation session and the dashboard actions together,
//! with an in-memory provider standing in for the Solana cluster.

pub mod helpers;
