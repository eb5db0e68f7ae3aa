#![deny(unused)]
//! Tamper-evident, hash-linked event ledger.
//!
//! This crate provides:
//! - Immutable blocks hashed over a canonical JSON form (SHA-256)
//! - Bounded proof-of-work mining on append
//! - Whole-chain integrity verification and export/import

pub mod block;
pub mod chain;
mod mining;
mod payload;

pub use block::{leading_zeros, meets_difficulty, Block, GENESIS_PREV_HASH};
pub use chain::{ChainViolation, Ledger, MiningOutcome, SharedLedger};
