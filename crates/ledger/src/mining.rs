//! Proof-of-work nonce search.

use serde_json::Value;

use crate::block::{digest, meets_difficulty, Block};

/// Result of a nonce search over a candidate block.
#[derive(Debug)]
pub(crate) struct Search {
    pub block: Block,
    /// Nonce increments performed after the initial hash.
    pub attempts: u64,
    pub satisfied: bool,
}

/// Search nonces starting from 0 until the hash has `difficulty` leading
/// zeros or `max_attempts` increments have been spent.
///
/// The returned block is sealed with the last hash computed either way; the
/// caller decides what to do with an unsatisfied search.
pub(crate) fn search(mut block: Block, difficulty: usize, max_attempts: u64) -> Search {
    block.nonce = 0;
    let mut form = block.canonical_form();
    let mut hash = digest(&form);
    let mut attempts = 0u64;

    while !meets_difficulty(&hash, difficulty) && attempts < max_attempts {
        block.nonce += 1;
        form["nonce"] = Value::from(block.nonce);
        hash = digest(&form);
        attempts += 1;
    }

    let satisfied = meets_difficulty(&hash, difficulty);
    block.hash = hash;
    Search {
        block,
        attempts,
        satisfied,
    }
}
