//! Immutable ledger blocks and their canonical digest.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

/// Sentinel stored as the genesis block's previous hash.
pub const GENESIS_PREV_HASH: &str = "0";

/// A single ledger entry.
///
/// Blocks are value records: they are built once by the ledger and only read
/// afterwards. The serialized shape is
/// `{index, timestamp, data, prev_hash, nonce, hash}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub(crate) index: u64,
    pub(crate) timestamp: f64,
    pub(crate) data: Map<String, Value>,
    pub(crate) prev_hash: String,
    pub(crate) nonce: u64,
    pub(crate) hash: String,
}

impl Block {
    /// Build the genesis block. Its hash is computed directly, never mined.
    pub(crate) fn genesis(timestamp: f64) -> Self {
        let mut data = Map::new();
        data.insert("msg".into(), Value::from("genesis"));
        Self::unsealed(0, timestamp, data, GENESIS_PREV_HASH.into()).sealed()
    }

    /// Build a block with nonce 0 and an empty hash.
    pub(crate) fn unsealed(
        index: u64,
        timestamp: f64,
        data: Map<String, Value>,
        prev_hash: String,
    ) -> Self {
        Self {
            index,
            timestamp,
            data,
            prev_hash,
            nonce: 0,
            hash: String::new(),
        }
    }

    fn sealed(mut self) -> Self {
        self.hash = self.compute_hash();
        self
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    /// Creation time in seconds since the Unix epoch.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn prev_hash(&self) -> &str {
        &self.prev_hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// Every hashed field except the hash itself, as a JSON object.
    ///
    /// `serde_json` objects keep their keys sorted, so the serialized form does
    /// not depend on the order fields are declared or inserted in.
    pub(crate) fn canonical_form(&self) -> Value {
        json!({
            "index": self.index,
            "timestamp": self.timestamp,
            "data": self.data,
            "prev_hash": self.prev_hash,
            "nonce": self.nonce,
        })
    }

    /// Recompute the digest from the block's current contents.
    pub fn compute_hash(&self) -> String {
        digest(&self.canonical_form())
    }

    /// Whether the stored hash matches the block's contents.
    pub fn is_sealed_correctly(&self) -> bool {
        self.compute_hash() == self.hash
    }

    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        meets_difficulty(&self.hash, difficulty)
    }
}

/// SHA-256 of the compact JSON rendering of `form`, as lowercase hex.
pub(crate) fn digest(form: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(form.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Number of leading '0' characters in a hex digest.
pub fn leading_zeros(hash: &str) -> usize {
    hash.bytes().take_while(|b| *b == b'0').count()
}

pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    leading_zeros(hash) >= difficulty
}
