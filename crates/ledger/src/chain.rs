//! The hash-linked ledger.

use std::sync::{Arc, RwLock};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use trustmesh_core::{now_secs, Error, LedgerConfig, Result};

use crate::block::{Block, GENESIS_PREV_HASH};
use crate::mining;
use crate::payload;

/// Ledger handle shared between the components of one simulation.
pub type SharedLedger = Arc<RwLock<Ledger>>;

/// Outcome of [`Ledger::add_block`].
#[derive(Debug, Clone, PartialEq)]
pub enum MiningOutcome {
    /// The block met the difficulty target and was appended.
    Mined(Block),
    /// The nonce search hit its cap. Nothing was appended.
    Exhausted { attempts: u64, difficulty: usize },
}

impl MiningOutcome {
    pub fn is_mined(&self) -> bool {
        matches!(self, Self::Mined(_))
    }

    pub fn block(&self) -> Option<&Block> {
        match self {
            Self::Mined(block) => Some(block),
            Self::Exhausted { .. } => None,
        }
    }

    /// Turn an exhausted search into [`Error::MiningExhausted`].
    pub fn into_result(self) -> Result<Block> {
        match self {
            Self::Mined(block) => Ok(block),
            Self::Exhausted {
                attempts,
                difficulty,
            } => Err(Error::MiningExhausted {
                attempts,
                difficulty,
            }),
        }
    }
}

/// First integrity violation found while walking the chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainViolation {
    #[error("block at position {index} carries a different index")]
    IndexMismatch { index: usize },

    #[error("block {index} does not link to the hash of its predecessor")]
    BrokenLink { index: usize },

    #[error("block {index} hash does not match its contents")]
    HashMismatch { index: usize },
}

/// An append-only, hash-linked sequence of blocks.
///
/// Always holds at least the genesis block.
#[derive(Debug, Clone)]
pub struct Ledger {
    chain: Vec<Block>,
    config: LedgerConfig,
}

impl Ledger {
    /// Create a ledger with the given difficulty and the default attempt cap.
    pub fn new(difficulty: usize) -> Self {
        Self::with_config(LedgerConfig::with_difficulty(difficulty))
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        let genesis = Block::genesis(now_secs());
        tracing::debug!(
            difficulty = config.difficulty,
            max_attempts = config.max_attempts,
            hash = %genesis.hash(),
            "Ledger created"
        );
        Self {
            chain: vec![genesis],
            config,
        }
    }

    /// Rebuild a ledger from exported blocks.
    ///
    /// The blocks are taken as-is; call [`Ledger::verify`] to check them.
    pub fn from_blocks(blocks: Vec<Block>, config: LedgerConfig) -> Result<Self> {
        if blocks.is_empty() {
            return Err(Error::EmptyChain);
        }
        Ok(Self {
            chain: blocks,
            config,
        })
    }

    pub fn into_shared(self) -> SharedLedger {
        Arc::new(RwLock::new(self))
    }

    pub fn latest(&self) -> Result<&Block> {
        self.chain.last().ok_or(Error::EmptyChain)
    }

    /// Mine and append a block carrying `payload`.
    ///
    /// `payload` must serialize to a JSON object. When the nonce search runs
    /// out of attempts the chain is left untouched and
    /// [`MiningOutcome::Exhausted`] is returned.
    pub fn add_block<P>(&mut self, payload: &P) -> Result<MiningOutcome>
    where
        P: Serialize + ?Sized,
    {
        let data = to_object(payload)?;
        let prev = self.latest()?;
        let candidate = Block::unsealed(prev.index() + 1, now_secs(), data, prev.hash().to_string());

        let difficulty = self.config.difficulty;
        let found = mining::search(candidate, difficulty, self.config.max_attempts);
        metrics::histogram!("ledger_mining_attempts").record(found.attempts as f64);

        if !found.satisfied {
            metrics::counter!("ledger_mining_exhausted_total").increment(1);
            tracing::warn!(
                index = found.block.index(),
                difficulty,
                attempts = found.attempts,
                "Mining exhausted, block not appended"
            );
            return Ok(MiningOutcome::Exhausted {
                attempts: found.attempts,
                difficulty,
            });
        }

        let block = found.block;
        tracing::debug!(
            index = block.index(),
            nonce = block.nonce(),
            attempts = found.attempts,
            hash = %block.hash(),
            "Block mined"
        );
        metrics::counter!("ledger_blocks_total").increment(1);
        self.chain.push(block.clone());
        Ok(MiningOutcome::Mined(block))
    }

    /// Check positions, hash linkage and digests of every block.
    ///
    /// Difficulty is not re-checked; see [`Ledger::underpowered_blocks`].
    pub fn verify(&self) -> std::result::Result<(), ChainViolation> {
        for (i, block) in self.chain.iter().enumerate() {
            if block.index() != i as u64 {
                return Err(ChainViolation::IndexMismatch { index: i });
            }
            let expected_prev = match i {
                0 => GENESIS_PREV_HASH,
                _ => self.chain[i - 1].hash(),
            };
            if block.prev_hash() != expected_prev {
                return Err(ChainViolation::BrokenLink { index: i });
            }
            if !block.is_sealed_correctly() {
                return Err(ChainViolation::HashMismatch { index: i });
            }
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        match self.verify() {
            Ok(()) => true,
            Err(violation) => {
                tracing::debug!(%violation, "Ledger failed verification");
                false
            }
        }
    }

    /// Indices of non-genesis blocks whose hash misses the current difficulty.
    pub fn underpowered_blocks(&self) -> Vec<u64> {
        self.chain
            .iter()
            .skip(1)
            .filter(|b| !b.meets_difficulty(self.config.difficulty))
            .map(Block::index)
            .collect()
    }

    /// Owned snapshot of the chain, in order.
    pub fn export(&self) -> Vec<Block> {
        self.chain.clone()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.chain.get(index)
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn difficulty(&self) -> usize {
        self.config.difficulty
    }

    /// Change the difficulty applied to future blocks.
    pub fn set_difficulty(&mut self, difficulty: usize) {
        tracing::info!(from = self.config.difficulty, to = difficulty, "Ledger difficulty changed");
        self.config.difficulty = difficulty;
    }

    pub fn max_attempts(&self) -> u64 {
        self.config.max_attempts
    }
}

fn to_object<P>(payload: &P) -> Result<Map<String, Value>>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(payload)?;
    payload::ensure_finite(payload).map_err(|e| Error::invalid_payload(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::invalid_payload(format!(
            "block payload must be a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
