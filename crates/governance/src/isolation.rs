//! Agent isolation with ledger-backed audit trail.

use std::collections::HashMap;
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use trustmesh_core::{now_secs, Error, Result};
use trustmesh_ledger::{Block, Ledger, SharedLedger};

/// Isolation transition recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationAction {
    Isolate,
    Release,
}

impl IsolationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Isolate => "isolate",
            Self::Release => "release",
        }
    }
}

/// Ledger payload for an isolation transition.
#[derive(Debug, Serialize)]
struct IsolationRecord<'a> {
    action: IsolationAction,
    agent: &'a str,
    reason: &'a str,
    time: f64,
}

/// Tracks which agents are quarantined and logs every transition.
///
/// Each transition is appended to the ledger first; isolation state changes
/// only once the block is on the chain.
pub struct IsolationController {
    ledger: SharedLedger,
    isolated: HashMap<String, f64>,
}

impl IsolationController {
    pub fn new(ledger: SharedLedger) -> Self {
        Self {
            ledger,
            isolated: HashMap::new(),
        }
    }

    /// Isolate `agent_id`, overwriting the start time if already isolated.
    pub fn isolate(&mut self, agent_id: &str, reason: &str) -> Result<Block> {
        let time = now_secs();
        let block = self.record(IsolationAction::Isolate, agent_id, reason, time)?;
        self.isolated.insert(agent_id.to_string(), time);
        tracing::info!(agent_id, reason, block_index = block.index(), "Agent isolated");
        Ok(block)
    }

    /// Release `agent_id`. Releasing an agent that is not isolated still logs.
    pub fn release(&mut self, agent_id: &str, reason: &str) -> Result<Block> {
        let time = now_secs();
        let block = self.record(IsolationAction::Release, agent_id, reason, time)?;
        let was_isolated = self.isolated.remove(agent_id).is_some();
        tracing::info!(
            agent_id,
            reason,
            was_isolated,
            block_index = block.index(),
            "Agent released"
        );
        Ok(block)
    }

    pub fn is_isolated(&self, agent_id: &str) -> bool {
        self.isolated.contains_key(agent_id)
    }

    /// When the current isolation of `agent_id` began.
    pub fn isolated_since(&self, agent_id: &str) -> Option<f64> {
        self.isolated.get(agent_id).copied()
    }

    /// Currently isolated agents, sorted.
    pub fn isolated_agents(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.isolated.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    fn record(&self, action: IsolationAction, agent: &str, reason: &str, time: f64) -> Result<Block> {
        let record = IsolationRecord {
            action,
            agent,
            reason,
            time,
        };
        let block = write_ledger(&self.ledger)?.add_block(&record)?.into_result()?;
        metrics::counter!("isolation_events_total", "action" => action.as_str()).increment(1);
        Ok(block)
    }
}

/// Acquire the ledger for reading.
pub fn read_ledger(ledger: &SharedLedger) -> Result<RwLockReadGuard<'_, Ledger>> {
    ledger
        .read()
        .map_err(|_| Error::internal("ledger lock poisoned"))
}

/// Acquire the ledger for writing.
pub fn write_ledger(ledger: &SharedLedger) -> Result<RwLockWriteGuard<'_, Ledger>> {
    ledger
        .write()
        .map_err(|_| Error::internal("ledger lock poisoned"))
}
