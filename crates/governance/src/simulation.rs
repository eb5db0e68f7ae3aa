//! Threshold-driven simulation over the trust engine, ledger, and isolation
//! controller.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use trustmesh_core::{Error, LedgerConfig, Result, SimulationConfig, TrustConfig};
use trustmesh_ledger::{Ledger, SharedLedger};
use trustmesh_trust::{Behavior, TrustEngine};

use crate::isolation::{read_ledger, IsolationController};

/// Reason attached to isolations triggered by the trust threshold.
pub const LOW_TRUST_REASON: &str = "low_trust_auto";

/// What happened during a single step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub agent_id: String,
    pub action: String,
    pub malicious: bool,
    pub trust: f64,
    /// Ledger index of the isolation block, if this step isolated the agent.
    pub isolation_block: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IsolationEvent {
    pub step: usize,
    pub agent_id: String,
    pub trust: f64,
    pub block_index: u64,
}

/// Outcome of a full run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub steps: usize,
    pub trust_summary: BTreeMap<String, f64>,
    pub isolations: Vec<IsolationEvent>,
    pub isolated_agents: Vec<String>,
    pub ledger_len: usize,
    pub ledger_valid: bool,
}

/// One self-contained simulation: its own agents, ledger, and isolation set.
///
/// The isolation policy lives here, not in the core components: an agent is
/// isolated when its trust drops below `isolation_threshold` and it is not
/// isolated already.
pub struct Simulation {
    config: SimulationConfig,
    trust: TrustEngine,
    ledger: SharedLedger,
    isolation: IsolationController,
    agent_ids: Vec<String>,
    steps_run: usize,
}

impl Simulation {
    pub fn new(
        config: SimulationConfig,
        trust_config: &TrustConfig,
        ledger_config: LedgerConfig,
    ) -> Result<Self> {
        config.validate()?;
        ledger_config.validate()?;
        let trust = TrustEngine::from_config(trust_config)?;
        let ledger = Ledger::with_config(ledger_config).into_shared();
        let isolation = IsolationController::new(ledger.clone());

        Ok(Self {
            config,
            trust,
            ledger,
            isolation,
            agent_ids: Vec::new(),
            steps_run: 0,
        })
    }

    /// Register `agent_0 .. agent_{n-1}`.
    pub fn register_agents(&mut self) -> Result<()> {
        for i in 0..self.config.agent_count {
            let agent_id = format!("agent_{i}");
            self.trust.register(agent_id.clone())?;
            self.agent_ids.push(agent_id);
        }
        tracing::info!(agents = ?self.agent_ids, "Registered agents");
        Ok(())
    }

    /// Observe one action from a randomly chosen agent and apply the policy.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<StepReport> {
        let agent_id = self
            .agent_ids
            .choose(rng)
            .cloned()
            .ok_or_else(|| Error::internal("simulation has no registered agents"))?;

        let behavior = if rng.gen_bool(self.config.malicious_probability) {
            Behavior::Malicious
        } else {
            Behavior::Benign
        };
        let action = behavior.action(rng);
        let malicious = self.trust.observe(&agent_id, action)?;
        let trust = self.trust.get_trust(&agent_id)?;

        let step = self.steps_run;
        self.steps_run += 1;

        let mut isolation_block = None;
        if trust < self.config.isolation_threshold && !self.isolation.is_isolated(&agent_id) {
            let block = self.isolation.isolate(&agent_id, LOW_TRUST_REASON)?;
            tracing::info!(
                step,
                agent_id = %agent_id,
                trust,
                block_index = block.index(),
                "Trust below threshold, agent isolated"
            );
            isolation_block = Some(block.index());
        }

        Ok(StepReport {
            step,
            agent_id,
            action: action.to_string(),
            malicious,
            trust,
            isolation_block,
        })
    }

    /// Run the configured number of steps and summarize.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<SimulationReport> {
        let mut isolations = Vec::new();
        for _ in 0..self.config.steps {
            let report = self.step(rng)?;
            if let Some(block_index) = report.isolation_block {
                isolations.push(IsolationEvent {
                    step: report.step,
                    agent_id: report.agent_id,
                    trust: report.trust,
                    block_index,
                });
            }
        }

        let ledger = read_ledger(&self.ledger)?;
        let report = SimulationReport {
            steps: self.steps_run,
            trust_summary: self.trust.summary(),
            isolations,
            isolated_agents: self.isolation.isolated_agents(),
            ledger_len: ledger.len(),
            ledger_valid: ledger.is_valid(),
        };
        tracing::info!(
            steps = report.steps,
            isolations = report.isolations.len(),
            ledger_len = report.ledger_len,
            ledger_valid = report.ledger_valid,
            "Simulation finished"
        );
        Ok(report)
    }

    pub fn trust(&self) -> &TrustEngine {
        &self.trust
    }

    pub fn isolation(&self) -> &IsolationController {
        &self.isolation
    }

    /// Mutable access for drivers that release agents between steps.
    pub fn isolation_mut(&mut self) -> &mut IsolationController {
        &mut self.isolation
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}
