//! Trust scoring engine.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use trustmesh_core::{now_secs, Error, Result, TrustConfig};

use crate::agent::{Agent, Observation};
use crate::classifier::{ActionClassifier, MarkerClassifier};

/// Maintains per-agent trust scores from a stream of observed actions.
///
/// Each observation pulls the score toward 1.0 (benign) or 0.0 (malicious)
/// by `learning_rate`, then subtracts a constant `decay`, and clamps to
/// [0, 1]. The engine is a plain owned value; callers that share it across
/// threads wrap it in their own lock.
pub struct TrustEngine {
    agents: HashMap<String, Agent>,
    learning_rate: f64,
    decay: f64,
    initial_trust: f64,
    classifier: Box<dyn ActionClassifier>,
}

impl TrustEngine {
    /// Engine with the default parameters (lr 0.2, decay 0.01, initial 0.5).
    pub fn new() -> Self {
        Self {
            agents: HashMap::new(),
            learning_rate: 0.2,
            decay: 0.01,
            initial_trust: 0.5,
            classifier: Box::new(MarkerClassifier::default()),
        }
    }

    pub fn from_config(config: &TrustConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            agents: HashMap::new(),
            learning_rate: config.learning_rate,
            decay: config.decay,
            initial_trust: config.initial_trust,
            classifier: Box::new(MarkerClassifier::new(config.malicious_markers.iter().cloned())),
        })
    }

    /// Replace the action classifier.
    pub fn with_classifier(mut self, classifier: impl ActionClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    /// Register a new agent at the initial trust score.
    ///
    /// Registering an identifier twice fails with [`Error::DuplicateAgent`]
    /// and leaves the existing agent untouched.
    pub fn register(&mut self, agent_id: impl Into<String>) -> Result<&Agent> {
        match self.agents.entry(agent_id.into()) {
            Entry::Occupied(slot) => Err(Error::duplicate_agent(slot.key().clone())),
            Entry::Vacant(slot) => {
                tracing::debug!(agent_id = %slot.key(), trust = self.initial_trust, "Agent registered");
                let agent = Agent::new(slot.key().clone(), self.initial_trust);
                Ok(&*slot.insert(agent))
            }
        }
    }

    /// Classify `action`, update the agent's score, and record the observation.
    ///
    /// Returns whether the action was classified as malicious.
    pub fn observe(&mut self, agent_id: &str, action: &str) -> Result<bool> {
        let malicious = self.classifier.is_malicious(action);
        let (learning_rate, decay) = (self.learning_rate, self.decay);

        let agent = self
            .agents
            .get_mut(agent_id)
            .ok_or_else(|| Error::unknown_agent(agent_id))?;

        let prior = agent.trust();
        let updated = next_trust(prior, malicious, learning_rate, decay);
        agent.record(
            updated,
            Observation {
                timestamp: now_secs(),
                malicious,
            },
        );

        metrics::counter!(
            "trust_observations_total",
            "malicious" => if malicious { "true" } else { "false" }
        )
        .increment(1);
        tracing::debug!(
            agent_id,
            action,
            malicious,
            prior,
            trust = updated,
            "Observation recorded"
        );

        Ok(malicious)
    }

    pub fn get_trust(&self, agent_id: &str) -> Result<f64> {
        self.agent(agent_id).map(Agent::trust)
    }

    pub fn agent(&self, agent_id: &str) -> Result<&Agent> {
        self.agents
            .get(agent_id)
            .ok_or_else(|| Error::unknown_agent(agent_id))
    }

    /// Snapshot of every agent's current score.
    pub fn summary(&self) -> BTreeMap<String, f64> {
        self.agents
            .iter()
            .map(|(id, agent)| (id.clone(), agent.trust()))
            .collect()
    }

    pub fn contains(&self, agent_id: &str) -> bool {
        self.agents.contains_key(agent_id)
    }

    /// Registered agent identifiers, sorted.
    pub fn agent_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.agents.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for TrustEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// One step of the update rule, clamped to [0, 1].
pub fn next_trust(prior: f64, malicious: bool, learning_rate: f64, decay: f64) -> f64 {
    let target = if malicious { 0.0 } else { 1.0 };
    let updated = prior + learning_rate * (target - prior) - decay;
    updated.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_register_initial_state() {
        let mut engine = TrustEngine::new();
        let agent = engine.register("a1").unwrap();
        assert_eq!(agent.id(), "a1");
        assert_eq!(agent.trust(), 0.5);
        assert!(agent.history().is_empty());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut engine = TrustEngine::new();
        engine.register("a1").unwrap();
        engine.observe("a1", "request_info:general").unwrap();
        let before = engine.get_trust("a1").unwrap();

        let err = engine.register("a1").unwrap_err();
        assert!(matches!(err, Error::DuplicateAgent(ref id) if id == "a1"));
        assert_eq!(engine.get_trust("a1").unwrap(), before);
        assert_eq!(engine.agent("a1").unwrap().history().len(), 1);
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_benign_observation() {
        let mut engine = TrustEngine::new();
        engine.register("a1").unwrap();
        let malicious = engine.observe("a1", "request_info:general").unwrap();
        assert!(!malicious);
        assert!((engine.get_trust("a1").unwrap() - 0.59).abs() < EPS);
    }

    #[test]
    fn test_malicious_observation() {
        let mut engine = TrustEngine::new();
        engine.register("a1").unwrap();
        let malicious = engine.observe("a1", "exfiltrate:secret").unwrap();
        assert!(malicious);
        assert!((engine.get_trust("a1").unwrap() - 0.39).abs() < EPS);
    }

    #[test]
    fn test_history_is_ordered() {
        let mut engine = TrustEngine::new();
        engine.register("a1").unwrap();
        engine.observe("a1", "request_info:general").unwrap();
        engine.observe("a1", "bypass_auth:token").unwrap();
        engine.observe("a1", "request_info:config").unwrap();

        let agent = engine.agent("a1").unwrap();
        let flags: Vec<bool> = agent.history().iter().map(|o| o.malicious).collect();
        assert_eq!(flags, vec![false, true, false]);
        assert!(agent
            .history()
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
        assert_eq!(agent.malicious_count(), 1);
    }

    #[test]
    fn test_unknown_agent() {
        let mut engine = TrustEngine::new();
        engine.register("a1").unwrap();

        assert!(matches!(engine.get_trust("ghost"), Err(Error::UnknownAgent(_))));
        assert!(matches!(
            engine.observe("ghost", "exfiltrate:secret"),
            Err(Error::UnknownAgent(_))
        ));
        assert_eq!(engine.get_trust("a1").unwrap(), 0.5);
        assert!(engine.agent("a1").unwrap().history().is_empty());
    }

    #[test]
    fn test_observe_touches_only_target() {
        let mut engine = TrustEngine::new();
        engine.register("a1").unwrap();
        engine.register("a2").unwrap();
        engine.observe("a1", "exfiltrate:secret").unwrap();
        assert_eq!(engine.get_trust("a2").unwrap(), 0.5);
        assert!(engine.agent("a2").unwrap().history().is_empty());
    }

    #[test]
    fn test_summary_is_snapshot() {
        let mut engine = TrustEngine::new();
        engine.register("a1").unwrap();
        engine.register("a2").unwrap();

        let summary = engine.summary();
        engine.observe("a1", "request_info:general").unwrap();

        assert_eq!(summary.len(), 2);
        assert_eq!(summary["a1"], 0.5);
        assert!((engine.summary()["a1"] - 0.59).abs() < EPS);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(next_trust(0.0, true, 0.2, 0.01), 0.0);
        assert_eq!(next_trust(1.0, false, 1.0, 0.0), 1.0);
        assert_eq!(next_trust(0.5, false, 0.2, 5.0), 0.0);
    }

    #[test]
    fn test_idle_benign_agent_still_erodes_from_top() {
        let mut engine = TrustEngine::new();
        engine.register("a1").unwrap();
        for _ in 0..200 {
            engine.observe("a1", "request_info:general").unwrap();
        }
        // Fixed point of t = t + 0.2(1 - t) - 0.01 is 0.95.
        assert!((engine.get_trust("a1").unwrap() - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_from_config() {
        let config = TrustConfig {
            learning_rate: 0.5,
            decay: 0.0,
            initial_trust: 0.2,
            malicious_markers: vec!["drop_table".into()],
        };
        let mut engine = TrustEngine::from_config(&config).unwrap();
        engine.register("a1").unwrap();
        assert!(!engine.observe("a1", "exfiltrate:secret").unwrap());
        assert!((engine.get_trust("a1").unwrap() - 0.6).abs() < EPS);
        assert!(engine.observe("a1", "drop_table users").unwrap());
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = TrustConfig {
            learning_rate: -0.1,
            ..TrustConfig::default()
        };
        assert!(matches!(
            TrustEngine::from_config(&config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_custom_classifier() {
        let mut engine = TrustEngine::new().with_classifier(|action: &str| action.starts_with("deny:"));
        engine.register("a1").unwrap();
        assert!(engine.observe("a1", "deny:write").unwrap());
        assert!(!engine.observe("a1", "exfiltrate:secret").unwrap());
    }
}
