use serde::{Deserialize, Serialize};

/// One classified action in an agent's history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
    pub malicious: bool,
}

/// Reputation state for a single agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    id: String,
    trust: f64,
    history: Vec<Observation>,
}

impl Agent {
    pub(crate) fn new(id: impl Into<String>, trust: f64) -> Self {
        Self {
            id: id.into(),
            trust,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current score, always within [0, 1].
    pub fn trust(&self) -> f64 {
        self.trust
    }

    /// Observations in the order they were recorded.
    pub fn history(&self) -> &[Observation] {
        &self.history
    }

    pub fn malicious_count(&self) -> usize {
        self.history.iter().filter(|o| o.malicious).count()
    }

    pub(crate) fn record(&mut self, trust: f64, observation: Observation) {
        self.trust = trust;
        self.history.push(observation);
    }
}
