use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub trust: TrustConfig,
    pub ledger: LedgerConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

/// Parameters of the trust update rule.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrustConfig {
    /// Pull strength toward the target score, in [0, 1].
    pub learning_rate: f64,
    /// Constant erosion subtracted on every observation.
    pub decay: f64,
    /// Score assigned on registration, in [0, 1].
    pub initial_trust: f64,
    /// Substrings that mark an action as malicious.
    pub malicious_markers: Vec<String>,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.2,
            decay: 0.01,
            initial_trust: 0.5,
            malicious_markers: vec!["exfiltrate".into(), "bypass_auth".into()],
        }
    }
}

impl TrustConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(Error::invalid_config(format!(
                "trust.learning_rate must be within [0, 1], got {}",
                self.learning_rate
            )));
        }
        if !self.decay.is_finite() || self.decay < 0.0 {
            return Err(Error::invalid_config(format!(
                "trust.decay must be a non-negative number, got {}",
                self.decay
            )));
        }
        if !(0.0..=1.0).contains(&self.initial_trust) {
            return Err(Error::invalid_config(format!(
                "trust.initial_trust must be within [0, 1], got {}",
                self.initial_trust
            )));
        }
        Ok(())
    }
}

/// Proof-of-work settings for the ledger.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LedgerConfig {
    /// Required number of leading '0' hex characters in a block hash.
    pub difficulty: usize,
    /// Nonce search cap per block.
    pub max_attempts: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: 2,
            max_attempts: 20_000,
        }
    }
}

impl LedgerConfig {
    pub fn with_difficulty(difficulty: usize) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        // A SHA-256 hex digest is 64 characters long.
        if self.difficulty > 64 {
            return Err(Error::invalid_config(format!(
                "ledger.difficulty must be at most 64, got {}",
                self.difficulty
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    pub agent_count: usize,
    pub steps: usize,
    /// Chance that a step produces a malicious action.
    pub malicious_probability: f64,
    /// Agents whose trust falls below this are isolated.
    pub isolation_threshold: f64,
    /// Seed for reproducible runs. Random when absent.
    pub seed: Option<u64>,
    /// Where the binary writes the exported chain, if anywhere.
    pub export_path: Option<String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            agent_count: 5,
            steps: 200,
            malicious_probability: 0.08,
            isolation_threshold: 0.3,
            seed: None,
            export_path: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.agent_count == 0 {
            return Err(Error::invalid_config("simulation.agent_count must be positive"));
        }
        if !(0.0..=1.0).contains(&self.malicious_probability) {
            return Err(Error::invalid_config(format!(
                "simulation.malicious_probability must be within [0, 1], got {}",
                self.malicious_probability
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub json_logs: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl AppConfig {
    /// Load configuration from `./config`, honouring `TRUSTMESH_ENV`.
    pub fn load() -> Result<Self> {
        Self::load_from("config")
    }

    /// Load configuration from the given directory.
    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let env = std::env::var("TRUSTMESH_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::from(dir.join("default")).required(false))
            .add_source(File::from(dir.join(&env)).required(false))
            .add_source(File::from(dir.join("local")).required(false))
            // Map TRUSTMESH__LEDGER__DIFFICULTY=3 to ledger.difficulty
            .add_source(Environment::with_prefix("TRUSTMESH").separator("__"))
            .build()?;

        let cfg: Self = s.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.trust.validate()?;
        self.ledger.validate()?;
        self.simulation.validate()
    }
}
