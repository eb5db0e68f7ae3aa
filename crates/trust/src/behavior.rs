//! Synthetic action generation for simulated agents.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const BENIGN_ACTION: &str = "request_info:general";
const NOISY_ACTIONS: [&str; 2] = [BENIGN_ACTION, "request_info:config"];
const MALICIOUS_ACTIONS: [&str; 2] = ["exfiltrate:secret", "bypass_auth:token"];

/// How a simulated agent behaves on a given step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    /// Safe information request.
    #[default]
    Benign,
    /// Benign but broader, may touch configuration.
    Noisy,
    /// Attempts to exfiltrate data or bypass authentication.
    Malicious,
}

impl Behavior {
    /// Produce a textual action for this behavior.
    pub fn action<R: Rng + ?Sized>(self, rng: &mut R) -> &'static str {
        match self {
            Self::Benign => BENIGN_ACTION,
            Self::Noisy => pick(&NOISY_ACTIONS, rng),
            Self::Malicious => pick(&MALICIOUS_ACTIONS, rng),
        }
    }
}

fn pick<R: Rng + ?Sized>(pool: &[&'static str], rng: &mut R) -> &'static str {
    pool.choose(rng).copied().unwrap_or(BENIGN_ACTION)
}
