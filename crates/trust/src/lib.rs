#![deny(unused)]
//! Trust scoring for simulated agents.
//!
//! Converts a stream of observed actions into a bounded [0, 1] reputation
//! score per agent.

pub mod agent;
pub mod behavior;
pub mod classifier;
pub mod engine;

pub use agent::{Agent, Observation};
pub use behavior::{Behavior, BENIGN_ACTION};
pub use classifier::{ActionClassifier, MarkerClassifier};
pub use engine::{next_trust, TrustEngine};
