#![deny(unused)]
//! Governance layer for TrustMesh.
//!
//! This crate provides:
//! - Isolation control with a ledger-backed audit trail
//! - A threshold-driven simulation driver
//! - Tracing subscriber setup
//! - Prometheus metrics

pub mod isolation;
pub mod metrics;
pub mod simulation;
pub mod tracing_layer;

pub use isolation::{read_ledger, write_ledger, IsolationAction, IsolationController};
pub use self::metrics::{setup_metrics_recorder, track_report};
pub use simulation::{IsolationEvent, Simulation, SimulationReport, StepReport, LOW_TRUST_REASON};
pub use tracing_layer::configure_tracing;
