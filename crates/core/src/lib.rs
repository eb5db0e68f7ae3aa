#![deny(unused)]
//! Core types, configuration, and error definitions for TrustMesh.
//!
//! This crate provides the foundational building blocks shared by the ledger,
//! trust, and governance crates.

pub mod clock;
pub mod config;
pub mod error;

pub use clock::now_secs;
pub use config::{AppConfig, LedgerConfig, LoggingConfig, MetricsConfig, SimulationConfig, TrustConfig};
pub use error::{Error, Result};
