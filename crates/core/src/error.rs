//! Error types for TrustMesh.

use thiserror::Error;

/// Result type alias using TrustMesh's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for TrustMesh.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Trust Errors
    // =========================================================================
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Agent already registered: {0}")]
    DuplicateAgent(String),

    // =========================================================================
    // Ledger Errors
    // =========================================================================
    #[error("Ledger has no blocks")]
    EmptyChain,

    #[error("Invalid block payload: {0}")]
    InvalidPayload(String),

    #[error("Mining exhausted after {attempts} attempts at difficulty {difficulty}")]
    MiningExhausted { attempts: u64, difficulty: usize },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an unknown agent error.
    pub fn unknown_agent(agent_id: impl Into<String>) -> Self {
        Self::UnknownAgent(agent_id.into())
    }

    /// Create a duplicate agent error.
    pub fn duplicate_agent(agent_id: impl Into<String>) -> Self {
        Self::DuplicateAgent(agent_id.into())
    }

    /// Create an invalid payload error.
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error means a payload could not be canonically serialized.
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization(_) | Self::InvalidPayload(_))
    }
}
