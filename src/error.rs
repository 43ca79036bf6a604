//! Error types for the agent SEO pipeline
//!
//! The transform and classification entry points recover from bad input
//! locally and never surface these errors. They appear at the edges:
//! decoding byte input, loading site configuration, and scanning page trees.

use thiserror::Error;

/// Errors raised by the fallible edges of the crate
#[derive(Debug, Error)]
pub enum AgentSeoError {
    /// Character encoding error
    #[error("Encoding error: {0}")]
    Encoding(String),
    /// Site configuration is malformed or inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
    /// Filesystem access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AgentSeoError {
    /// Stable numeric error code, suitable for logs and host bindings
    pub fn code(&self) -> u32 {
        match self {
            AgentSeoError::Encoding(_) => 2,
            AgentSeoError::Config(_) => 6,
            AgentSeoError::Io(_) => 7,
        }
    }
}

impl From<serde_json::Error> for AgentSeoError {
    fn from(err: serde_json::Error) -> Self {
        AgentSeoError::Config(err.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, AgentSeoError>;
