//! Error types for IS-MCTS.
//!
//! Three kinds of failure are distinguished because they are handled
//! differently by the search loop:
//!
//! - `Configuration`: the engine was set up with values it cannot run with.
//! - `StateProtocol`: a game or evaluator collaborator broke its contract.
//! - `Simulation`: anything else that went wrong during one simulation.
//!
//! The first two abort `run_search`. A `Simulation` error only skips the
//! simulation that raised it.

use thiserror::Error;

/// Errors raised by the search engine.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ISMCTSError {
    /// Invalid engine configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A collaborator violated the game/evaluator protocol.
    #[error("state protocol error: {0}")]
    StateProtocol(String),

    /// A single simulation failed; the search continues without it.
    #[error("simulation error: {0}")]
    Simulation(String),
}

impl ISMCTSError {
    /// Whether the search loop may skip this error and keep going.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Simulation(_))
    }
}

/// Result type for search operations.
pub type Result<T> = std::result::Result<T, ISMCTSError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable() {
        assert!(ISMCTSError::Simulation("x".into()).is_recoverable());
        assert!(!ISMCTSError::StateProtocol("x".into()).is_recoverable());
        assert!(!ISMCTSError::Configuration("x".into()).is_recoverable());
    }

    #[test]
    fn test_display() {
        let err = ISMCTSError::StateProtocol("resampler unavailable".into());
        assert_eq!(err.to_string(), "state protocol error: resampler unavailable");
    }
}
