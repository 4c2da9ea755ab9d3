//! Typed error hierarchy for blockswarm
//!
//! The round path itself is total: empty or degenerate inputs degrade to
//! empty request/upload lists. Errors only arise from configuration
//! validation and from engine inputs that violate the data model.

use thiserror::Error;

/// Main error type for the decision core
#[derive(Debug, Error)]
pub enum AgentError {
    /// Invalid configuration field
    #[error("Invalid config for '{field}': {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },

    /// Owned block count above blocks_per_piece
    #[error("Piece {index} owns {owned} blocks but blocks_per_piece is {blocks_per_piece}")]
    BlockCountOverflow {
        index: u32,
        owned: u32,
        blocks_per_piece: u32,
    },
}

impl AgentError {
    /// Create an invalid config error
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;
