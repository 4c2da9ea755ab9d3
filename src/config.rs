//! Agent configuration
//!
//! Static per-participant parameters: piece geometry, request and upload
//! budgets, and the reciprocation strategy with its tuning constants. The
//! simulation engine constructs one config per participant at startup; the
//! round path treats it as read-only.

use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};

/// Which reciprocation strategy the agent runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Unchoke the top contributors and split bandwidth evenly
    #[default]
    TopK,
    /// Split bandwidth proportionally to each requester's recent contribution
    Proportional,
    /// Ratio-driven adaptive reciprocation (BitTyrant-style)
    RatioAdaptive,
}

/// Main configuration for a swarm agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Number of blocks per piece
    pub blocks_per_piece: u32,

    /// Maximum distinct pieces to request per round
    pub max_requests: usize,

    /// Upload bandwidth capacity per round, in blocks
    pub up_bandwidth: u64,

    /// Reciprocation strategy
    pub strategy: Strategy,

    /// Look-back window for contribution accounting, in rounds
    pub window_size: usize,

    /// Regular unchoke slots for the top-K strategy
    pub reciprocation_slots: usize,

    /// Fraction of bandwidth reserved for the optimistic slot
    /// (proportional-share strategy)
    pub optimistic_fraction: f64,

    /// Rotate the optimistic slot every this many rounds
    pub optimistic_rounds: u64,

    /// Assumed upload slots on unknown peers (ratio-adaptive round-0 seed)
    pub assumed_slots: u32,

    /// Decay applied to a peer's expected upload cost once it has unchoked
    /// us for more than two consecutive rounds (ratio-adaptive)
    pub gamma: f64,

    /// Inflation applied to a peer's expected upload cost each round it
    /// chokes us (ratio-adaptive)
    pub alpha: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            blocks_per_piece: 4,
            max_requests: 8,
            up_bandwidth: 100,
            strategy: Strategy::default(),
            window_size: 2,
            reciprocation_slots: 3,
            optimistic_fraction: 0.1,
            optimistic_rounds: 3,
            assumed_slots: 4,
            gamma: 0.1,
            alpha: 0.2,
        }
    }
}

impl AgentConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reciprocation strategy
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set blocks per piece
    pub fn blocks_per_piece(mut self, blocks: u32) -> Self {
        self.blocks_per_piece = blocks;
        self
    }

    /// Set the per-round request budget
    pub fn max_requests(mut self, max: usize) -> Self {
        self.max_requests = max;
        self
    }

    /// Set the upload bandwidth capacity
    pub fn up_bandwidth(mut self, bw: u64) -> Self {
        self.up_bandwidth = bw;
        self
    }

    /// Set the contribution look-back window
    pub fn window_size(mut self, rounds: usize) -> Self {
        self.window_size = rounds;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.blocks_per_piece == 0 {
            return Err(AgentError::invalid_config(
                "blocks_per_piece",
                "Must be at least 1",
            ));
        }

        if self.window_size == 0 {
            return Err(AgentError::invalid_config(
                "window_size",
                "Must be at least 1",
            ));
        }

        if self.optimistic_rounds == 0 {
            return Err(AgentError::invalid_config(
                "optimistic_rounds",
                "Must be at least 1",
            ));
        }

        if self.assumed_slots == 0 {
            return Err(AgentError::invalid_config(
                "assumed_slots",
                "Must be at least 1",
            ));
        }

        if !(0.0..=1.0).contains(&self.optimistic_fraction) {
            return Err(AgentError::invalid_config(
                "optimistic_fraction",
                "Must be within [0, 1]",
            ));
        }

        if !(0.0..1.0).contains(&self.gamma) {
            return Err(AgentError::invalid_config(
                "gamma",
                "Must be within [0, 1)",
            ));
        }

        if self.alpha < 0.0 {
            return Err(AgentError::invalid_config("alpha", "Must be non-negative"));
        }

        Ok(())
    }
}
