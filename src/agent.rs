//! Swarm agent
//!
//! One participant's decision core. The simulation engine calls
//! [`SwarmAgent::requests`] and then [`SwarmAgent::uploads`] exactly once
//! per round, sequentially; the agent owns its mutable round state and is
//! never invoked concurrently with itself. All randomness flows through the
//! injected RNG, so a seeded agent replays identically.

use std::collections::{BTreeSet, HashMap};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::allocate;
use crate::config::{AgentConfig, Strategy};
use crate::error::{AgentError, Result};
use crate::ledger;
use crate::optimistic;
use crate::reciprocation::{self, PeerTracker};
use crate::requests;
use crate::types::{PeerId, PeerSnapshot, Request, RoundHistory, Upload};

/// Mutable per-participant round state
#[derive(Debug, Clone, Default)]
pub struct AgentState {
    /// Rounds this agent has completed (advances once per uploads call)
    pub round: u64,
    /// Current optimistic unchoke occupant
    pub optimistic_spot: Option<PeerId>,
    /// Per-peer rate bookkeeping for the ratio-adaptive strategy
    pub trackers: HashMap<PeerId, PeerTracker>,
}

/// A swarm participant's per-round decision logic
pub struct SwarmAgent<R: Rng = StdRng> {
    id: PeerId,
    config: AgentConfig,
    state: AgentState,
    rng: R,
}

impl SwarmAgent<StdRng> {
    /// Create an agent with an entropy-seeded RNG
    pub fn new(id: PeerId, config: AgentConfig) -> Result<Self> {
        Self::with_rng(id, config, StdRng::from_entropy())
    }

    /// Create an agent with a fixed seed for reproducible runs
    pub fn with_seed(id: PeerId, config: AgentConfig, seed: u64) -> Result<Self> {
        Self::with_rng(id, config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SwarmAgent<R> {
    /// Create an agent with an injected RNG
    pub fn with_rng(id: PeerId, config: AgentConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            id,
            config,
            state: AgentState::default(),
            rng,
        })
    }

    /// This agent's identifier
    pub fn id(&self) -> PeerId {
        self.id
    }

    /// Rounds completed so far
    pub fn round(&self) -> u64 {
        self.state.round
    }

    /// Current optimistic unchoke occupant, if any
    pub fn optimistic_spot(&self) -> Option<PeerId> {
        self.state.optimistic_spot
    }

    /// Read access to the full round state (for engine-side introspection)
    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// Decide which blocks to request this round and from whom.
    ///
    /// `owned_blocks[i]` is the number of blocks of piece `i` this agent
    /// already owns. Called once per round, before [`uploads`](Self::uploads).
    pub fn requests(
        &mut self,
        owned_blocks: &[u32],
        snapshots: &[PeerSnapshot],
        history: &RoundHistory,
    ) -> Result<Vec<Request>> {
        for (index, &owned) in owned_blocks.iter().enumerate() {
            if owned > self.config.blocks_per_piece {
                return Err(AgentError::BlockCountOverflow {
                    index: index as u32,
                    owned,
                    blocks_per_piece: self.config.blocks_per_piece,
                });
            }
        }

        tracing::trace!(
            peer = %self.id,
            round = history.current_round(),
            peers = snapshots.len(),
            "computing requests"
        );

        Ok(requests::compute_requests(
            self.id,
            owned_blocks,
            snapshots,
            self.config.blocks_per_piece,
            self.config.max_requests,
            &mut self.rng,
        ))
    }

    /// Allocate this round's upload bandwidth among current requesters.
    ///
    /// `incoming` is the full set of requests addressed to this agent this
    /// round; requests targeting other peers are ignored. Called once per
    /// round, after [`requests`](Self::requests). The round counter
    /// advances on every call, including when no one is requesting.
    pub fn uploads(
        &mut self,
        incoming: &[Request],
        snapshots: &[PeerSnapshot],
        history: &RoundHistory,
    ) -> Vec<Upload> {
        // Rate estimates stay current even on idle rounds.
        if self.config.strategy == Strategy::RatioAdaptive {
            reciprocation::update_trackers(
                &mut self.state.trackers,
                snapshots,
                history,
                &self.config,
            );
        }

        let requesters: BTreeSet<PeerId> = incoming
            .iter()
            .filter(|request| request.target == self.id)
            .map(|request| request.requester)
            .collect();

        let contribution = ledger::recent_contribution(history, self.config.window_size);
        let allocation =
            reciprocation::allocate(&self.config, &requesters, &contribution, &self.state.trackers);

        self.state.optimistic_spot = optimistic::select_spot(
            self.state.optimistic_spot,
            self.state.round,
            self.config.optimistic_rounds,
            &allocation.non_reciprocating,
            &allocation.grants,
            &mut self.rng,
        );

        let uploads = allocate::merge(self.id, &allocation, self.state.optimistic_spot);

        tracing::debug!(
            peer = %self.id,
            round = self.state.round,
            requesters = requesters.len(),
            granted = uploads.len(),
            "allocated uploads"
        );

        self.state.round += 1;
        uploads
    }
}
