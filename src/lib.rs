//! # blockswarm
//!
//! Per-round decision core for a participant in a simulated block-exchange
//! swarm: given a snapshot of peers' held pieces and a log of past
//! exchanges, decide which pieces to request next and from whom, and how to
//! split a finite upload budget among the peers currently requesting.
//!
//! ## Features
//!
//! - **Rarest-first requests**: needed pieces ranked by holder count, with
//!   uniform random tie-breaking and a per-round distinct-piece budget
//! - **Three reciprocation strategies**: top-K even split,
//!   proportional-share, and ratio-adaptive (BitTyrant-style), selected by
//!   configuration
//! - **Optimistic unchoking**: an exploratory bandwidth slot rotated on a
//!   fixed cadence to discover new cooperative partners
//! - **Deterministic**: all randomness flows through an injected seedable
//!   RNG, so runs replay exactly
//!
//! The simulation engine that advances rounds, delivers blocks, and
//! enforces bandwidth caps is an external collaborator: it calls
//! [`SwarmAgent::requests`] and [`SwarmAgent::uploads`] once per round,
//! sequentially, and appends resolved transfers to the [`RoundHistory`].
//!
//! ## Quick Start
//!
//! ```rust
//! use blockswarm::{
//!     AgentConfig, PeerId, PeerSnapshot, Request, RoundHistory, Strategy, SwarmAgent,
//! };
//!
//! let config = AgentConfig::new().strategy(Strategy::Proportional);
//! let mut agent = SwarmAgent::with_seed(PeerId(0), config, 42)?;
//!
//! let history = RoundHistory::new();
//! let peers = vec![PeerSnapshot::with_pieces(PeerId(1), 4, [0, 2])];
//! let owned = [0, 0, 0, 0];
//!
//! // What we want from the swarm this round.
//! let outgoing = agent.requests(&owned, &peers, &history)?;
//!
//! // How we answer the requests addressed to us this round.
//! let incoming = vec![Request::new(PeerId(1), PeerId(0), 1, 0)];
//! let uploads = agent.uploads(&incoming, &peers, &history);
//! # let _ = (outgoing, uploads);
//! # Ok::<(), blockswarm::AgentError>(())
//! ```

// Modules
pub mod agent;
pub mod allocate;
pub mod config;
pub mod error;
pub mod ledger;
pub mod optimistic;
pub mod rarity;
pub mod reciprocation;
pub mod requests;
pub mod types;

// Re-exports for convenience
pub use agent::{AgentState, SwarmAgent};
pub use config::{AgentConfig, Strategy};
pub use error::{AgentError, Result};
pub use reciprocation::{Allocation, OptimisticBudget, PeerTracker};
pub use types::{DownloadRecord, PeerId, PeerSnapshot, Request, RoundHistory, Upload};
