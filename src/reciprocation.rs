//! Reciprocation strategies
//!
//! Converts contribution accounting plus the current requester set into a
//! bandwidth allocation. Three interchangeable strategies sit behind one
//! entry point, selected by [`Strategy`](crate::config::Strategy):
//!
//! - **Top-K**: unchoke the top contributors, split capacity evenly.
//! - **Proportional-share**: split 90% of capacity proportionally to each
//!   requester's share of recent contribution, reserve the rest for the
//!   optimistic slot.
//! - **Ratio-adaptive** (BitTyrant-style): track, per peer, the expected
//!   download rate and the minimum upload investment that keeps the peer
//!   reciprocating, then greedily fund the best ratios until capacity runs
//!   out.
//!
//! Every strategy also reports the requesters it left unfunded; the
//! optimistic unchoke selector draws its exploratory pick from that set.

use std::collections::{BTreeSet, HashMap};

use crate::config::AgentConfig;
use crate::types::{PeerId, PeerSnapshot, RoundHistory};

/// How the optimistic pick is funded, decided by the strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimisticBudget {
    /// The pick joins an even split of the stated capacity together with
    /// the granted peers (top-K; grants carry no amounts of their own)
    SharesEvenSplit(u64),
    /// The pick receives exactly this much
    Reserved(u64),
}

/// Output of a reciprocation strategy for one round
#[derive(Debug, Clone)]
pub struct Allocation {
    /// Reciprocated peers in priority order, with per-peer bandwidth.
    /// Zero under [`OptimisticBudget::SharesEvenSplit`], where the final
    /// amounts come from the allocator's even split.
    pub grants: Vec<(PeerId, u64)>,
    /// Requesters left without a reciprocation grant, in ascending id order
    pub non_reciprocating: Vec<PeerId>,
    /// Funding rule for the optimistic slot
    pub optimistic: OptimisticBudget,
}

impl Allocation {
    /// Is this peer among the reciprocated set?
    pub fn is_reciprocated(&self, peer: PeerId) -> bool {
        self.grants.iter().any(|&(id, _)| id == peer)
    }
}

/// Per-peer bookkeeping for the ratio-adaptive strategy
#[derive(Debug, Clone, PartialEq)]
pub struct PeerTracker {
    /// Piece count seen in the previous round's snapshot
    pub prev_piece_count: usize,
    /// Estimated blocks the peer downloaded swarm-wide last round
    pub blocks_last_round: u64,
    /// Consecutive rounds this peer has unchoked us
    pub consecutive_unchoked: u32,
    /// f_j: blocks we expect to receive from the peer if it unchokes us
    pub expected_download_rate: f64,
    /// t_j: minimum upload investment we expect keeps the peer reciprocating
    pub expected_upload_rate: f64,
}

impl PeerTracker {
    /// Seed a tracker for a peer we know nothing about: assume it splits
    /// the same capacity we have across `assumed_slots` upload slots.
    fn seeded(initial_rate: f64) -> Self {
        Self {
            prev_piece_count: 0,
            blocks_last_round: 0,
            consecutive_unchoked: 0,
            expected_download_rate: initial_rate,
            expected_upload_rate: initial_rate,
        }
    }

    /// f_j / t_j, defined as 0 when t_j is 0 so a peer with no observed
    /// cost is never ranked above one with a positive ratio.
    fn ratio(&self) -> f64 {
        if self.expected_upload_rate == 0.0 {
            0.0
        } else {
            self.expected_download_rate / self.expected_upload_rate
        }
    }
}

/// Advance the ratio-adaptive trackers by one round of observations.
///
/// Runs every round regardless of whether anyone is requesting, so the
/// rate estimates stay current. Peers appearing for the first time are
/// seeded with the even-split assumption.
pub fn update_trackers(
    trackers: &mut HashMap<PeerId, PeerTracker>,
    snapshots: &[PeerSnapshot],
    history: &RoundHistory,
    config: &AgentConfig,
) {
    let initial_rate = config.up_bandwidth as f64 / config.assumed_slots as f64;
    let round = history.current_round();

    // Estimate each peer's swarm-wide download rate from how much its
    // held-piece set grew since the previous snapshot.
    for snapshot in snapshots {
        let tracker = trackers
            .entry(snapshot.id)
            .or_insert_with(|| PeerTracker::seeded(initial_rate));
        if round > 0 {
            let delta = snapshot.piece_count().saturating_sub(tracker.prev_piece_count);
            tracker.blocks_last_round = delta as u64 * config.blocks_per_piece as u64;
        }
        tracker.prev_piece_count = snapshot.piece_count();
    }

    if round == 0 {
        return;
    }

    // Blocks actually received from each peer that unchoked us last round.
    let mut received: HashMap<PeerId, u64> = HashMap::new();
    for record in history.last_rounds(1).iter().flatten() {
        *received.entry(record.from).or_insert(0) += record.blocks;
    }

    for (peer, blocks) in &received {
        let tracker = trackers
            .entry(*peer)
            .or_insert_with(|| PeerTracker::seeded(initial_rate));
        tracker.expected_download_rate = *blocks as f64;
        tracker.consecutive_unchoked += 1;
        if tracker.consecutive_unchoked > 2 {
            // Cheap to satisfy: lower the bar.
            tracker.expected_upload_rate *= 1.0 - config.gamma;
        }
    }

    for snapshot in snapshots {
        if received.contains_key(&snapshot.id) {
            continue;
        }
        if let Some(tracker) = trackers.get_mut(&snapshot.id) {
            // Choked us: assume it would grant us one of its slots if we
            // invested more, and raise the required investment.
            tracker.expected_download_rate =
                tracker.blocks_last_round as f64 / config.assumed_slots as f64;
            tracker.expected_upload_rate *= 1.0 + config.alpha;
            tracker.consecutive_unchoked = 0;
        }
    }
}

/// Run the configured strategy over this round's requesters
pub fn allocate(
    config: &AgentConfig,
    requesters: &BTreeSet<PeerId>,
    contribution: &HashMap<PeerId, u64>,
    trackers: &HashMap<PeerId, PeerTracker>,
) -> Allocation {
    use crate::config::Strategy;

    match config.strategy {
        Strategy::TopK => topk(config, requesters, contribution),
        Strategy::Proportional => proportional(config, requesters, contribution),
        Strategy::RatioAdaptive => ratio_adaptive(config, requesters, trackers),
    }
}

/// Positive-contribution requesters, highest contribution first, ties
/// broken by ascending id for determinism.
fn ranked_contributors(
    requesters: &BTreeSet<PeerId>,
    contribution: &HashMap<PeerId, u64>,
) -> Vec<(PeerId, u64)> {
    let mut ranked: Vec<(PeerId, u64)> = requesters
        .iter()
        .filter_map(|peer| {
            let blocks = contribution.get(peer).copied().unwrap_or(0);
            (blocks > 0).then_some((*peer, blocks))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}

fn topk(
    config: &AgentConfig,
    requesters: &BTreeSet<PeerId>,
    contribution: &HashMap<PeerId, u64>,
) -> Allocation {
    let mut chosen = ranked_contributors(requesters, contribution);
    chosen.truncate(config.reciprocation_slots);

    let non_reciprocating = requesters
        .iter()
        .copied()
        .filter(|peer| !chosen.iter().any(|&(id, _)| id == *peer))
        .collect();

    Allocation {
        grants: chosen.into_iter().map(|(peer, _)| (peer, 0)).collect(),
        non_reciprocating,
        optimistic: OptimisticBudget::SharesEvenSplit(config.up_bandwidth),
    }
}

fn proportional(
    config: &AgentConfig,
    requesters: &BTreeSet<PeerId>,
    contribution: &HashMap<PeerId, u64>,
) -> Allocation {
    let contributors = ranked_contributors(requesters, contribution);
    let total: u64 = contributors.iter().map(|&(_, blocks)| blocks).sum();

    let non_reciprocating: Vec<PeerId> = requesters
        .iter()
        .copied()
        .filter(|peer| !contributors.iter().any(|&(id, _)| id == *peer))
        .collect();

    if total == 0 {
        // No one earned a share: the whole capacity is up for exploration.
        return Allocation {
            grants: Vec::new(),
            non_reciprocating,
            optimistic: OptimisticBudget::Reserved(config.up_bandwidth),
        };
    }

    let share_capacity = config.up_bandwidth as f64 * (1.0 - config.optimistic_fraction);
    let grants: Vec<(PeerId, u64)> = contributors
        .into_iter()
        .map(|(peer, blocks)| {
            let share = blocks as f64 / total as f64;
            (peer, (share * share_capacity).round() as u64)
        })
        .collect();
    let granted: u64 = grants.iter().map(|&(_, bw)| bw).sum();

    Allocation {
        grants,
        non_reciprocating,
        optimistic: OptimisticBudget::Reserved(config.up_bandwidth.saturating_sub(granted)),
    }
}

fn ratio_adaptive(
    config: &AgentConfig,
    requesters: &BTreeSet<PeerId>,
    trackers: &HashMap<PeerId, PeerTracker>,
) -> Allocation {
    // All tracked peers compete on ratio; only current requesters can be
    // funded. Ties broken by ascending id for determinism.
    let mut ranked: Vec<(PeerId, f64)> = trackers
        .iter()
        .map(|(peer, tracker)| (*peer, tracker.ratio()))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));

    let mut grants = Vec::new();
    let mut non_reciprocating = Vec::new();
    let mut running: u64 = 0;

    for (peer, _) in ranked {
        if !requesters.contains(&peer) {
            continue;
        }
        let tracker = &trackers[&peer];
        let need = tracker.expected_upload_rate.ceil() as u64;

        // The running total counts every requester considered, admitted or
        // not, and admission requires staying strictly under capacity.
        running = running.saturating_add(need);
        if need > 0 && running < config.up_bandwidth {
            grants.push((peer, need));
        } else {
            non_reciprocating.push(peer);
        }
    }

    // Requesters we have never tracked cannot be ranked; they wait for the
    // optimistic slot.
    for peer in requesters {
        if !trackers.contains_key(peer) {
            non_reciprocating.push(*peer);
        }
    }
    non_reciprocating.sort();

    let granted: u64 = grants.iter().map(|&(_, bw)| bw).sum();

    Allocation {
        grants,
        non_reciprocating,
        optimistic: OptimisticBudget::Reserved(config.up_bandwidth.saturating_sub(granted)),
    }
}
