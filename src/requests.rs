//! Request scheduling
//!
//! Rarest-first piece selection: needed pieces are ranked by how few peers
//! hold them, equal-rarity ties are broken by a uniform random shuffle, and
//! the number of distinct requested pieces is capped by the per-round
//! budget. Each selected piece is requested from every peer that holds it;
//! the engine resolves duplicate fulfillment, so the redundancy costs
//! nothing and guards against stalls.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::rarity;
use crate::types::{PeerId, PeerSnapshot, Request};

/// Compute this round's block requests.
///
/// `owned_blocks[i]` is the number of blocks of piece `i` already owned; a
/// piece is needed while that count is below `blocks_per_piece`. Pieces no
/// peer holds are skipped entirely and do not consume the request budget.
///
/// Identical inputs plus an identical RNG state produce identical output
/// ordering.
pub fn compute_requests<R: Rng>(
    own_id: PeerId,
    owned_blocks: &[u32],
    snapshots: &[PeerSnapshot],
    blocks_per_piece: u32,
    max_requests: usize,
    rng: &mut R,
) -> Vec<Request> {
    let needed: Vec<u32> = (0..owned_blocks.len() as u32)
        .filter(|&i| owned_blocks[i as usize] < blocks_per_piece)
        .collect();

    if needed.is_empty() || max_requests == 0 {
        return Vec::new();
    }

    tracing::debug!(peer = %own_id, still_needed = needed.len(), "scheduling requests");

    let counts = rarity::piece_counts(snapshots, owned_blocks.len());

    // Only pieces some peer can actually serve compete for budget slots.
    let mut candidates: Vec<(u32, u32)> = needed
        .into_iter()
        .filter_map(|piece| {
            let holders = counts[piece as usize];
            (holders > 0).then_some((piece, holders))
        })
        .collect();

    // Shuffle before the stable sort so equal-rarity pieces come out in
    // uniform random order.
    candidates.shuffle(rng);
    candidates.sort_by_key(|&(_, holders)| holders);
    candidates.truncate(max_requests);

    // Holders are visited in ascending id order for deterministic output.
    let mut peers: Vec<&PeerSnapshot> = snapshots.iter().collect();
    peers.sort_by_key(|p| p.id);

    let mut requests = Vec::new();
    for (piece, _) in candidates {
        let start_block = owned_blocks[piece as usize];
        for peer in &peers {
            if peer.has_piece(piece) {
                requests.push(Request::new(own_id, peer.id, piece, start_block));
            }
        }
    }

    requests
}
