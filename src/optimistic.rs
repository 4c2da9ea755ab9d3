//! Optimistic unchoke selection
//!
//! Periodically grants an exploratory slot to a requester the
//! reciprocation strategy left unfunded, to discover new cooperative
//! partners. A pick is retained for up to `rotate_every` rounds before
//! being re-rolled, which bounds the cost of sampling strangers. A pick
//! that starts earning reciprocation "graduates" and its slot is re-rolled
//! immediately.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::types::PeerId;

/// Advance the optimistic slot by one round.
///
/// `non_reciprocating` is the strategy's unfunded-requester set for this
/// round; `reciprocated` the funded set. Returns the new slot occupant, or
/// `None` when there is no one to explore.
pub fn select_spot<R: Rng>(
    current: Option<PeerId>,
    round: u64,
    rotate_every: u64,
    non_reciprocating: &[PeerId],
    reciprocated: &[(PeerId, u64)],
    rng: &mut R,
) -> Option<PeerId> {
    if non_reciprocating.is_empty() {
        // Nothing to unchoke; never retain a stale id.
        return None;
    }

    match current {
        None => non_reciprocating.choose(rng).copied(),
        Some(spot) => {
            let graduated = reciprocated.iter().any(|&(peer, _)| peer == spot);
            if round % rotate_every == 0 || graduated {
                non_reciprocating.choose(rng).copied()
            } else {
                Some(spot)
            }
        }
    }
}
