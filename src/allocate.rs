//! Upload allocation
//!
//! Merges a strategy's reciprocation grants with the optimistic pick into
//! the round's final upload list. Each peer appears at most once,
//! zero-bandwidth grants are dropped, and under a reserved budget the
//! total never exceeds the capacity the strategy respected.

use crate::reciprocation::{Allocation, OptimisticBudget};
use crate::types::{PeerId, Upload};

/// Split `total` into `parts` integer shares differing by at most one,
/// larger shares first.
pub fn even_split(total: u64, parts: usize) -> Vec<u64> {
    if parts == 0 {
        return Vec::new();
    }
    let parts_u64 = parts as u64;
    let base = total / parts_u64;
    let remainder = (total % parts_u64) as usize;
    (0..parts)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Build the final upload list for the round
pub fn merge(
    own_id: PeerId,
    allocation: &Allocation,
    optimistic_pick: Option<PeerId>,
) -> Vec<Upload> {
    // The pick is drawn from the non-reciprocating set, but guard against
    // double-granting anyway.
    let pick = optimistic_pick.filter(|peer| !allocation.is_reciprocated(*peer));

    let mut uploads = match allocation.optimistic {
        OptimisticBudget::SharesEvenSplit(capacity) => {
            let chosen: Vec<PeerId> = allocation
                .grants
                .iter()
                .map(|&(peer, _)| peer)
                .chain(pick)
                .collect();
            let shares = even_split(capacity, chosen.len());
            chosen
                .into_iter()
                .zip(shares)
                .map(|(peer, bandwidth)| Upload::new(own_id, peer, bandwidth))
                .collect()
        }
        OptimisticBudget::Reserved(budget) => {
            let mut uploads: Vec<Upload> = allocation
                .grants
                .iter()
                .map(|&(peer, bandwidth)| Upload::new(own_id, peer, bandwidth))
                .collect();
            if let Some(peer) = pick {
                uploads.push(Upload::new(own_id, peer, budget));
            }
            uploads
        }
    };

    uploads.retain(|upload| upload.bandwidth > 0);
    uploads
}
