//! Piece rarity tracking
//!
//! Counts, for every piece index, how many peers in the current round's
//! snapshot hold it. A dense vector scan: the counts feed the rarest-first
//! ordering in the request scheduler. Self is never part of the snapshot
//! list, so it is never counted.

use crate::types::PeerSnapshot;

/// Compute per-piece holder counts from the round's peer snapshots.
///
/// Returns a vector of length `num_pieces`; index `i` holds the number of
/// snapshot peers that currently have piece `i`. Order-independent: ties
/// between equally rare pieces are broken by the caller.
pub fn piece_counts(snapshots: &[PeerSnapshot], num_pieces: usize) -> Vec<u32> {
    let mut counts = vec![0u32; num_pieces];
    for snapshot in snapshots {
        for piece in snapshot.held_pieces() {
            if let Some(count) = counts.get_mut(piece as usize) {
                *count = count.saturating_add(1);
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PeerId;

    fn snapshot(id: u64, num_pieces: usize, held: &[u32]) -> PeerSnapshot {
        PeerSnapshot::with_pieces(PeerId(id), num_pieces, held.iter().copied())
    }

    #[test]
    fn test_empty_swarm() {
        let counts = piece_counts(&[], 4);
        assert_eq!(counts, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_counts_accumulate_across_peers() {
        let snapshots = vec![
            snapshot(1, 4, &[0, 1]),
            snapshot(2, 4, &[1, 2]),
            snapshot(3, 4, &[1]),
        ];
        let counts = piece_counts(&snapshots, 4);
        assert_eq!(counts, vec![1, 3, 1, 0]);
    }

    #[test]
    fn test_no_holders_means_zero() {
        let snapshots = vec![snapshot(1, 3, &[])];
        let counts = piece_counts(&snapshots, 3);
        assert_eq!(counts, vec![0, 0, 0]);
    }
}
