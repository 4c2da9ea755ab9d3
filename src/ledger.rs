//! Contribution accounting
//!
//! Aggregates, per peer, the blocks this agent received over a look-back
//! window of rounds. Pure function of history: peers absent from the window
//! (or gone from the swarm) simply contribute zero.

use std::collections::HashMap;

use crate::types::{PeerId, RoundHistory};

/// Sum blocks received per uploading peer over the last `window_size` rounds
pub fn recent_contribution(history: &RoundHistory, window_size: usize) -> HashMap<PeerId, u64> {
    let mut totals: HashMap<PeerId, u64> = HashMap::new();
    for round in history.last_rounds(window_size) {
        for record in round {
            *totals.entry(record.from).or_insert(0) += record.blocks;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DownloadRecord;

    #[test]
    fn test_empty_history() {
        let history = RoundHistory::new();
        assert!(recent_contribution(&history, 2).is_empty());
    }

    #[test]
    fn test_window_limits_look_back() {
        let mut history = RoundHistory::new();
        history.push_round(vec![DownloadRecord::new(PeerId(1), PeerId(0), 100)]);
        history.push_round(vec![DownloadRecord::new(PeerId(1), PeerId(0), 5)]);
        history.push_round(vec![DownloadRecord::new(PeerId(2), PeerId(0), 7)]);

        let totals = recent_contribution(&history, 2);
        // The 100-block round is outside the window.
        assert_eq!(totals.get(&PeerId(1)), Some(&5));
        assert_eq!(totals.get(&PeerId(2)), Some(&7));
    }

    #[test]
    fn test_same_peer_summed_across_rounds() {
        let mut history = RoundHistory::new();
        history.push_round(vec![DownloadRecord::new(PeerId(3), PeerId(0), 4)]);
        history.push_round(vec![
            DownloadRecord::new(PeerId(3), PeerId(0), 6),
            DownloadRecord::new(PeerId(4), PeerId(0), 1),
        ]);

        let totals = recent_contribution(&history, 2);
        assert_eq!(totals.get(&PeerId(3)), Some(&10));
        assert_eq!(totals.get(&PeerId(4)), Some(&1));
    }
}
