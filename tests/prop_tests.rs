//! Property tests for the allocation and scheduling invariants

use std::collections::BTreeSet;

use blockswarm::{
    AgentConfig, DownloadRecord, PeerId, PeerSnapshot, Request, RoundHistory, Strategy, SwarmAgent,
};
use proptest::prelude::*;

fn snapshots_from(masks: &[Vec<bool>]) -> Vec<PeerSnapshot> {
    masks
        .iter()
        .enumerate()
        .map(|(i, mask)| {
            let held = mask
                .iter()
                .enumerate()
                .filter_map(|(piece, &has)| has.then_some(piece as u32));
            PeerSnapshot::with_pieces(PeerId(i as u64 + 1), mask.len(), held)
        })
        .collect()
}

proptest! {
    /// The ratio-adaptive strategy never over-allocates, for any capacity,
    /// swarm size, or history.
    #[test]
    fn ratio_adaptive_conserves_bandwidth(
        up_bandwidth in 1u64..500,
        num_peers in 1usize..10,
        seed in any::<u64>(),
        blocks in proptest::collection::vec(
            proptest::collection::vec(0u64..50, 0..10),
            5,
        ),
    ) {
        let config = AgentConfig::new()
            .strategy(Strategy::RatioAdaptive)
            .up_bandwidth(up_bandwidth);
        let mut agent = SwarmAgent::with_seed(PeerId(0), config, seed).unwrap();

        let snapshots: Vec<PeerSnapshot> = (1..=num_peers as u64)
            .map(|id| PeerSnapshot::new(PeerId(id), 4))
            .collect();
        let incoming: Vec<Request> = (1..=num_peers as u64)
            .map(|id| Request::new(PeerId(id), PeerId(0), 0, 0))
            .collect();

        let mut history = RoundHistory::new();
        for round_blocks in &blocks {
            let uploads = agent.uploads(&incoming, &snapshots, &history);
            let total: u64 = uploads.iter().map(|u| u.bandwidth).sum();
            prop_assert!(total <= up_bandwidth, "allocated {} of {}", total, up_bandwidth);

            let records = round_blocks
                .iter()
                .enumerate()
                .map(|(i, &b)| {
                    DownloadRecord::new(PeerId(i as u64 % num_peers as u64 + 1), PeerId(0), b)
                })
                .collect();
            history.push_round(records);
        }
    }

    /// Distinct requested pieces never exceed the budget or the number of
    /// needed pieces some peer can serve, and rarity never decreases along
    /// the emitted order.
    #[test]
    fn request_budget_and_rarest_first_hold(
        masks in proptest::collection::vec(
            proptest::collection::vec(any::<bool>(), 12),
            0..6,
        ),
        owned in proptest::collection::vec(0u32..=4, 12),
        max_requests in 0usize..8,
        seed in any::<u64>(),
    ) {
        let config = AgentConfig::new().max_requests(max_requests);
        let mut agent = SwarmAgent::with_seed(PeerId(0), config, seed).unwrap();
        let snapshots = snapshots_from(&masks);
        let history = RoundHistory::new();

        let requests = agent.requests(&owned, &snapshots, &history).unwrap();

        let holders = |piece: u32| -> usize {
            snapshots.iter().filter(|s| s.has_piece(piece)).count()
        };

        let servable_needed = (0..12u32)
            .filter(|&p| owned[p as usize] < 4 && holders(p) > 0)
            .count();

        let distinct: BTreeSet<u32> = requests.iter().map(|r| r.piece).collect();
        prop_assert!(distinct.len() <= max_requests.min(servable_needed));

        // Requests arrive grouped by piece, rarest group first.
        let mut order: Vec<u32> = Vec::new();
        for request in &requests {
            if order.last() != Some(&request.piece) {
                order.push(request.piece);
            }
        }
        prop_assert_eq!(order.len(), distinct.len(), "pieces must be grouped");
        for pair in order.windows(2) {
            prop_assert!(holders(pair[0]) <= holders(pair[1]));
        }

        for request in &requests {
            prop_assert!(owned[request.piece as usize] < 4, "only needed pieces");
            prop_assert_eq!(request.start_block, owned[request.piece as usize]);
        }
    }

    /// Proportional grants sum to ~90% of capacity (within per-peer
    /// rounding) whenever anyone contributed.
    #[test]
    fn proportional_normalizes_to_shared_pool(
        contributions in proptest::collection::vec(1u64..200, 1..8),
        up_bandwidth in 10u64..1000,
        seed in any::<u64>(),
    ) {
        let config = AgentConfig::new()
            .strategy(Strategy::Proportional)
            .up_bandwidth(up_bandwidth);
        let mut agent = SwarmAgent::with_seed(PeerId(0), config, seed).unwrap();

        let mut history = RoundHistory::new();
        let records = contributions
            .iter()
            .enumerate()
            .map(|(i, &b)| DownloadRecord::new(PeerId(i as u64 + 1), PeerId(0), b))
            .collect();
        history.push_round(records);

        let incoming: Vec<Request> = (1..=contributions.len() as u64)
            .map(|id| Request::new(PeerId(id), PeerId(0), 0, 0))
            .collect();

        let uploads = agent.uploads(&incoming, &[], &history);
        let total: u64 = uploads.iter().map(|u| u.bandwidth).sum();

        // Every contributor requested, so no optimistic pick exists and
        // the output is exactly the proportional pool.
        let pool = up_bandwidth as f64 * 0.9;
        let slack = 0.5 * contributions.len() as f64 + 1.0;
        prop_assert!((total as f64 - pool).abs() <= slack,
            "total {} vs pool {}", total, pool);
    }
}
