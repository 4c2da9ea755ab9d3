//! Core data model
//!
//! Value types exchanged across the engine boundary: peer identity, piece
//! availability snapshots, block requests, upload grants, and the
//! append-only download history. Pieces are opaque indexed units; ownership
//! is tracked at block granularity by the engine and handed to the agent as
//! a per-piece owned-block count.

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to a participant by the simulation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer{}", self.0)
    }
}

/// What one peer holds at the start of a round, as visible to this agent.
///
/// The held-piece set is monotonically non-decreasing over the peer's
/// lifetime from this agent's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerSnapshot {
    /// Peer identifier
    pub id: PeerId,
    /// Bitfield of pieces the peer holds
    pieces: BitVec<u8, Msb0>,
}

impl PeerSnapshot {
    /// Create a snapshot for a peer holding no pieces
    pub fn new(id: PeerId, num_pieces: usize) -> Self {
        Self {
            id,
            pieces: bitvec![u8, Msb0; 0; num_pieces],
        }
    }

    /// Create a snapshot from a list of held piece indices
    pub fn with_pieces(id: PeerId, num_pieces: usize, held: impl IntoIterator<Item = u32>) -> Self {
        let mut snapshot = Self::new(id, num_pieces);
        for piece in held {
            snapshot.set_piece(piece);
        }
        snapshot
    }

    /// Mark a piece as held. Out-of-range indices are ignored.
    pub fn set_piece(&mut self, piece: u32) {
        if let Some(mut bit) = self.pieces.get_mut(piece as usize) {
            *bit = true;
        }
    }

    /// Does the peer hold this piece?
    pub fn has_piece(&self, piece: u32) -> bool {
        self.pieces
            .get(piece as usize)
            .map(|b| *b)
            .unwrap_or(false)
    }

    /// Number of pieces the peer holds
    pub fn piece_count(&self) -> usize {
        self.pieces.count_ones()
    }

    /// Iterate over held piece indices in ascending order
    pub fn held_pieces(&self) -> impl Iterator<Item = u32> + '_ {
        self.pieces.iter_ones().map(|i| i as u32)
    }

    /// Total number of pieces in the torrent
    pub fn num_pieces(&self) -> usize {
        self.pieces.len()
    }
}

/// A block request emitted by the request scheduler.
///
/// `start_block` is the count of blocks of the piece already owned, so a
/// request always resumes at the first missing block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Who is asking
    pub requester: PeerId,
    /// Who is asked
    pub target: PeerId,
    /// Which piece
    pub piece: u32,
    /// First missing block of the piece
    pub start_block: u32,
}

impl Request {
    /// Create a new request
    pub fn new(requester: PeerId, target: PeerId, piece: u32, start_block: u32) -> Self {
        Self {
            requester,
            target,
            piece,
            start_block,
        }
    }
}

/// An upload grant produced once per round by the upload allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    /// Uploading participant
    pub from: PeerId,
    /// Receiving participant
    pub to: PeerId,
    /// Granted bandwidth for this round, in blocks
    pub bandwidth: u64,
}

impl Upload {
    /// Create a new upload grant
    pub fn new(from: PeerId, to: PeerId, bandwidth: u64) -> Self {
        Self {
            from,
            to,
            bandwidth,
        }
    }
}

/// One resolved transfer, appended to history by the engine after uploads
/// settle. Immutable once written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    /// Uploader
    pub from: PeerId,
    /// Downloader
    pub to: PeerId,
    /// Blocks actually delivered
    pub blocks: u64,
}

impl DownloadRecord {
    /// Create a new download record
    pub fn new(from: PeerId, to: PeerId, blocks: u64) -> Self {
        Self { from, to, blocks }
    }
}

/// Append-only per-round sequence of download records, as visible to one
/// agent. Only the engine appends; the decision core reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundHistory {
    rounds: Vec<Vec<DownloadRecord>>,
}

impl RoundHistory {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed rounds on record
    pub fn current_round(&self) -> u64 {
        self.rounds.len() as u64
    }

    /// Append the records observed in a finished round (engine side)
    pub fn push_round(&mut self, records: Vec<DownloadRecord>) {
        self.rounds.push(records);
    }

    /// The last `n` rounds of records, oldest first
    pub fn last_rounds(&self, n: usize) -> &[Vec<DownloadRecord>] {
        let start = self.rounds.len().saturating_sub(n);
        &self.rounds[start..]
    }

    /// All rounds on record, oldest first
    pub fn rounds(&self) -> &[Vec<DownloadRecord>] {
        &self.rounds
    }
}
