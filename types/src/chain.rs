//! Committed chain-state summary.

use crate::{BlockHash, Timestamp};
use serde::{Deserialize, Serialize};

/// The tip of the canonical chain after an update is committed.
///
/// Published to listeners on every commit and handed to the forging engine
/// as the base for its next candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTip {
    pub height: u64,
    pub hash: BlockHash,
    /// Total work accumulated up to and including this block.
    pub cumulative_difficulty: u128,
    pub timestamp: Timestamp,
}

impl ChainTip {
    pub fn new(
        height: u64,
        hash: BlockHash,
        cumulative_difficulty: u128,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            height,
            hash,
            cumulative_difficulty,
            timestamp,
        }
    }
}
