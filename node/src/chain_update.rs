//! Candidate chain updates produced by forging and sync.

use std::fmt;
use tessera_store::{AccountChanges, TokenChanges};
use tessera_types::{BlockHash, ChainTip, TxHash};
use thiserror::Error;

/// Which producer built a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateSource {
    /// The local forger mined a block.
    Forging,
    /// A block was imported from the network.
    Sync,
}

impl fmt::Display for UpdateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forging => f.write_str("forging"),
            Self::Sync => f.write_str("sync"),
        }
    }
}

/// Why a producer could not build a valid new tip.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct UpdateFailure {
    pub reason: String,
}

impl UpdateFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A proposed new canonical state plus the deltas needed to apply it.
///
/// Lives for one arbitration cycle and is never persisted.
#[derive(Clone, Debug)]
pub struct ChainUpdate {
    pub outcome: Result<ChainTip, UpdateFailure>,
    pub account_changes: AccountChanges,
    pub token_changes: TokenChanges,
    /// Encoded transactions evicted from the pool by this update.
    pub removed_tx_payloads: Vec<Vec<u8>>,
    pub inserted_block_hashes: Vec<BlockHash>,
    /// Transactions now settled on-chain.
    pub inserted_tx_hashes: Vec<TxHash>,
    pub source: UpdateSource,
}

impl ChainUpdate {
    /// A successful candidate with no state deltas yet.
    pub fn success(tip: ChainTip, source: UpdateSource) -> Self {
        Self::with_outcome(Ok(tip), source)
    }

    pub fn failure(failure: UpdateFailure, source: UpdateSource) -> Self {
        Self::with_outcome(Err(failure), source)
    }

    fn with_outcome(outcome: Result<ChainTip, UpdateFailure>, source: UpdateSource) -> Self {
        Self {
            outcome,
            account_changes: AccountChanges::new(),
            token_changes: TokenChanges::new(),
            removed_tx_payloads: Vec::new(),
            inserted_block_hashes: Vec::new(),
            inserted_tx_hashes: Vec::new(),
            source,
        }
    }

    pub fn with_account_changes(mut self, changes: AccountChanges) -> Self {
        self.account_changes = changes;
        self
    }

    pub fn with_token_changes(mut self, changes: TokenChanges) -> Self {
        self.token_changes = changes;
        self
    }

    pub fn with_removed_tx_payloads(mut self, payloads: Vec<Vec<u8>>) -> Self {
        self.removed_tx_payloads = payloads;
        self
    }

    pub fn with_inserted_blocks(mut self, hashes: Vec<BlockHash>) -> Self {
        self.inserted_block_hashes = hashes;
        self
    }

    pub fn with_inserted_txs(mut self, hashes: Vec<TxHash>) -> Self {
        self.inserted_tx_hashes = hashes;
        self
    }

    pub fn produced_by_forging(&self) -> bool {
        self.source == UpdateSource::Forging
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn tip(&self) -> Option<&ChainTip> {
        self.outcome.as_ref().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::Timestamp;

    #[test]
    fn source_decides_forging_flag() {
        let tip = ChainTip::new(1, BlockHash::ZERO, 1, Timestamp::EPOCH);
        assert!(ChainUpdate::success(tip.clone(), UpdateSource::Forging).produced_by_forging());
        assert!(!ChainUpdate::success(tip, UpdateSource::Sync).produced_by_forging());
    }

    #[test]
    fn failure_has_no_tip() {
        let update = ChainUpdate::failure(UpdateFailure::new("stale parent"), UpdateSource::Sync);
        assert!(!update.is_success());
        assert!(update.tip().is_none());
        assert_eq!(update.outcome.unwrap_err().to_string(), "stale parent");
    }
}
