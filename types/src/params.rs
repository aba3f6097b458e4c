//! Protocol parameters that govern ledger mutation.

use serde::{Deserialize, Serialize};

/// Parameters consulted when stake operations are scheduled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParams {
    /// Blocks between inclusion of a stake operation and its activation.
    pub pending_stake_window: u64,

    /// Blocks between inclusion of an unstake operation and the moment the
    /// amount is credited back to the encrypted native balance.
    pub pending_unstake_window: u64,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            pending_stake_window: 10,
            pending_unstake_window: 60,
        }
    }
}

impl ProtocolParams {
    /// Short windows for local test networks.
    pub fn testnet_defaults() -> Self {
        Self {
            pending_stake_window: 2,
            pending_unstake_window: 5,
        }
    }
}
