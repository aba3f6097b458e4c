//! Forging restarts and stale-work detection.
//!
//! Every restart bumps a shared generation counter. A mining loop holds the
//! [`ForgingWork`] it was handed and polls [`ForgingWork::is_current`]; once
//! a newer tip has been committed the check fails and the loop abandons its
//! search.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tessera_ledger::{Account, LedgerError};
use tessera_types::ChainTip;
use tokio::sync::watch;

/// Control surface the update arbiter uses to steer the forger.
pub trait ForgingControl: Send + Sync {
    /// `Some(tip)`: a new tip was committed, forge on top of it.
    /// `None`: nothing was committed; `any_forging_candidate_discarded`
    /// tells whether the forger's own candidate was thrown away.
    fn restart_forging(&self, tip: Option<&ChainTip>, any_forging_candidate_discarded: bool);
}

/// Shared token identifying the work that is currently worth doing.
#[derive(Debug, Default)]
pub struct ForgingTarget {
    generation: AtomicU64,
}

impl ForgingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn advance(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// One unit of forging work: build the block after `tip`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForgingWork {
    pub generation: u64,
    pub tip: ChainTip,
}

impl ForgingWork {
    /// False once a newer restart has been issued.
    pub fn is_current(&self, target: &ForgingTarget) -> bool {
        target.current() == self.generation
    }

    pub fn next_height(&self) -> u64 {
        self.tip.height.saturating_add(1)
    }
}

/// Stake an account may forge with at `height`: available stake plus any
/// pending stake that has matured by then.
pub fn forging_stake(account: &Account, height: u64) -> Result<u64, LedgerError> {
    account.compute_delegated_stake_available(height)
}

/// Default [`ForgingControl`]: publishes fresh [`ForgingWork`] on a watch
/// channel that forging workers subscribe to.
pub struct ForgingCoordinator {
    target: Arc<ForgingTarget>,
    last_tip: Mutex<Option<ChainTip>>,
    work_tx: watch::Sender<Option<ForgingWork>>,
}

impl ForgingCoordinator {
    pub fn new() -> Self {
        let (work_tx, _) = watch::channel(None);
        Self {
            target: Arc::new(ForgingTarget::new()),
            last_tip: Mutex::new(None),
            work_tx,
        }
    }

    pub fn target(&self) -> Arc<ForgingTarget> {
        Arc::clone(&self.target)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ForgingWork>> {
        self.work_tx.subscribe()
    }

    pub fn current_work(&self) -> Option<ForgingWork> {
        self.work_tx.borrow().clone()
    }

    fn issue(&self, tip: ChainTip) {
        let generation = self.target.advance();
        tracing::debug!(generation, height = tip.height, hash = %tip.hash, "issuing forging work");
        self.work_tx.send_replace(Some(ForgingWork { generation, tip }));
    }
}

impl Default for ForgingCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ForgingControl for ForgingCoordinator {
    fn restart_forging(&self, tip: Option<&ChainTip>, any_forging_candidate_discarded: bool) {
        let mut last_tip = self.last_tip.lock().unwrap_or_else(PoisonError::into_inner);
        match tip {
            Some(tip) => {
                *last_tip = Some(tip.clone());
                self.issue(tip.clone());
            }
            None if any_forging_candidate_discarded => match last_tip.clone() {
                Some(tip) => self.issue(tip),
                None => tracing::debug!("forging restart requested before any tip is known"),
            },
            None => {}
        }
    }
}
