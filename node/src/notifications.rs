//! Fan-out of committed chain state to subscribers.
//!
//! Each kind of notification has its own channel so that a slow consumer of
//! one kind never holds up another. Broadcast receivers that fall behind see
//! `RecvError::Lagged` and skip ahead; they never block the publisher.

use crate::sync::SyncTime;
use std::sync::Arc;
use tessera_types::ChainTip;
use tokio::sync::{broadcast, watch};

/// Full payload published once per committed update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainDataUpdate {
    pub tip: ChainTip,
    pub sync_time: SyncTime,
}

pub struct NotificationBus {
    height_tx: broadcast::Sender<u64>,
    update_tx: broadcast::Sender<Arc<ChainDataUpdate>>,
    sync_tx: broadcast::Sender<SyncTime>,
    tip_tx: watch::Sender<Option<ChainTip>>,
}

impl NotificationBus {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (height_tx, _) = broadcast::channel(capacity);
        let (update_tx, _) = broadcast::channel(capacity);
        let (sync_tx, _) = broadcast::channel(capacity);
        let (tip_tx, _) = watch::channel(None);
        Self {
            height_tx,
            update_tx,
            sync_tx,
            tip_tx,
        }
    }

    pub fn subscribe_height(&self) -> broadcast::Receiver<u64> {
        self.height_tx.subscribe()
    }

    pub fn subscribe_updates(&self) -> broadcast::Receiver<Arc<ChainDataUpdate>> {
        self.update_tx.subscribe()
    }

    pub fn subscribe_sync_time(&self) -> broadcast::Receiver<SyncTime> {
        self.sync_tx.subscribe()
    }

    /// Latest committed tip; `None` until the first commit.
    pub fn watch_tip(&self) -> watch::Receiver<Option<ChainTip>> {
        self.tip_tx.subscribe()
    }

    pub fn committed_tip(&self) -> Option<ChainTip> {
        self.tip_tx.borrow().clone()
    }

    pub fn publish_tip(&self, tip: &ChainTip) {
        self.tip_tx.send_replace(Some(tip.clone()));
    }

    // Send errors only mean nobody is subscribed.

    pub fn publish_height(&self, height: u64) {
        let _ = self.height_tx.send(height);
    }

    pub fn publish_update(&self, update: Arc<ChainDataUpdate>) {
        let _ = self.update_tx.send(update);
    }

    pub fn publish_sync_time(&self, sync_time: SyncTime) {
        let _ = self.sync_tx.send(sync_time);
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(256)
    }
}
