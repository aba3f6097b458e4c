//! The ledger node: wires the update arbiter to storage, mempool, forging
//! and notification subscribers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tessera_store::LedgerStore;
use tessera_types::{ChainTip, Clock};

use crate::chain_update::ChainUpdate;
use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::forging::{ForgingControl, ForgingCoordinator};
use crate::mempool::Mempool;
use crate::metrics::NodeMetrics;
use crate::notifications::NotificationBus;
use crate::shutdown::ShutdownController;
use crate::sync::SyncTracker;
use crate::update_queue::{update_queue, ArbiterContext, UpdateArbiter, UpdateQueueHandle};

/// Timeout for waiting on background tasks during shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct LedgerNode {
    pub config: NodeConfig,
    pub store: Arc<dyn LedgerStore>,
    pub mempool: Arc<dyn Mempool>,
    pub forging: Arc<ForgingCoordinator>,
    pub sync: Arc<SyncTracker>,
    pub bus: Arc<NotificationBus>,
    pub metrics: Arc<NodeMetrics>,
    pub shutdown: ShutdownController,
    queue: UpdateQueueHandle,
    intake: Option<mpsc::Receiver<ChainUpdate>>,
    initial_tip: Option<ChainTip>,
    task_handles: Vec<JoinHandle<()>>,
}

impl LedgerNode {
    pub fn new(
        config: NodeConfig,
        store: Arc<dyn LedgerStore>,
        mempool: Arc<dyn Mempool>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, NodeError> {
        config.validate()?;
        let (queue, intake) = update_queue(config.update_queue_capacity);
        Ok(Self {
            bus: Arc::new(NotificationBus::new(config.notification_capacity)),
            metrics: Arc::new(NodeMetrics::new()?),
            forging: Arc::new(ForgingCoordinator::new()),
            sync: Arc::new(SyncTracker::new(clock)),
            shutdown: ShutdownController::new(),
            config,
            store,
            mempool,
            queue,
            intake: Some(intake),
            initial_tip: None,
            task_handles: Vec::new(),
        })
    }

    /// Resume from a tip loaded at startup. Has no effect once started.
    pub fn with_committed_tip(mut self, tip: ChainTip) -> Self {
        self.initial_tip = Some(tip);
        self
    }

    /// A producer handle for forging workers and the sync engine.
    pub fn queue(&self) -> UpdateQueueHandle {
        self.queue.clone()
    }

    pub fn is_running(&self) -> bool {
        self.intake.is_none()
    }

    /// Spawn the update arbiter.
    pub fn start(&mut self) -> Result<(), NodeError> {
        let intake = self.intake.take().ok_or(NodeError::AlreadyStarted)?;

        let ctx = ArbiterContext {
            store: Arc::clone(&self.store),
            mempool: Arc::clone(&self.mempool),
            forging: self.forging.clone(),
            sync: Arc::clone(&self.sync),
            bus: Arc::clone(&self.bus),
            metrics: Arc::clone(&self.metrics),
        };
        let mut arbiter = UpdateArbiter::new(intake, ctx, self.shutdown.subscribe());
        if let Some(tip) = self.initial_tip.take() {
            tracing::info!(height = tip.height, hash = %tip.hash, "resuming from committed tip");
            self.bus.publish_tip(&tip);
            self.forging.restart_forging(Some(&tip), false);
            arbiter = arbiter.with_committed_tip(tip);
        }

        self.task_handles.push(tokio::spawn(arbiter.run()));
        tracing::info!(
            queue_capacity = self.config.update_queue_capacity,
            "ledger node started"
        );
        Ok(())
    }

    /// Signal shutdown and wait for background tasks to finish.
    pub async fn stop(&mut self) -> Result<(), NodeError> {
        tracing::info!("ledger node stopping");
        self.shutdown.shutdown();

        let handles: Vec<JoinHandle<()>> = self.task_handles.drain(..).collect();
        let wait_all = async {
            for handle in handles {
                if let Err(e) = handle.await {
                    tracing::error!(error = %e, "background task panicked");
                }
            }
        };
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, wait_all).await.is_err() {
            tracing::warn!(
                timeout = ?SHUTDOWN_TIMEOUT,
                "shutdown timed out, tasks may still be running"
            );
        }

        if self.config.enable_metrics {
            tracing::info!(
                committed = self.metrics.updates_committed.get(),
                discarded = self.metrics.candidates_discarded.get(),
                step_failures = self.metrics.commit_step_failures.get(),
                "final update metrics"
            );
        }
        tracing::info!("ledger node stopped");
        Ok(())
    }

    /// Prometheus text export, when metrics are enabled.
    pub fn metrics_text(&self) -> Result<Option<String>, NodeError> {
        if !self.config.enable_metrics {
            return Ok(None);
        }
        Ok(Some(self.metrics.encode_text()?))
    }
}
