//! Chain-update arbitration.
//!
//! Forging and sync submit [`ChainUpdate`] candidates through cloned
//! [`UpdateQueueHandle`]s. A single [`UpdateArbiter`] task receives one
//! candidate, drains whatever else is already queued into a batch, and
//! commits the first successful candidate of that batch. Everything else in
//! the batch is discarded. Because the arbiter is the only writer, the
//! commit sequence needs no locking.
//!
//! Commit side effects run in a fixed order. Each one fails on its own: a
//! failure is logged, counted and reported in the [`CommitReport`], and the
//! remaining steps still run. Nothing is retried or rolled back.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tessera_store::LedgerStore;
use tessera_transactions::Transaction;
use tessera_types::ChainTip;
use tokio::sync::{broadcast, mpsc};

use crate::chain_update::ChainUpdate;
use crate::forging::ForgingControl;
use crate::mempool::Mempool;
use crate::metrics::NodeMetrics;
use crate::notifications::{ChainDataUpdate, NotificationBus};
use crate::sync::SyncTracker;
use crate::tracing_spans::{batch_span, commit_span};
use crate::NodeError;

/// Create the intake channel. A zero capacity is treated as one.
pub fn update_queue(capacity: usize) -> (UpdateQueueHandle, mpsc::Receiver<ChainUpdate>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (UpdateQueueHandle { tx }, rx)
}

/// Producer side of the update queue.
#[derive(Clone, Debug)]
pub struct UpdateQueueHandle {
    tx: mpsc::Sender<ChainUpdate>,
}

impl UpdateQueueHandle {
    /// Submit a candidate, waiting while the queue is full.
    pub async fn submit(&self, update: ChainUpdate) -> Result<(), NodeError> {
        self.tx.send(update).await.map_err(|_| NodeError::QueueClosed)
    }

    /// Submit from a plain OS thread, such as a mining worker.
    ///
    /// Must not be called from inside an async context.
    pub fn blocking_submit(&self, update: ChainUpdate) -> Result<(), NodeError> {
        self.tx.blocking_send(update).map_err(|_| NodeError::QueueClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Commit side effects that can fail, in the order they run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommitStep {
    ApplyAccounts,
    ApplyTokens,
    ReadmitTransactions,
    PurgeTransactions,
}

impl fmt::Display for CommitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ApplyAccounts => "apply_accounts",
            Self::ApplyTokens => "apply_tokens",
            Self::ReadmitTransactions => "readmit_transactions",
            Self::PurgeTransactions => "purge_transactions",
        };
        f.write_str(name)
    }
}

/// What happened when a committed update was applied.
#[derive(Debug)]
pub struct CommitReport {
    pub tip: ChainTip,
    /// One [`NodeError::UpstreamApply`] per failed side effect.
    pub failures: Vec<NodeError>,
}

impl CommitReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_steps(&self) -> Vec<CommitStep> {
        self.failures
            .iter()
            .filter_map(|e| match e {
                NodeError::UpstreamApply { step, .. } => Some(*step),
                _ => None,
            })
            .collect()
    }
}

/// Result of arbitrating one batch.
#[derive(Debug)]
pub enum BatchOutcome {
    /// The candidate at `index` was committed.
    Committed {
        index: usize,
        discarded: usize,
        report: CommitReport,
    },
    /// No candidate succeeded; forging was told to restart.
    AllFailed { discarded: usize },
    Empty,
}

/// Collaborators the arbiter drives during a commit.
#[derive(Clone)]
pub struct ArbiterContext {
    pub store: Arc<dyn LedgerStore>,
    pub mempool: Arc<dyn Mempool>,
    pub forging: Arc<dyn ForgingControl>,
    pub sync: Arc<SyncTracker>,
    pub bus: Arc<NotificationBus>,
    pub metrics: Arc<NodeMetrics>,
}

/// The single consumer of the update queue.
pub struct UpdateArbiter {
    intake: mpsc::Receiver<ChainUpdate>,
    ctx: ArbiterContext,
    shutdown: broadcast::Receiver<()>,
    last_tip: Option<ChainTip>,
}

impl UpdateArbiter {
    pub fn new(
        intake: mpsc::Receiver<ChainUpdate>,
        ctx: ArbiterContext,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            intake,
            ctx,
            shutdown,
            last_tip: None,
        }
    }

    /// Start from a tip committed before this arbiter existed.
    pub fn with_committed_tip(mut self, tip: ChainTip) -> Self {
        self.last_tip = Some(tip);
        self
    }

    pub fn last_committed_tip(&self) -> Option<&ChainTip> {
        self.last_tip.as_ref()
    }

    /// Run until shutdown is signalled or every producer handle is dropped.
    pub async fn run(mut self) {
        tracing::info!("update arbiter started");
        loop {
            let first = tokio::select! {
                biased;
                _ = self.shutdown.recv() => {
                    tracing::info!("update arbiter shutting down");
                    break;
                }
                update = self.intake.recv() => match update {
                    Some(update) => update,
                    None => {
                        tracing::info!("all update producers dropped, arbiter exiting");
                        break;
                    }
                },
            };

            let batch = self.drain(first);
            self.process_batch(batch);
        }
    }

    fn drain(&mut self, first: ChainUpdate) -> Vec<ChainUpdate> {
        let mut batch = vec![first];
        while let Ok(next) = self.intake.try_recv() {
            batch.push(next);
        }
        batch
    }

    /// Arbitrate one batch: commit the first success, discard the rest.
    pub fn process_batch(&mut self, batch: Vec<ChainUpdate>) -> BatchOutcome {
        if batch.is_empty() {
            return BatchOutcome::Empty;
        }
        let _span = batch_span(batch.len()).entered();
        let metrics = Arc::clone(&self.ctx.metrics);
        metrics.candidates_received.inc_by(batch.len() as u64);
        metrics.batches_processed.inc();
        metrics.batch_size.observe(batch.len() as f64);

        let any_forging = batch.iter().any(ChainUpdate::produced_by_forging);
        let mut winner: Option<(usize, ChainTip, ChainUpdate)> = None;
        let mut discarded = 0usize;

        for (index, update) in batch.into_iter().enumerate() {
            let success = update.tip().cloned();
            match (success, winner.is_none()) {
                (Some(tip), true) => winner = Some((index, tip, update)),
                (Some(tip), false) => {
                    discarded += 1;
                    tracing::warn!(
                        index,
                        height = tip.height,
                        hash = %tip.hash,
                        source = %update.source,
                        "discarding successful candidate superseded earlier in batch"
                    );
                }
                (None, _) => {
                    discarded += 1;
                    if let Err(failure) = &update.outcome {
                        tracing::debug!(
                            index,
                            source = %update.source,
                            reason = %failure,
                            "discarding failed candidate"
                        );
                    }
                }
            }
        }
        metrics.candidates_discarded.inc_by(discarded as u64);

        match winner {
            Some((index, tip, update)) => {
                let report = self.commit(tip, update, any_forging);
                BatchOutcome::Committed {
                    index,
                    discarded,
                    report,
                }
            }
            None => {
                metrics.all_failed_batches.inc();
                tracing::info!(
                    candidates = discarded,
                    any_forging,
                    "no candidate in batch succeeded, restarting forging"
                );
                self.ctx.forging.restart_forging(None, any_forging);
                BatchOutcome::AllFailed { discarded }
            }
        }
    }

    fn commit(&mut self, tip: ChainTip, update: ChainUpdate, any_forging: bool) -> CommitReport {
        let _span = commit_span(tip.height, update.source).entered();
        let started = Instant::now();
        let mut failures = Vec::new();

        // (a) publish the new committed tip
        self.ctx.bus.publish_tip(&tip);
        self.last_tip = Some(tip.clone());
        self.ctx
            .metrics
            .committed_height
            .set(i64::try_from(tip.height).unwrap_or(i64::MAX));

        // (b) persist state deltas
        if let Err(e) = self.ctx.store.apply_account_changes(&update.account_changes) {
            failures.push(self.step_failed(CommitStep::ApplyAccounts, e.to_string()));
        }
        if let Err(e) = self.ctx.store.apply_token_changes(&update.token_changes) {
            failures.push(self.step_failed(CommitStep::ApplyTokens, e.to_string()));
        }

        // (c) put evicted transactions back in the pool
        for (i, payload) in update.removed_tx_payloads.iter().enumerate() {
            let tx = match Transaction::decode(payload) {
                Ok(tx) => tx,
                Err(e) => {
                    // The rest of the payload set cannot be trusted.
                    failures.push(self.step_failed(
                        CommitStep::ReadmitTransactions,
                        format!("payload {i} undecodable: {e}"),
                    ));
                    break;
                }
            };
            if let Err(e) = self.ctx.mempool.readmit(tx, tip.height) {
                failures.push(self.step_failed(CommitStep::ReadmitTransactions, e.to_string()));
            }
        }

        // (d) drop settled transactions
        if !update.inserted_tx_hashes.is_empty() {
            if let Err(e) = self.ctx.mempool.purge(&update.inserted_tx_hashes) {
                failures.push(self.step_failed(CommitStep::PurgeTransactions, e.to_string()));
            }
        }

        // (e) sync progress
        let (sync_time, sync_changed) = self
            .ctx
            .sync
            .add_blocks_changed(update.inserted_block_hashes.len() as u64);

        // (f) forge on the new tip
        self.ctx.forging.restart_forging(Some(&tip), any_forging);

        // (g) general subscribers
        self.ctx.bus.publish_height(tip.height);
        self.ctx.bus.publish_update(Arc::new(ChainDataUpdate {
            tip: tip.clone(),
            sync_time,
        }));
        if sync_changed {
            self.ctx.bus.publish_sync_time(sync_time);
        }

        self.ctx.metrics.updates_committed.inc();
        self.ctx
            .metrics
            .commit_latency_ms
            .observe(started.elapsed().as_secs_f64() * 1000.0);

        tracing::info!(
            height = tip.height,
            hash = %tip.hash,
            blocks = update.inserted_block_hashes.len(),
            txs = update.inserted_tx_hashes.len(),
            readmitted = update.removed_tx_payloads.len(),
            failures = failures.len(),
            "committed chain update"
        );

        CommitReport { tip, failures }
    }

    fn step_failed(&self, step: CommitStep, reason: String) -> NodeError {
        tracing::error!(step = %step, reason = %reason, "commit side effect failed");
        self.ctx.metrics.commit_step_failures.inc();
        NodeError::UpstreamApply { step, reason }
    }
}
