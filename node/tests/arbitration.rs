//! End-to-end tests for chain-update arbitration: candidates flow through
//! the queue into a running arbiter backed by nullable infrastructure.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tessera_ledger::Account;
use tessera_node::{
    update_queue, ArbiterContext, BatchOutcome, ChainUpdate, CommitStep, ForgingControl,
    Mempool, MempoolError, NodeError, NodeMetrics, NotificationBus, SyncTracker, UpdateArbiter,
    UpdateFailure, UpdateSource,
};
use tessera_nullables::{NullClock, NullStore};
use tessera_store::{AccountChanges, AccountStore, TokenChanges};
use tessera_transactions::{StakePayload, Transaction, TxPayload};
use tessera_types::{BlockHash, ChainTip, PublicKey, Timestamp, TokenId, TxHash, NATIVE_TOKEN};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Recording collaborators
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RecordingMempool {
    readmitted: Mutex<Vec<(TxHash, u64)>>,
    purged: Mutex<Vec<TxHash>>,
    reject_nonce: Option<u64>,
}

impl Mempool for RecordingMempool {
    fn readmit(&self, tx: Transaction, height: u64) -> Result<TxHash, MempoolError> {
        let hash = tx.hash();
        if self.reject_nonce == Some(tx.nonce) {
            return Err(MempoolError::Rejected {
                hash,
                reason: "nonce already used".into(),
            });
        }
        self.readmitted.lock().unwrap().push((hash, height));
        Ok(hash)
    }

    fn purge(&self, hashes: &[TxHash]) -> Result<(), MempoolError> {
        self.purged.lock().unwrap().extend_from_slice(hashes);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingForging {
    calls: Mutex<Vec<(Option<u64>, bool)>>,
}

impl ForgingControl for RecordingForging {
    fn restart_forging(&self, tip: Option<&ChainTip>, any_forging_candidate_discarded: bool) {
        self.calls
            .lock()
            .unwrap()
            .push((tip.map(|t| t.height), any_forging_candidate_discarded));
    }
}

struct Harness {
    store: Arc<NullStore>,
    mempool: Arc<RecordingMempool>,
    forging: Arc<RecordingForging>,
    clock: Arc<NullClock>,
    bus: Arc<NotificationBus>,
    metrics: Arc<NodeMetrics>,
    sync: Arc<SyncTracker>,
}

impl Harness {
    fn new() -> Self {
        Self::with_mempool(RecordingMempool::default())
    }

    fn with_mempool(mempool: RecordingMempool) -> Self {
        let clock = Arc::new(NullClock::new(1_000));
        Self {
            store: Arc::new(NullStore::new()),
            mempool: Arc::new(mempool),
            forging: Arc::new(RecordingForging::default()),
            sync: Arc::new(SyncTracker::new(clock.clone())),
            clock,
            bus: Arc::new(NotificationBus::new(16)),
            metrics: Arc::new(NodeMetrics::new().unwrap()),
        }
    }

    fn ctx(&self) -> ArbiterContext {
        ArbiterContext {
            store: self.store.clone(),
            mempool: self.mempool.clone(),
            forging: self.forging.clone(),
            sync: self.sync.clone(),
            bus: self.bus.clone(),
            metrics: self.metrics.clone(),
        }
    }

    fn arbiter(&self) -> (UpdateArbiter, broadcast::Sender<()>) {
        let (_handle, rx) = update_queue(8);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        (UpdateArbiter::new(rx, self.ctx(), shutdown_rx), shutdown_tx)
    }

    fn forging_calls(&self) -> Vec<(Option<u64>, bool)> {
        self.forging.calls.lock().unwrap().clone()
    }
}

fn tip(height: u64) -> ChainTip {
    ChainTip::new(
        height,
        BlockHash::new([height as u8; 32]),
        u128::from(height) * 10,
        Timestamp::new(height),
    )
}

fn failed(source: UpdateSource) -> ChainUpdate {
    ChainUpdate::failure(UpdateFailure::new("candidate rejected"), source)
}

fn funded_account(seed: u8, amount: u64) -> Account {
    let mut account = Account::new(PublicKey([seed; 32]));
    account
        .adjust_plaintext_balance(true, amount, NATIVE_TOKEN)
        .unwrap();
    account
}

fn stake_tx(nonce: u64) -> Transaction {
    Transaction::new(
        PublicKey([9; 32]),
        nonce,
        1,
        TxPayload::Stake(StakePayload { amount: 50 }),
    )
}

// ---------------------------------------------------------------------------
// Batch arbitration
// ---------------------------------------------------------------------------

#[test]
fn first_success_in_batch_is_committed() {
    let h = Harness::new();
    let (mut arbiter, _shutdown) = h.arbiter();

    let batch = vec![
        failed(UpdateSource::Forging),
        failed(UpdateSource::Sync),
        ChainUpdate::success(tip(7), UpdateSource::Sync),
        ChainUpdate::success(tip(8), UpdateSource::Forging),
        failed(UpdateSource::Sync),
    ];

    match arbiter.process_batch(batch) {
        BatchOutcome::Committed {
            index,
            discarded,
            report,
        } => {
            assert_eq!(index, 2);
            assert_eq!(discarded, 4);
            assert_eq!(report.tip, tip(7));
        }
        other => panic!("expected commit, got {other:?}"),
    }

    assert_eq!(h.bus.committed_tip(), Some(tip(7)));
    // A forging candidate was in the batch.
    assert_eq!(h.forging_calls(), vec![(Some(7), true)]);
    assert_eq!(h.metrics.updates_committed.get(), 1);
    assert_eq!(h.metrics.candidates_discarded.get(), 4);
}

#[test]
fn all_failed_batch_restarts_forging_once() {
    let h = Harness::new();
    let (mut arbiter, _shutdown) = h.arbiter();

    let outcome = arbiter.process_batch(vec![
        failed(UpdateSource::Sync),
        failed(UpdateSource::Forging),
        failed(UpdateSource::Sync),
    ]);

    assert!(matches!(outcome, BatchOutcome::AllFailed { discarded: 3 }));
    assert_eq!(h.forging_calls(), vec![(None, true)]);
    assert!(h.bus.committed_tip().is_none());
    assert_eq!(h.store.account_batches(), 0);
    assert_eq!(h.metrics.all_failed_batches.get(), 1);
}

#[test]
fn all_failed_sync_batch_reports_no_forging_candidate() {
    let h = Harness::new();
    let (mut arbiter, _shutdown) = h.arbiter();

    arbiter.process_batch(vec![failed(UpdateSource::Sync)]);
    assert_eq!(h.forging_calls(), vec![(None, false)]);
}

#[test]
fn committed_update_persists_and_notifies() {
    let h = Harness::new();
    let (mut arbiter, _shutdown) = h.arbiter();
    let mut heights = h.bus.subscribe_height();
    let mut updates = h.bus.subscribe_updates();
    let mut sync_times = h.bus.subscribe_sync_time();

    let account = funded_account(3, 900);
    let mut accounts = AccountChanges::new();
    accounts.put(NATIVE_TOKEN, account.clone());
    let mut tokens = TokenChanges::new();
    tokens.put(TokenId::new([5; 20]), b"token".to_vec());

    let evicted = stake_tx(4);
    let settled = TxHash::new([0xAB; 32]);

    let update = ChainUpdate::success(tip(10), UpdateSource::Sync)
        .with_account_changes(accounts)
        .with_token_changes(tokens)
        .with_removed_tx_payloads(vec![evicted.encode()])
        .with_inserted_blocks(vec![BlockHash::new([1; 32]), BlockHash::new([2; 32])])
        .with_inserted_txs(vec![settled]);

    let outcome = arbiter.process_batch(vec![failed(UpdateSource::Forging), update]);
    let BatchOutcome::Committed { report, .. } = outcome else {
        panic!("expected commit");
    };
    assert!(report.is_clean());

    let stored = h
        .store
        .get_account(&NATIVE_TOKEN, &account.public_key)
        .unwrap()
        .unwrap();
    assert_eq!(stored.plaintext_balance(&NATIVE_TOKEN), 900);
    assert_eq!(h.store.token_batches(), 1);

    assert_eq!(
        *h.mempool.readmitted.lock().unwrap(),
        vec![(evicted.hash(), 10)]
    );
    assert_eq!(*h.mempool.purged.lock().unwrap(), vec![settled]);

    let sync = h.sync.current();
    assert_eq!(sync.blocks_changed, 2);
    assert_eq!(sync.last_change, Timestamp::new(1_000));

    assert_eq!(heights.try_recv().unwrap(), 10);
    let published = updates.try_recv().unwrap();
    assert_eq!(published.tip, tip(10));
    assert_eq!(published.sync_time, sync);
    assert_eq!(sync_times.try_recv().unwrap(), sync);
}

#[test]
fn update_without_blocks_does_not_touch_sync_time() {
    let h = Harness::new();
    let (mut arbiter, _shutdown) = h.arbiter();
    let mut sync_times = h.bus.subscribe_sync_time();

    h.clock.advance(60);
    arbiter.process_batch(vec![ChainUpdate::success(tip(3), UpdateSource::Forging)]);

    assert_eq!(h.sync.current().blocks_changed, 0);
    assert!(sync_times.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Commit step isolation
// ---------------------------------------------------------------------------

#[test]
fn failed_account_write_does_not_stop_later_steps() {
    let h = Harness::new();
    h.store.fail_account_writes(true);
    let (mut arbiter, _shutdown) = h.arbiter();

    let mut accounts = AccountChanges::new();
    accounts.put(NATIVE_TOKEN, funded_account(1, 10));
    let settled = TxHash::new([7; 32]);
    let update = ChainUpdate::success(tip(12), UpdateSource::Sync)
        .with_account_changes(accounts)
        .with_inserted_blocks(vec![BlockHash::new([12; 32])])
        .with_inserted_txs(vec![settled]);

    let BatchOutcome::Committed { report, .. } = arbiter.process_batch(vec![update]) else {
        panic!("expected commit");
    };

    assert_eq!(report.failed_steps(), vec![CommitStep::ApplyAccounts]);
    assert_eq!(h.store.account_count().unwrap(), 0);
    assert_eq!(h.store.token_batches(), 1);
    assert_eq!(*h.mempool.purged.lock().unwrap(), vec![settled]);
    assert_eq!(h.sync.current().blocks_changed, 1);
    assert_eq!(h.forging_calls(), vec![(Some(12), false)]);
    assert_eq!(h.bus.committed_tip(), Some(tip(12)));
    assert_eq!(h.metrics.commit_step_failures.get(), 1);
}

#[test]
fn undecodable_payload_stops_readmission_only() {
    let h = Harness::new();
    let (mut arbiter, _shutdown) = h.arbiter();

    let good = stake_tx(1);
    let never_reached = stake_tx(2);
    let settled = TxHash::new([3; 32]);
    let update = ChainUpdate::success(tip(20), UpdateSource::Sync)
        .with_removed_tx_payloads(vec![good.encode(), vec![0xFF, 0x01], never_reached.encode()])
        .with_inserted_txs(vec![settled]);

    let BatchOutcome::Committed { report, .. } = arbiter.process_batch(vec![update]) else {
        panic!("expected commit");
    };

    assert_eq!(report.failed_steps(), vec![CommitStep::ReadmitTransactions]);
    assert_eq!(*h.mempool.readmitted.lock().unwrap(), vec![(good.hash(), 20)]);
    assert_eq!(*h.mempool.purged.lock().unwrap(), vec![settled]);
    assert_eq!(h.forging_calls(), vec![(Some(20), false)]);
}

#[test]
fn rejected_readmission_continues_with_the_rest() {
    let h = Harness::with_mempool(RecordingMempool {
        reject_nonce: Some(2),
        ..RecordingMempool::default()
    });
    let (mut arbiter, _shutdown) = h.arbiter();

    let txs = [stake_tx(1), stake_tx(2), stake_tx(3)];
    let update = ChainUpdate::success(tip(4), UpdateSource::Sync)
        .with_removed_tx_payloads(txs.iter().map(Transaction::encode).collect());

    let BatchOutcome::Committed { report, .. } = arbiter.process_batch(vec![update]) else {
        panic!("expected commit");
    };

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0],
        NodeError::UpstreamApply {
            step: CommitStep::ReadmitTransactions,
            ..
        }
    ));
    let readmitted: Vec<TxHash> = h
        .mempool
        .readmitted
        .lock()
        .unwrap()
        .iter()
        .map(|(hash, _)| *hash)
        .collect();
    assert_eq!(readmitted, vec![txs[0].hash(), txs[2].hash()]);
}

// ---------------------------------------------------------------------------
// Running arbiter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn running_arbiter_commits_submitted_updates() {
    let h = Harness::new();
    let (handle, rx) = update_queue(4);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(UpdateArbiter::new(rx, h.ctx(), shutdown_rx).run());

    let mut tips = h.bus.watch_tip();
    handle
        .submit(ChainUpdate::success(tip(1), UpdateSource::Forging))
        .await
        .unwrap();
    tips.changed().await.unwrap();
    assert_eq!(tips.borrow().as_ref().map(|t| t.height), Some(1));

    handle
        .submit(ChainUpdate::success(tip(2), UpdateSource::Sync))
        .await
        .unwrap();
    tips.changed().await.unwrap();
    assert_eq!(tips.borrow().as_ref().map(|t| t.height), Some(2));

    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("arbiter should stop")
        .unwrap();
    assert_eq!(h.metrics.updates_committed.get(), 2);
}

#[tokio::test]
async fn arbiter_exits_when_all_producers_drop() {
    let h = Harness::new();
    let (handle, rx) = update_queue(1);
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(UpdateArbiter::new(rx, h.ctx(), shutdown_rx).run());

    let producer = handle.clone();
    drop(handle);
    drop(producer);

    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("arbiter should exit")
        .unwrap();
}

#[tokio::test]
async fn blocking_submit_from_worker_thread() {
    let h = Harness::new();
    let (handle, rx) = update_queue(2);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(UpdateArbiter::new(rx, h.ctx(), shutdown_rx).run());

    let mut heights = h.bus.subscribe_height();
    let producer = handle.clone();
    let worker = std::thread::spawn(move || {
        producer.blocking_submit(ChainUpdate::success(tip(33), UpdateSource::Forging))
    });
    worker.join().unwrap().unwrap();

    assert_eq!(heights.recv().await.unwrap(), 33);
    // The worker's handle is gone; ours keeps the arbiter alive until shutdown.
    assert!(!handle.is_closed());
    shutdown_tx.send(()).unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn arbiter_drains_worker_update_before_exiting_on_close() {
    let h = Harness::new();
    let (handle, rx) = update_queue(2);
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(UpdateArbiter::new(rx, h.ctx(), shutdown_rx).run());

    let worker = std::thread::spawn(move || {
        handle.blocking_submit(ChainUpdate::success(tip(34), UpdateSource::Forging))
    });
    worker.join().unwrap().unwrap();

    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("arbiter should exit once the last producer is gone")
        .unwrap();
    assert_eq!(h.bus.committed_tip(), Some(tip(34)));
}

#[tokio::test]
async fn submit_after_arbiter_stops_reports_closed_queue() {
    let h = Harness::new();
    let (handle, rx) = update_queue(1);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let task = tokio::spawn(UpdateArbiter::new(rx, h.ctx(), shutdown_rx).run());

    shutdown_tx.send(()).unwrap();
    task.await.unwrap();

    let err = handle
        .submit(ChainUpdate::success(tip(1), UpdateSource::Sync))
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::QueueClosed));
}
