use thiserror::Error;

use crate::update_queue::CommitStep;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("store error: {0}")]
    Store(#[from] tessera_store::StoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] tessera_ledger::LedgerError),

    #[error("transaction error: {0}")]
    Transaction(#[from] tessera_transactions::TransactionError),

    #[error("config error: {0}")]
    Config(String),

    #[error("update queue is closed")]
    QueueClosed,

    #[error("commit step {step} failed: {reason}")]
    UpstreamApply { step: CommitStep, reason: String },

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("node already started")]
    AlreadyStarted,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
