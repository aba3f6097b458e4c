//! Mempool collaborator used during commit, plus a simple in-memory pool.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tessera_transactions::{validate_transaction, Transaction};
use tessera_types::TxHash;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MempoolError {
    #[error("transaction {hash} rejected: {reason}")]
    Rejected { hash: TxHash, reason: String },

    #[error("mempool unavailable: {0}")]
    Unavailable(String),
}

/// The transaction pool as seen by the update arbiter.
pub trait Mempool: Send + Sync {
    /// Put back a transaction that a committed update evicted, validating it
    /// against the new chain `height`.
    fn readmit(&self, tx: Transaction, height: u64) -> Result<TxHash, MempoolError>;

    /// Drop transactions that are now included on-chain.
    fn purge(&self, hashes: &[TxHash]) -> Result<(), MempoolError>;
}

/// A pending transaction and the chain height it was (re)admitted at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PooledTransaction {
    pub tx: Transaction,
    pub admitted_at: u64,
}

/// Unordered in-memory pool keyed by transaction hash.
#[derive(Debug, Default)]
pub struct InMemoryMempool {
    pool: Mutex<HashMap<TxHash, PooledTransaction>>,
}

impl InMemoryMempool {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TxHash, PooledTransaction>> {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn get(&self, hash: &TxHash) -> Option<PooledTransaction> {
        self.lock().get(hash).cloned()
    }
}

impl Mempool for InMemoryMempool {
    fn readmit(&self, tx: Transaction, height: u64) -> Result<TxHash, MempoolError> {
        let hash = tx.hash();
        validate_transaction(&tx).map_err(|e| MempoolError::Rejected {
            hash,
            reason: e.to_string(),
        })?;
        // A transaction already pooled keeps its original admission height.
        self.lock().entry(hash).or_insert(PooledTransaction {
            tx,
            admitted_at: height,
        });
        tracing::debug!(%hash, height, "transaction readmitted");
        Ok(hash)
    }

    fn purge(&self, hashes: &[TxHash]) -> Result<(), MempoolError> {
        let mut pool = self.lock();
        let before = pool.len();
        for hash in hashes {
            pool.remove(hash);
        }
        tracing::debug!(removed = before - pool.len(), "settled transactions purged");
        Ok(())
    }
}
