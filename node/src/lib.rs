//! Tessera ledger node: serialises competing chain updates.
//!
//! Forging workers and the sync engine both produce candidate chain updates
//! concurrently. The node funnels them through one queue into a single
//! arbiter task that:
//! - Commits the first successful candidate of each drained batch
//! - Persists its account and token deltas
//! - Readmits evicted transactions and purges settled ones
//! - Advances sync progress and restarts forging on the new tip
//! - Notifies height, update and sync-time subscribers

pub mod chain_update;
pub mod config;
pub mod error;
pub mod forging;
pub mod logging;
pub mod mempool;
pub mod metrics;
pub mod node;
pub mod notifications;
pub mod shutdown;
pub mod sync;
pub mod tracing_spans;
pub mod update_queue;

pub use chain_update::{ChainUpdate, UpdateFailure, UpdateSource};
pub use config::NodeConfig;
pub use error::NodeError;
pub use forging::{forging_stake, ForgingControl, ForgingCoordinator, ForgingTarget, ForgingWork};
pub use logging::{init_logging, LogFormat};
pub use mempool::{InMemoryMempool, Mempool, MempoolError, PooledTransaction};
pub use metrics::NodeMetrics;
pub use node::LedgerNode;
pub use notifications::{ChainDataUpdate, NotificationBus};
pub use shutdown::ShutdownController;
pub use sync::{SyncTime, SyncTracker};
pub use update_queue::{
    update_queue, ArbiterContext, BatchOutcome, CommitReport, CommitStep, UpdateArbiter,
    UpdateQueueHandle,
};
