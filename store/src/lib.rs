//! Abstract storage traits for the Tessera ledger.
//!
//! Every storage backend (on-disk, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod account;
pub mod changes;
pub mod error;
pub mod ledger;

pub use account::AccountStore;
pub use changes::{AccountChanges, TokenChanges};
pub use error::StoreError;
pub use ledger::LedgerStore;
