//! Batch writes applied when a chain update is committed.

use crate::{AccountChanges, AccountStore, StoreError, TokenChanges};
use tessera_types::TokenId;

/// Storage the update arbiter commits into.
///
/// Each `apply_*` call is one transaction: readers see either none or all of
/// the batch, and a failed call leaves the store unchanged.
pub trait LedgerStore: AccountStore + Send + Sync {
    fn apply_account_changes(&self, changes: &AccountChanges) -> Result<(), StoreError>;
    fn apply_token_changes(&self, changes: &TokenChanges) -> Result<(), StoreError>;

    /// Opaque token metadata, if the token is registered.
    fn get_token(&self, token: &TokenId) -> Result<Option<Vec<u8>>, StoreError>;
}
