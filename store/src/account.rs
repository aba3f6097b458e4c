//! Account storage trait.

use crate::StoreError;
use tessera_ledger::Account;
use tessera_types::{PublicKey, TokenId};

/// Read access to accounts, keyed by `(token, public_key)`.
pub trait AccountStore {
    fn get_account(&self, token: &TokenId, key: &PublicKey) -> Result<Option<Account>, StoreError>;
    fn account_count(&self) -> Result<u64, StoreError>;

    /// Like [`AccountStore::get_account`], but a missing account is an error.
    fn require_account(&self, token: &TokenId, key: &PublicKey) -> Result<Account, StoreError> {
        self.get_account(token, key)?
            .ok_or_else(|| StoreError::NotFound(format!("account {key:?} in token {token}")))
    }
}
