//! Nullable store: thread-safe in-memory ledger storage for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use tessera_ledger::Account;
use tessera_store::{AccountChanges, AccountStore, LedgerStore, StoreError, TokenChanges};
use tessera_types::{PublicKey, TokenId};

#[derive(Default)]
struct State {
    /// Accounts are kept encoded, as a real backend would hold them.
    accounts: HashMap<(TokenId, PublicKey), Vec<u8>>,
    tokens: HashMap<TokenId, Vec<u8>>,
    account_batches: u64,
    token_batches: u64,
}

/// An in-memory ledger store for testing.
///
/// One lock covers all state, so every batch is applied atomically.
/// Failures can be injected to exercise commit error paths.
#[derive(Default)]
pub struct NullStore {
    state: Mutex<State>,
    fail_account_writes: AtomicBool,
    fail_token_writes: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("null store lock poisoned".into()))
    }

    /// Seed an account directly, bypassing batch accounting.
    pub fn insert_account(&self, token: TokenId, account: &Account) -> Result<(), StoreError> {
        let bytes = account
            .encode()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.lock()?.accounts.insert((token, account.public_key), bytes);
        Ok(())
    }

    /// Store raw bytes under an account key, for corruption tests.
    pub fn insert_raw_account(
        &self,
        token: TokenId,
        key: PublicKey,
        bytes: Vec<u8>,
    ) -> Result<(), StoreError> {
        self.lock()?.accounts.insert((token, key), bytes);
        Ok(())
    }

    /// Make subsequent account batches fail without applying anything.
    pub fn fail_account_writes(&self, fail: bool) {
        self.fail_account_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent token batches fail without applying anything.
    pub fn fail_token_writes(&self, fail: bool) {
        self.fail_token_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of account batches applied so far.
    pub fn account_batches(&self) -> u64 {
        self.lock().map_or(0, |s| s.account_batches)
    }

    /// Number of token batches applied so far.
    pub fn token_batches(&self) -> u64 {
        self.lock().map_or(0, |s| s.token_batches)
    }
}

impl AccountStore for NullStore {
    fn get_account(&self, token: &TokenId, key: &PublicKey) -> Result<Option<Account>, StoreError> {
        let state = self.lock()?;
        let Some(bytes) = state.accounts.get(&(*token, *key)) else {
            return Ok(None);
        };
        let account =
            Account::decode(*key, bytes).map_err(|e| StoreError::Corruption(e.to_string()))?;
        account.validate()?;
        Ok(Some(account))
    }

    fn account_count(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.accounts.len() as u64)
    }
}

impl LedgerStore for NullStore {
    fn apply_account_changes(&self, changes: &AccountChanges) -> Result<(), StoreError> {
        if self.fail_account_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("account write rejected".into()));
        }

        // Encode the whole batch before touching state.
        let mut encoded = Vec::with_capacity(changes.len());
        for (key, account) in changes.iter() {
            let bytes = match account {
                Some(account) => Some(
                    account
                        .encode()
                        .map_err(|e| StoreError::Serialization(e.to_string()))?,
                ),
                None => None,
            };
            encoded.push((*key, bytes));
        }

        let mut state = self.lock()?;
        for (key, bytes) in encoded {
            match bytes {
                Some(bytes) => {
                    state.accounts.insert(key, bytes);
                }
                None => {
                    state.accounts.remove(&key);
                }
            }
        }
        state.account_batches += 1;
        Ok(())
    }

    fn apply_token_changes(&self, changes: &TokenChanges) -> Result<(), StoreError> {
        if self.fail_token_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("token write rejected".into()));
        }
        let mut state = self.lock()?;
        for (token, data) in changes.iter() {
            match data {
                Some(data) => {
                    state.tokens.insert(*token, data.clone());
                }
                None => {
                    state.tokens.remove(token);
                }
            }
        }
        state.token_batches += 1;
        Ok(())
    }

    fn get_token(&self, token: &TokenId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock()?.tokens.get(token).cloned())
    }
}
