//! Write batches carried by a chain update.
//!
//! `Some` writes a value, `None` deletes the key. Keys are ordered so that
//! applying a batch is deterministic.

use std::collections::BTreeMap;
use tessera_ledger::Account;
use tessera_types::{PublicKey, TokenId};

/// Account writes keyed by `(token, public_key)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountChanges {
    entries: BTreeMap<(TokenId, PublicKey), Option<Account>>,
}

impl AccountChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `account` under its own key. A later write to the same key wins.
    pub fn put(&mut self, token: TokenId, account: Account) {
        self.entries.insert((token, account.public_key), Some(account));
    }

    pub fn delete(&mut self, token: TokenId, key: PublicKey) {
        self.entries.insert((token, key), None);
    }

    pub fn get(&self, token: &TokenId, key: &PublicKey) -> Option<&Option<Account>> {
        self.entries.get(&(*token, *key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(TokenId, PublicKey), &Option<Account>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Token metadata writes. Values are opaque to the ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenChanges {
    entries: BTreeMap<TokenId, Option<Vec<u8>>>,
}

impl TokenChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, token: TokenId, data: Vec<u8>) {
        self.entries.insert(token, Some(data));
    }

    pub fn delete(&mut self, token: TokenId) {
        self.entries.insert(token, None);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TokenId, &Option<Vec<u8>>)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
