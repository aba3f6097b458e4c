//! Stateless transaction checks.

use crate::error::TransactionError;
use crate::{Transaction, TxPayload, TRANSACTION_VERSION};

/// Validate a transaction's structure without looking at any account.
///
/// Stateful checks (nonce, balances, delegation status) happen in
/// [`crate::apply_transaction`].
pub fn validate_transaction(tx: &Transaction) -> Result<(), TransactionError> {
    if tx.version != TRANSACTION_VERSION {
        return Err(TransactionError::UnsupportedVersion(tx.version));
    }
    match &tx.payload {
        TxPayload::Delegate(_) => {}
        TxPayload::Stake(p) if p.amount == 0 => return Err(TransactionError::ZeroAmount),
        TxPayload::Unstake(p) if p.amount == 0 => return Err(TransactionError::ZeroAmount),
        TxPayload::Stake(_) | TxPayload::Unstake(_) => {}
    }
    Ok(())
}
