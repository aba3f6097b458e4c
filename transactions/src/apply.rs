//! Application of a transaction to its sender's account.

use crate::error::TransactionError;
use crate::validation::validate_transaction;
use crate::{Transaction, TxPayload};
use tessera_ledger::{Account, DelegatedStake, LedgerError};
use tessera_types::{ProtocolParams, NATIVE_TOKEN};

/// Apply `tx` to `account` as included at block `height`.
///
/// The nonce is bumped, the fee is debited from the plaintext native
/// balance and the payload is applied. Nothing is written back unless every
/// step succeeds.
pub fn apply_transaction(
    account: &mut Account,
    tx: &Transaction,
    height: u64,
    params: &ProtocolParams,
) -> Result<(), TransactionError> {
    validate_transaction(tx)?;
    if tx.sender != account.public_key {
        return Err(TransactionError::SenderMismatch {
            sender: tx.sender,
            account: account.public_key,
        });
    }
    if tx.nonce != account.nonce {
        return Err(TransactionError::NonceMismatch {
            expected: account.nonce,
            got: tx.nonce,
        });
    }

    let mut working = account.clone();
    working.refresh_delegated_stake(height)?;
    working.increment_nonce(true)?;
    working.adjust_plaintext_balance(false, tx.fee, NATIVE_TOKEN)?;

    match &tx.payload {
        TxPayload::Delegate(p) => {
            working.adjust_plaintext_balance(false, p.amount, NATIVE_TOKEN)?;
            working.create_delegated_stake(0, p.authority.as_bytes(), p.fee)?;
            delegated(&mut working)?.add_pending_stake(p.amount, height, params)?;
        }
        TxPayload::Stake(p) => {
            if !working.has_delegated_stake() {
                return Err(LedgerError::NotDelegated.into());
            }
            working.adjust_plaintext_balance(false, p.amount, NATIVE_TOKEN)?;
            delegated(&mut working)?.add_pending_stake(p.amount, height, params)?;
        }
        TxPayload::Unstake(p) => {
            let stake = delegated(&mut working)?;
            stake.add_stake_available(false, p.amount)?;
            stake.add_pending_unstake(p.amount, height, params)?;
        }
    }

    *account = working;
    Ok(())
}

fn delegated(account: &mut Account) -> Result<&mut DelegatedStake, LedgerError> {
    account.delegated_stake.as_mut().ok_or(LedgerError::NotDelegated)
}
