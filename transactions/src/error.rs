use tessera_ledger::{CodecError, LedgerError};
use tessera_types::PublicKey;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("unsupported transaction version {0}")]
    UnsupportedVersion(u64),

    #[error("nonce mismatch: account expects {expected}, transaction carries {got}")]
    NonceMismatch { expected: u64, got: u64 },

    #[error("transaction sender {sender:?} does not own account {account:?}")]
    SenderMismatch { sender: PublicKey, account: PublicKey },

    #[error("amount must be positive")]
    ZeroAmount,

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
