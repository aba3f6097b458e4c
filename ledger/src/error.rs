use tessera_types::TokenId;
use thiserror::Error;

use crate::codec::CodecError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("invalid account: {0}")]
    Validation(String),

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("arithmetic underflow")]
    ArithmeticUnderflow,

    #[error("insufficient balance of token {token}: need {needed}, have {available}")]
    InsufficientBalance {
        token: TokenId,
        needed: u64,
        available: u64,
    },

    #[error("account already has a delegated stake")]
    AlreadyDelegated,

    #[error("account has no delegated stake")]
    NotDelegated,

    #[error("delegated public key is invalid")]
    InvalidPublicKey,

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("crypto error: {0}")]
    Crypto(#[from] tessera_crypto::CryptoError),
}
