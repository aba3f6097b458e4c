//! Account ledger state machine.
//!
//! An [`Account`] is the per-key record mutated when a chain update is
//! applied: a replay-protection nonce, plaintext token balances,
//! homomorphically-encrypted balances and an optional [`DelegatedStake`]
//! sub-ledger whose pending operations mature with block height.
//!
//! Nothing in this crate performs I/O or synchronisation. Every mutation is
//! all-or-nothing: a call that returns an error leaves the account untouched.

pub mod account;
pub mod codec;
pub mod delegated_stake;
pub mod error;
mod safe_math;

pub use account::{Account, Balance, DelegationStatus, HomomorphicBalance, ACCOUNT_VERSION};
pub use codec::{BufferReader, BufferWriter, CodecError};
pub use delegated_stake::{DelegatedStake, PendingKind, PendingOperation};
pub use error::LedgerError;
