//! Fundamental types for the Tessera ledger core.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! hashes, keys, token identifiers, the committed chain tip, protocol parameters and
//! timestamps.

pub mod block;
pub mod chain;
pub mod hash;
pub mod keys;
pub mod params;
pub mod time;
pub mod token;

pub use block::BlockHash;
pub use chain::ChainTip;
pub use hash::TxHash;
pub use keys::{PrivateKey, PublicKey, PUBLIC_KEY_SIZE};
pub use params::ProtocolParams;
pub use time::{Clock, SystemClock, Timestamp};
pub use token::{TokenId, NATIVE_TOKEN, TOKEN_ID_SIZE};
