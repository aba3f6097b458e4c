//! Token identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size in bytes of an encoded token identifier.
pub const TOKEN_ID_SIZE: usize = 20;

/// Identifies a token (asset). Balances and account buckets are keyed by it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(pub [u8; TOKEN_ID_SIZE]);

/// The chain's native token. Stake and unstake operate on it.
pub const NATIVE_TOKEN: TokenId = TokenId([0u8; TOKEN_ID_SIZE]);

impl TokenId {
    pub fn new(bytes: [u8; TOKEN_ID_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; TOKEN_ID_SIZE] {
        &self.0
    }

    pub fn is_native(&self) -> bool {
        *self == NATIVE_TOKEN
    }
}

impl Default for TokenId {
    fn default() -> Self {
        NATIVE_TOKEN
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            return write!(f, "TokenId(native)");
        }
        write!(f, "TokenId(")?;
        for b in &self.0[..4] {
            write!(f, "{:02x}", b)?;
        }
        write!(f, "\u{2026})")
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
