//! Key types for account identity and balance viewing.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size in bytes of an encoded public key (compressed Ristretto point).
pub const PUBLIC_KEY_SIZE: usize = 32;

/// A 32-byte public key. Accounts are keyed by it and it doubles as the
/// ElGamal key for homomorphic balances.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; PUBLIC_KEY_SIZE]);

/// A 32-byte private view key (secret scalar, canonical little-endian encoding).
///
/// This type intentionally does not implement `Debug`, `Serialize`, or `Clone`
/// to prevent accidental exposure. Key bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// Build a key from an untrusted slice; `None` when the length is wrong.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; PUBLIC_KEY_SIZE]>::try_from(bytes).ok().map(Self)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl PrivateKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert!(PublicKey::from_slice(&[1u8; 31]).is_none());
        assert!(PublicKey::from_slice(&[1u8; 33]).is_none());
        assert_eq!(PublicKey::from_slice(&[7u8; 32]), Some(PublicKey([7u8; 32])));
    }

    #[test]
    fn display_is_full_hex() {
        assert_eq!(PublicKey([0xab; 32]).to_string(), "ab".repeat(32));
    }
}
