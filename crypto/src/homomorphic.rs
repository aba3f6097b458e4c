//! ElGamal-style homomorphic balances over Ristretto.
//!
//! A ciphertext is a pair `(L, R)`. A fresh balance for public key `P = x·G`
//! starts as `(P, G)`; adding a plaintext `v` moves it to `(P + v·G, G)`.
//! The holder of `x` recovers `v·G = L − x·R` and searches for `v`.
//!
//! The ledger only ever adds into ciphertexts. Decryption is a wallet-side
//! operation and is bounded by the caller.

use crate::CryptoError;
use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;
use std::fmt;
use tessera_types::{PrivateKey, PublicKey};

/// Size in bytes of an encoded ciphertext (two compressed points).
pub const CIPHERTEXT_SIZE: usize = 64;

/// An encrypted amount.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ciphertext {
    left: [u8; 32],
    right: [u8; 32],
}

impl Ciphertext {
    /// The encryption of zero under `public_key`.
    pub fn zero_for(public_key: &PublicKey) -> Result<Self, CryptoError> {
        let point = CompressedRistretto(*public_key.as_bytes())
            .decompress()
            .ok_or(CryptoError::InvalidPoint)?;
        Ok(Self::from_points(point, RISTRETTO_BASEPOINT_POINT))
    }

    /// Homomorphically add a plaintext amount.
    pub fn encrypt_add(&self, amount: u64) -> Result<Self, CryptoError> {
        let (left, right) = self.points()?;
        Ok(Self::from_points(
            left + RISTRETTO_BASEPOINT_POINT * Scalar::from(amount),
            right,
        ))
    }

    /// Recover the plaintext, searching amounts in `0..=max_amount`.
    ///
    /// Returns `Ok(None)` when the amount is above the bound or the key does
    /// not match.
    pub fn decrypt(
        &self,
        private: &PrivateKey,
        max_amount: u64,
    ) -> Result<Option<u64>, CryptoError> {
        let (left, right) = self.points()?;
        let secret = Scalar::from_bytes_mod_order(*private.as_bytes());
        let target = left - right * secret;

        let mut candidate = RistrettoPoint::identity();
        for amount in 0..=max_amount {
            if candidate == target {
                return Ok(Some(amount));
            }
            candidate += RISTRETTO_BASEPOINT_POINT;
        }
        Ok(None)
    }

    pub fn from_bytes(bytes: [u8; CIPHERTEXT_SIZE]) -> Self {
        let mut left = [0u8; 32];
        let mut right = [0u8; 32];
        left.copy_from_slice(&bytes[..32]);
        right.copy_from_slice(&bytes[32..]);
        Self { left, right }
    }

    pub fn to_bytes(&self) -> [u8; CIPHERTEXT_SIZE] {
        let mut out = [0u8; CIPHERTEXT_SIZE];
        out[..32].copy_from_slice(&self.left);
        out[32..].copy_from_slice(&self.right);
        out
    }

    fn from_points(left: RistrettoPoint, right: RistrettoPoint) -> Self {
        Self {
            left: left.compress().to_bytes(),
            right: right.compress().to_bytes(),
        }
    }

    fn points(&self) -> Result<(RistrettoPoint, RistrettoPoint), CryptoError> {
        let left = CompressedRistretto(self.left)
            .decompress()
            .ok_or(CryptoError::InvalidCiphertext)?;
        let right = CompressedRistretto(self.right)
            .decompress()
            .ok_or(CryptoError::InvalidCiphertext)?;
        Ok((left, right))
    }
}

impl fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ciphertext(")?;
        for b in &self.left[..4] {
            write!(f, "{:02x}", b)?;
        }
        write!(f, "\u{2026})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypair_from_seed;

    #[test]
    fn fresh_balance_decrypts_to_zero() {
        let kp = keypair_from_seed(&[1u8; 32]);
        let ct = Ciphertext::zero_for(&kp.public).unwrap();
        assert_eq!(ct.decrypt(&kp.private, 10).unwrap(), Some(0));
    }

    #[test]
    fn additions_accumulate() {
        let kp = keypair_from_seed(&[2u8; 32]);
        let ct = Ciphertext::zero_for(&kp.public)
            .unwrap()
            .encrypt_add(120)
            .unwrap()
            .encrypt_add(80)
            .unwrap();
        assert_eq!(ct.decrypt(&kp.private, 1_000).unwrap(), Some(200));
    }

    #[test]
    fn wrong_key_does_not_decrypt() {
        let owner = keypair_from_seed(&[4u8; 32]);
        let other = keypair_from_seed(&[5u8; 32]);
        let ct = Ciphertext::zero_for(&owner.public).unwrap().encrypt_add(7).unwrap();
        assert_eq!(ct.decrypt(&other.private, 100).unwrap(), None);
    }

    #[test]
    fn amount_above_bound_is_not_found() {
        let kp = keypair_from_seed(&[6u8; 32]);
        let ct = Ciphertext::zero_for(&kp.public).unwrap().encrypt_add(50).unwrap();
        assert_eq!(ct.decrypt(&kp.private, 49).unwrap(), None);
    }

    #[test]
    fn invalid_public_key_is_rejected() {
        // 0xff.. is not a canonical Ristretto encoding.
        let bogus = PublicKey([0xffu8; 32]);
        assert_eq!(Ciphertext::zero_for(&bogus), Err(CryptoError::InvalidPoint));
    }

    #[test]
    fn corrupt_ciphertext_is_rejected_on_add() {
        let ct = Ciphertext::from_bytes([0xffu8; CIPHERTEXT_SIZE]);
        assert_eq!(ct.encrypt_add(1), Err(CryptoError::InvalidCiphertext));
    }

    #[test]
    fn byte_roundtrip() {
        let kp = keypair_from_seed(&[8u8; 32]);
        let ct = Ciphertext::zero_for(&kp.public).unwrap().encrypt_add(3).unwrap();
        assert_eq!(Ciphertext::from_bytes(ct.to_bytes()), ct);
    }
}
