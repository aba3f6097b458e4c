//! Ristretto view keypairs.

use crate::hash::blake2b_512;
use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::scalar::Scalar;
use tessera_types::{PrivateKey, PublicKey};

/// A private view key and the public key it unlocks.
pub struct ViewKeypair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

/// Derive a keypair from a 32-byte seed (deterministic).
pub fn keypair_from_seed(seed: &[u8; 32]) -> ViewKeypair {
    let scalar = Scalar::from_bytes_mod_order_wide(&blake2b_512(seed));
    ViewKeypair {
        public: PublicKey((RISTRETTO_BASEPOINT_POINT * scalar).compress().to_bytes()),
        private: PrivateKey(scalar.to_bytes()),
    }
}

/// Generate a fresh keypair from the thread-local random source.
pub fn generate_keypair() -> ViewKeypair {
    keypair_from_seed(&rand::random::<[u8; 32]>())
}

/// Derive the public key belonging to a private view key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    let scalar = Scalar::from_bytes_mod_order(*private.as_bytes());
    PublicKey((RISTRETTO_BASEPOINT_POINT * scalar).compress().to_bytes())
}
