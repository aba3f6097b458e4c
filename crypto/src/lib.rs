//! Cryptographic primitives for Tessera.
//!
//! - **Blake2b** for hashing (transaction hashes, key derivation)
//! - **Ristretto** view keypairs; an account's public key is also its ElGamal key
//! - **Homomorphic balances**: ElGamal-style ciphertexts that accept plaintext
//!   additions without being decrypted

pub mod error;
pub mod hash;
pub mod homomorphic;
pub mod keys;

pub use error::CryptoError;
pub use hash::{blake2b_256, blake2b_256_multi, blake2b_512, hash_transaction};
pub use homomorphic::{Ciphertext, CIPHERTEXT_SIZE};
pub use keys::{generate_keypair, keypair_from_seed, public_from_private, ViewKeypair};
