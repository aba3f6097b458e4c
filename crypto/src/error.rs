use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("public key is not a valid curve point")]
    InvalidPoint,

    #[error("ciphertext does not hold valid curve points")]
    InvalidCiphertext,
}
