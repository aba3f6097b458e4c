//! Transactions that mutate delegated stake, and their binary form.
//!
//! Transaction types:
//! - **Delegate**: open a delegated stake with an authority and schedule the first stake
//! - **Stake**: schedule more stake on an existing delegation
//! - **Unstake**: withdraw available stake; paid out encrypted after a delay
//!
//! Every transaction also bumps the sender's nonce and pays a plaintext fee in
//! the native token.

pub mod apply;
pub mod delegate;
pub mod error;
pub mod validation;

pub use apply::apply_transaction;
pub use delegate::{DelegatePayload, StakePayload, UnstakePayload};
pub use error::TransactionError;
pub use validation::validate_transaction;

use tessera_crypto::hash_transaction;
use tessera_ledger::{BufferReader, BufferWriter, CodecError};
use tessera_types::{PublicKey, TxHash, PUBLIC_KEY_SIZE};

/// The only transaction layout currently accepted.
pub const TRANSACTION_VERSION: u64 = 0;

/// What a transaction does to the sender's delegated stake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxPayload {
    Delegate(DelegatePayload),
    Stake(StakePayload),
    Unstake(UnstakePayload),
}

impl TxPayload {
    fn discriminant(&self) -> u8 {
        match self {
            Self::Delegate(_) => 0,
            Self::Stake(_) => 1,
            Self::Unstake(_) => 2,
        }
    }

    /// Amount moved by the payload.
    pub fn amount(&self) -> u64 {
        match self {
            Self::Delegate(p) => p.amount,
            Self::Stake(p) => p.amount,
            Self::Unstake(p) => p.amount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u64,
    pub sender: PublicKey,
    /// Must equal the sender account's nonce when applied.
    pub nonce: u64,
    pub fee: u64,
    pub payload: TxPayload,
}

impl Transaction {
    pub fn new(sender: PublicKey, nonce: u64, fee: u64, payload: TxPayload) -> Self {
        Self {
            version: TRANSACTION_VERSION,
            sender,
            nonce,
            fee,
            payload,
        }
    }

    /// Blake2b-256 of the encoded transaction.
    pub fn hash(&self) -> TxHash {
        hash_transaction(&self.encode())
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut writer = BufferWriter::with_capacity(64);
        writer.write_uvarint(self.version);
        writer.write_bytes(self.sender.as_bytes());
        writer.write_uvarint(self.nonce);
        writer.write_uvarint(self.fee);
        writer.write_u8(self.payload.discriminant());
        match &self.payload {
            TxPayload::Delegate(p) => p.write_to(&mut writer),
            TxPayload::Stake(p) => writer.write_uvarint(p.amount),
            TxPayload::Unstake(p) => writer.write_uvarint(p.amount),
        }
        writer.finish()
    }

    /// Decode a transaction, requiring the whole buffer to be consumed.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = BufferReader::new(bytes);
        let version = reader.read_uvarint()?;
        let sender = PublicKey(reader.read_array::<PUBLIC_KEY_SIZE>()?);
        let nonce = reader.read_uvarint()?;
        let fee = reader.read_uvarint()?;
        let payload = match reader.read_u8()? {
            0 => TxPayload::Delegate(DelegatePayload::read_from(&mut reader)?),
            1 => TxPayload::Stake(StakePayload {
                amount: reader.read_uvarint()?,
            }),
            2 => TxPayload::Unstake(UnstakePayload {
                amount: reader.read_uvarint()?,
            }),
            other => {
                return Err(CodecError::InvalidDiscriminant {
                    field: "transaction payload",
                    value: u64::from(other),
                })
            }
        };
        reader.finish()?;
        Ok(Self {
            version,
            sender,
            nonce,
            fee,
            payload,
        })
    }
}
