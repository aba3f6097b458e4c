//! Delegated-stake sub-ledger.
//!
//! Tracks stake that is usable right now plus a schedule of stake and
//! unstake operations that mature at a given block height.

use crate::codec::{BufferReader, BufferWriter, CodecError};
use crate::safe_math::{checked_sum, checked_update};
use crate::LedgerError;
use tessera_types::{ProtocolParams, PublicKey, PUBLIC_KEY_SIZE};

/// What a pending operation does once it matures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PendingKind {
    /// Adds to `stake_available`.
    Stake = 0,
    /// Credits the encrypted native balance.
    Unstake = 1,
}

impl PendingKind {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for PendingKind {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Stake),
            1 => Ok(Self::Unstake),
            other => Err(CodecError::InvalidDiscriminant {
                field: "pending kind",
                value: u64::from(other),
            }),
        }
    }
}

/// A scheduled stake or unstake effect. `amount` is always non-zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingOperation {
    pub activation_height: u64,
    pub kind: PendingKind,
    pub amount: u64,
}

impl PendingOperation {
    pub fn is_matured(&self, height: u64) -> bool {
        self.activation_height <= height
    }
}

/// Stake an account has committed to a staking authority.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegatedStake {
    pub stake_available: u64,
    /// Order is not meaningful; removals reorder the list.
    pub stake_pending: Vec<PendingOperation>,
    pub delegated_public_key: PublicKey,
    /// Fee the authority charges, fixed when the record is created.
    pub delegated_fee: u16,
}

impl DelegatedStake {
    pub fn new(stake_available: u64, delegated_public_key: PublicKey, delegated_fee: u16) -> Self {
        Self {
            stake_available,
            stake_pending: Vec::new(),
            delegated_public_key,
            delegated_fee,
        }
    }

    /// Nothing left to track: no usable stake and nothing scheduled.
    pub fn is_empty(&self) -> bool {
        self.stake_available == 0 && self.stake_pending.is_empty()
    }

    pub fn stake_available(&self) -> u64 {
        self.stake_available
    }

    pub fn add_stake_available(&mut self, sign: bool, amount: u64) -> Result<(), LedgerError> {
        self.stake_available = checked_update(sign, self.stake_available, amount)?;
        Ok(())
    }

    /// Schedule an operation. A zero amount schedules nothing.
    pub fn add_pending(
        &mut self,
        kind: PendingKind,
        amount: u64,
        activation_height: u64,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        self.stake_pending.push(PendingOperation {
            activation_height,
            kind,
            amount,
        });
        Ok(())
    }

    /// Schedule a stake that activates `pending_stake_window` blocks after `height`.
    pub fn add_pending_stake(
        &mut self,
        amount: u64,
        height: u64,
        params: &ProtocolParams,
    ) -> Result<(), LedgerError> {
        let activation = checked_update(true, height, params.pending_stake_window)?;
        self.add_pending(PendingKind::Stake, amount, activation)
    }

    /// Schedule an unstake that pays out `pending_unstake_window` blocks after `height`.
    pub fn add_pending_unstake(
        &mut self,
        amount: u64,
        height: u64,
        params: &ProtocolParams,
    ) -> Result<(), LedgerError> {
        let activation = checked_update(true, height, params.pending_unstake_window)?;
        self.add_pending(PendingKind::Unstake, amount, activation)
    }

    /// Remove and return every operation with `activation_height <= height`.
    pub fn take_matured(&mut self, height: u64) -> Vec<PendingOperation> {
        let mut matured = Vec::new();
        let mut i = 0;
        while i < self.stake_pending.len() {
            if self.stake_pending[i].is_matured(height) {
                matured.push(self.stake_pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        matured
    }

    /// Stake that would be available at `height` once matured stakes are
    /// counted. Does not mutate the record.
    pub fn compute_stake_available(&self, height: u64) -> Result<u64, LedgerError> {
        let matured = self
            .stake_pending
            .iter()
            .filter(|p| p.kind == PendingKind::Stake && p.is_matured(height))
            .map(|p| p.amount);
        checked_sum(std::iter::once(self.stake_available).chain(matured))
    }

    /// Total amount still waiting to be unstaked.
    pub fn compute_unstake_pending(&self) -> Result<u64, LedgerError> {
        checked_sum(
            self.stake_pending
                .iter()
                .filter(|p| p.kind == PendingKind::Unstake)
                .map(|p| p.amount),
        )
    }

    pub fn write_to(&self, writer: &mut BufferWriter) -> Result<(), CodecError> {
        writer.write_uvarint(self.stake_available);
        writer.write_count("stake_pending", self.stake_pending.len())?;
        for pending in &self.stake_pending {
            writer.write_uvarint(pending.activation_height);
            writer.write_u8(pending.kind.as_u8());
            writer.write_uvarint(pending.amount);
        }
        writer.write_bytes(self.delegated_public_key.as_bytes());
        writer.write_uvarint16(self.delegated_fee);
        Ok(())
    }

    pub fn read_from(reader: &mut BufferReader<'_>) -> Result<Self, CodecError> {
        let stake_available = reader.read_uvarint()?;
        let count = reader.read_uvarint16("stake_pending")?;
        let mut stake_pending = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let activation_height = reader.read_uvarint()?;
            let kind = PendingKind::try_from(reader.read_u8()?)?;
            let amount = reader.read_uvarint()?;
            stake_pending.push(PendingOperation {
                activation_height,
                kind,
                amount,
            });
        }
        let delegated_public_key = PublicKey(reader.read_array::<PUBLIC_KEY_SIZE>()?);
        let delegated_fee = reader.read_uvarint16("delegated_fee")?;
        Ok(Self {
            stake_available,
            stake_pending,
            delegated_public_key,
            delegated_fee,
        })
    }
}
