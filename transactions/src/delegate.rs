//! Delegation payloads: open a delegated stake, add to it, withdraw from it.

use tessera_ledger::{BufferReader, BufferWriter, CodecError};
use tessera_types::{PublicKey, PUBLIC_KEY_SIZE};

/// Opens a delegated-stake record with a staking authority.
///
/// `amount` is debited from the plaintext native balance and scheduled as a
/// pending stake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegatePayload {
    /// Authority that forges on the delegator's behalf.
    pub authority: PublicKey,
    /// Fee the authority keeps, fixed for the life of the record.
    pub fee: u16,
    pub amount: u64,
}

/// Moves more plaintext native balance into an existing delegation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakePayload {
    pub amount: u64,
}

/// Withdraws available stake. The amount is paid out to the encrypted native
/// balance once the unstake window passes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnstakePayload {
    pub amount: u64,
}

impl DelegatePayload {
    pub(crate) fn write_to(&self, writer: &mut BufferWriter) {
        writer.write_bytes(self.authority.as_bytes());
        writer.write_uvarint16(self.fee);
        writer.write_uvarint(self.amount);
    }

    pub(crate) fn read_from(reader: &mut BufferReader<'_>) -> Result<Self, CodecError> {
        let authority = PublicKey(reader.read_array::<PUBLIC_KEY_SIZE>()?);
        let fee = reader.read_uvarint16("delegate fee")?;
        let amount = reader.read_uvarint()?;
        Ok(Self {
            authority,
            fee,
            amount,
        })
    }
}
