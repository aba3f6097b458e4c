use crate::codec::{BufferReader, BufferWriter, CodecError};
use crate::delegated_stake::{DelegatedStake, PendingKind};
use crate::safe_math::checked_update;
use crate::LedgerError;
use std::collections::HashSet;
use tessera_crypto::{Ciphertext, CIPHERTEXT_SIZE};
use tessera_types::{PublicKey, TokenId, NATIVE_TOKEN, TOKEN_ID_SIZE};

/// The only account layout this crate reads and writes.
pub const ACCOUNT_VERSION: u64 = 0;

/// Whether an account carries a delegated-stake record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum DelegationStatus {
    None = 0,
    Active = 1,
}

impl TryFrom<u64> for DelegationStatus {
    type Error = CodecError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Active),
            other => Err(CodecError::InvalidDiscriminant {
                field: "delegated stake version",
                value: other,
            }),
        }
    }
}

/// A plaintext balance. Stored entries are never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Balance {
    pub token: TokenId,
    pub amount: u64,
}

/// An encrypted balance the ledger can add to but never read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HomomorphicBalance {
    pub token: TokenId,
    pub amount: Ciphertext,
}

/// Per-key ledger record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Store key; not part of the encoding.
    pub public_key: PublicKey,
    pub version: u64,
    pub nonce: u64,
    pub balances: Vec<Balance>,
    pub balances_homomorphic: Vec<HomomorphicBalance>,
    pub delegated_stake: Option<DelegatedStake>,
}

impl Account {
    pub fn new(public_key: PublicKey) -> Self {
        Self {
            public_key,
            version: ACCOUNT_VERSION,
            nonce: 0,
            balances: Vec::new(),
            balances_homomorphic: Vec::new(),
            delegated_stake: None,
        }
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.version != ACCOUNT_VERSION {
            return Err(LedgerError::Validation(format!(
                "unsupported account version {}",
                self.version
            )));
        }

        let mut seen = HashSet::with_capacity(self.balances.len());
        for balance in &self.balances {
            if !seen.insert(balance.token) {
                return Err(LedgerError::Validation(format!(
                    "duplicate balance for token {}",
                    balance.token
                )));
            }
            if balance.amount == 0 {
                return Err(LedgerError::Validation(format!(
                    "zero balance stored for token {}",
                    balance.token
                )));
            }
        }

        let mut seen = HashSet::with_capacity(self.balances_homomorphic.len());
        for balance in &self.balances_homomorphic {
            if !seen.insert(balance.token) {
                return Err(LedgerError::Validation(format!(
                    "duplicate encrypted balance for token {}",
                    balance.token
                )));
            }
        }

        if let Some(stake) = &self.delegated_stake {
            if stake.stake_pending.iter().any(|p| p.amount == 0) {
                return Err(LedgerError::Validation(
                    "pending stake operation with zero amount".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn increment_nonce(&mut self, sign: bool) -> Result<(), LedgerError> {
        self.nonce = checked_update(sign, self.nonce, 1)?;
        Ok(())
    }

    /// Credit (`sign = true`) or debit a plaintext balance.
    ///
    /// An entry is created on first credit and removed when it reaches zero.
    pub fn adjust_plaintext_balance(
        &mut self,
        sign: bool,
        amount: u64,
        token: TokenId,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }

        let index = self.balances.iter().position(|b| b.token == token);
        if sign {
            match index {
                Some(i) => {
                    self.balances[i].amount =
                        checked_update(true, self.balances[i].amount, amount)?;
                }
                None => self.balances.push(Balance { token, amount }),
            }
            return Ok(());
        }

        let available = index.map_or(0, |i| self.balances[i].amount);
        let insufficient = LedgerError::InsufficientBalance {
            token,
            needed: amount,
            available,
        };
        let i = index.ok_or_else(|| insufficient.clone())?;
        let remaining = available.checked_sub(amount).ok_or(insufficient)?;
        if remaining == 0 {
            self.balances.swap_remove(i);
        } else {
            self.balances[i].amount = remaining;
        }
        Ok(())
    }

    pub fn plaintext_balance(&self, token: &TokenId) -> u64 {
        self.balances
            .iter()
            .find(|b| &b.token == token)
            .map_or(0, |b| b.amount)
    }

    /// Add a plaintext amount into the encrypted balance for `token`.
    ///
    /// The entry is created as an encryption of zero under the account key
    /// the first time it is touched, even when `amount` is zero.
    pub fn credit_homomorphic(&mut self, amount: u64, token: TokenId) -> Result<(), LedgerError> {
        let index = self.balances_homomorphic.iter().position(|b| b.token == token);
        let current = match index {
            Some(i) => self.balances_homomorphic[i].amount,
            None => Ciphertext::zero_for(&self.public_key)
                .map_err(|_| LedgerError::InvalidPublicKey)?,
        };
        let updated = current.encrypt_add(amount)?;
        match index {
            Some(i) => self.balances_homomorphic[i].amount = updated,
            None => self.balances_homomorphic.push(HomomorphicBalance {
                token,
                amount: updated,
            }),
        }
        Ok(())
    }

    pub fn homomorphic_balance(&self, token: &TokenId) -> Option<&Ciphertext> {
        self.balances_homomorphic
            .iter()
            .find(|b| &b.token == token)
            .map(|b| &b.amount)
    }

    pub fn has_delegated_stake(&self) -> bool {
        self.delegated_stake.is_some()
    }

    pub fn delegation_status(&self) -> DelegationStatus {
        match self.delegated_stake {
            Some(_) => DelegationStatus::Active,
            None => DelegationStatus::None,
        }
    }

    /// Encoded form of [`Account::delegation_status`].
    pub fn delegated_stake_version(&self) -> u64 {
        self.delegation_status() as u64
    }

    pub fn create_delegated_stake(
        &mut self,
        amount: u64,
        delegated_public_key: &[u8],
        delegated_fee: u16,
    ) -> Result<(), LedgerError> {
        if self.has_delegated_stake() {
            return Err(LedgerError::AlreadyDelegated);
        }
        let key = PublicKey::from_slice(delegated_public_key).ok_or(LedgerError::InvalidPublicKey)?;
        self.delegated_stake = Some(DelegatedStake::new(amount, key, delegated_fee));
        Ok(())
    }

    /// Apply every pending operation that has matured by `height`.
    ///
    /// Stakes move into `stake_available`; unstakes are credited to the
    /// encrypted native balance. A record left with nothing in it is
    /// dropped. The account is only modified if every step succeeds.
    pub fn refresh_delegated_stake(&mut self, height: u64) -> Result<(), LedgerError> {
        if self.delegated_stake.is_none() {
            return Ok(());
        }

        let mut working = self.clone();
        if let Some(stake) = working.delegated_stake.as_mut() {
            let matured = stake.take_matured(height);
            let mut unstaked = Vec::new();
            for op in matured {
                match op.kind {
                    PendingKind::Stake => stake.add_stake_available(true, op.amount)?,
                    PendingKind::Unstake => unstaked.push(op.amount),
                }
            }
            if stake.is_empty() {
                working.delegated_stake = None;
            }
            for amount in unstaked {
                working.credit_homomorphic(amount, NATIVE_TOKEN)?;
            }
        }

        *self = working;
        Ok(())
    }

    pub fn delegated_stake_available(&self) -> u64 {
        self.delegated_stake
            .as_ref()
            .map_or(0, DelegatedStake::stake_available)
    }

    pub fn compute_delegated_stake_available(&self, height: u64) -> Result<u64, LedgerError> {
        match &self.delegated_stake {
            Some(stake) => stake.compute_stake_available(height),
            None => Ok(0),
        }
    }

    pub fn compute_delegated_unstake_pending(&self) -> Result<u64, LedgerError> {
        match &self.delegated_stake {
            Some(stake) => stake.compute_unstake_pending(),
            None => Ok(0),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut writer = BufferWriter::with_capacity(64);
        self.write_to(&mut writer)?;
        Ok(writer.finish())
    }

    pub fn write_to(&self, writer: &mut BufferWriter) -> Result<(), CodecError> {
        writer.write_uvarint(self.version);
        writer.write_uvarint(self.nonce);

        writer.write_count("balances", self.balances.len())?;
        for balance in &self.balances {
            writer.write_bytes(balance.token.as_bytes());
            writer.write_uvarint(balance.amount);
        }

        writer.write_count("balances_homomorphic", self.balances_homomorphic.len())?;
        for balance in &self.balances_homomorphic {
            writer.write_bytes(balance.token.as_bytes());
            writer.write_bytes(&balance.amount.to_bytes());
        }

        writer.write_uvarint(self.delegated_stake_version());
        if let Some(stake) = &self.delegated_stake {
            stake.write_to(writer)?;
        }
        Ok(())
    }

    /// Decode an account stored under `public_key`. The whole buffer must be
    /// consumed. Field values are not validated here; see [`Account::validate`].
    pub fn decode(public_key: PublicKey, bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = BufferReader::new(bytes);
        let account = Self::read_from(public_key, &mut reader)?;
        reader.finish()?;
        Ok(account)
    }

    pub fn read_from(
        public_key: PublicKey,
        reader: &mut BufferReader<'_>,
    ) -> Result<Self, CodecError> {
        let version = reader.read_uvarint()?;
        let nonce = reader.read_uvarint()?;

        let count = reader.read_uvarint16("balances")?;
        let mut balances = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let token = TokenId(reader.read_array::<TOKEN_ID_SIZE>()?);
            let amount = reader.read_uvarint()?;
            balances.push(Balance { token, amount });
        }

        let count = reader.read_uvarint16("balances_homomorphic")?;
        let mut balances_homomorphic = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let token = TokenId(reader.read_array::<TOKEN_ID_SIZE>()?);
            let amount = Ciphertext::from_bytes(reader.read_array::<CIPHERTEXT_SIZE>()?);
            balances_homomorphic.push(HomomorphicBalance { token, amount });
        }

        let delegated_stake = match DelegationStatus::try_from(reader.read_uvarint()?)? {
            DelegationStatus::None => None,
            DelegationStatus::Active => Some(DelegatedStake::read_from(reader)?),
        };

        Ok(Self {
            public_key,
            version,
            nonce,
            balances,
            balances_homomorphic,
            delegated_stake,
        })
    }
}
