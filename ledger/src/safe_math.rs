use crate::LedgerError;

/// Add (`sign = true`) or subtract `delta`, refusing to wrap.
pub(crate) fn checked_update(sign: bool, value: u64, delta: u64) -> Result<u64, LedgerError> {
    if sign {
        value.checked_add(delta).ok_or(LedgerError::ArithmeticOverflow)
    } else {
        value.checked_sub(delta).ok_or(LedgerError::ArithmeticUnderflow)
    }
}

pub(crate) fn checked_sum(values: impl IntoIterator<Item = u64>) -> Result<u64, LedgerError> {
    values
        .into_iter()
        .try_fold(0u64, |acc, v| acc.checked_add(v).ok_or(LedgerError::ArithmeticOverflow))
}
