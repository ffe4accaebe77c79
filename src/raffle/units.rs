//! SUI / MIST conversion. 1 SUI = 10^9 MIST.

use thiserror::Error;

pub const MIST_PER_SUI: u64 = 1_000_000_000;
const DECIMALS: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("'{0}' is not a decimal amount")]
    Invalid(String),

    #[error("'{0}' has more than 9 fractional digits")]
    TooPrecise(String),

    #[error("'{0}' overflows u64 MIST")]
    Overflow(String),
}

/// Parse a decimal SUI amount ("1.5", "0.000000001", "12") into MIST.
pub fn sui_to_mist(amount: &str) -> Result<u64, AmountError> {
    let s = amount.trim();
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    if (whole.is_empty() && frac.is_empty())
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
    {
        return Err(AmountError::Invalid(amount.to_string()));
    }
    if frac.len() > DECIMALS {
        return Err(AmountError::TooPrecise(amount.to_string()));
    }

    let overflow = || AmountError::Overflow(amount.to_string());
    let whole: u64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| overflow())? };
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = DECIMALS).parse().map_err(|_| overflow())?
    };

    whole
        .checked_mul(MIST_PER_SUI)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(overflow)
}

/// Render MIST as a SUI decimal string without trailing zeros ("1.5", "2").
pub fn mist_to_sui(mist: u64) -> String {
    let whole = mist / MIST_PER_SUI;
    let frac = mist % MIST_PER_SUI;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0>width$}", frac, width = DECIMALS);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
