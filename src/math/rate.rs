//! Rate type for collateralization ratios and accrual factors using U256

use {
    crate::{
        error::LedgerError,
        math::{common::*, Decimal},
    },
    alloc::{format, string::ToString},
    core::fmt,
    odra::casper_types::U256,
};

/// Ratio as a scaled value
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Eq, Ord)]
pub struct Rate(pub U256);

impl Rate {
    /// One (100%)
    pub fn one() -> Self {
        Self(Self::wad())
    }

    /// Zero (0%)
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    fn wad() -> U256 {
        U256::from(WAD)
    }

    /// Create rate from percent value (0-100)
    pub fn from_percent(percent: u8) -> Self {
        Self(U256::from(percent as u64 * PERCENT_SCALER))
    }

    /// Create rate from a ratio in millionths (1_000_000 = 100%)
    pub fn from_millionths(ratio: u32) -> Self {
        Self(U256::from(ratio) * U256::from(RATIO_SCALER))
    }

    /// Return raw scaled value
    pub fn to_scaled_val(&self) -> U256 {
        self.0
    }

    /// Create rate from scaled value
    pub fn from_scaled_val(scaled_val: U256) -> Self {
        Self(scaled_val)
    }

    /// Growth of `current` over `initial`, floored to 18 decimals and never
    /// below one.
    pub fn accrual(current: Decimal, initial: Decimal) -> Result<Self, LedgerError> {
        if initial.is_zero() {
            return Err(LedgerError::MathOverflow);
        }
        let ratio = Self::from(current.try_div(initial)?);
        Ok(ratio.max(Self::one()))
    }

    /// Calculate power (for compound interest)
    pub fn try_pow(&self, exponent: u64) -> Result<Self, LedgerError> {
        if exponent == 0 {
            return Ok(Self::one());
        }

        let mut result = Self::one();
        let mut base = *self;
        let mut exp = exponent;

        while exp > 0 {
            if exp % 2 == 1 {
                result = result.try_mul(base)?;
            }
            exp /= 2;
            if exp > 0 {
                base = base.try_mul(base)?;
            }
        }

        Ok(result)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scaled_val = self.0.to_string();
        if scaled_val.len() <= SCALE {
            let padding = "0".repeat(SCALE - scaled_val.len());
            scaled_val = format!("0.{}{}", padding, scaled_val);
        } else {
            scaled_val.insert(scaled_val.len() - SCALE, '.');
        }
        f.write_str(&scaled_val)
    }
}

impl From<u64> for Rate {
    fn from(val: u64) -> Self {
        Self(Self::wad().checked_mul(U256::from(val)).unwrap_or(U256::zero()))
    }
}

impl From<Decimal> for Rate {
    fn from(decimal: Decimal) -> Self {
        Self(decimal.0)
    }
}

impl TryAdd for Rate {
    fn try_add(self, rhs: Self) -> Result<Self, LedgerError> {
        Ok(Self(self.0.checked_add(rhs.0).ok_or(LedgerError::MathOverflow)?))
    }
}

impl TrySub for Rate {
    fn try_sub(self, rhs: Self) -> Result<Self, LedgerError> {
        Ok(Self(self.0.checked_sub(rhs.0).ok_or(LedgerError::MathOverflow)?))
    }
}

impl TryDiv<Rate> for Rate {
    fn try_div(self, rhs: Self) -> Result<Self, LedgerError> {
        Ok(Self(
            self.0
                .checked_mul(Self::wad())
                .ok_or(LedgerError::MathOverflow)?
                .checked_div(rhs.0)
                .ok_or(LedgerError::MathOverflow)?,
        ))
    }
}

impl TryMul<Rate> for Rate {
    fn try_mul(self, rhs: Self) -> Result<Self, LedgerError> {
        Ok(Self(
            self.0
                .checked_mul(rhs.0)
                .ok_or(LedgerError::MathOverflow)?
                .checked_div(Self::wad())
                .ok_or(LedgerError::MathOverflow)?,
        ))
    }
}
