//! Scaled decimal used for amounts and accrual values.

#![allow(clippy::assign_op_pattern)]
#![allow(clippy::manual_range_contains)]

use {
    crate::{
        error::LedgerError,
        math::{common::*, Rate},
    },
    alloc::{string::ToString, vec},
    core::fmt,
    odra::casper_types::U256,
};

/// Large decimal values, precise to 18 digits
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Eq, Ord)]
pub struct Decimal(pub U256);

impl odra::casper_types::bytesrepr::ToBytes for Decimal {
    fn to_bytes(&self) -> Result<alloc::vec::Vec<u8>, odra::casper_types::bytesrepr::Error> {
        self.0.to_bytes()
    }

    fn serialized_length(&self) -> usize {
        self.0.serialized_length()
    }
}

impl odra::casper_types::bytesrepr::FromBytes for Decimal {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), odra::casper_types::bytesrepr::Error> {
        let (value, remainder) = U256::from_bytes(bytes)?;
        Ok((Decimal(value), remainder))
    }
}

impl odra::casper_types::CLTyped for Decimal {
    fn cl_type() -> odra::casper_types::CLType {
        odra::casper_types::CLType::U256
    }
}

impl Decimal {
    /// One
    pub fn one() -> Self {
        Self(U256::from(WAD))
    }

    /// Zero
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    fn wad() -> U256 {
        U256::from(WAD)
    }

    /// Wrap a raw 18-decimal amount
    pub fn from_scaled_val(scaled_val: U256) -> Self {
        Self(scaled_val)
    }

    /// Raw 18-decimal amount
    pub fn to_scaled_val(&self) -> U256 {
        self.0
    }

    /// Is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiply by a rate, rounding up.
    ///
    /// Used for values owed to the system.
    pub fn try_mul_ceil(self, rhs: Rate) -> Result<Self, LedgerError> {
        let product = self
            .0
            .checked_mul(rhs.0)
            .ok_or(LedgerError::MathOverflow)?;
        let rounded = product
            .checked_add(Self::wad() - U256::one())
            .ok_or(LedgerError::MathOverflow)?;
        Ok(Self(rounded / Self::wad()))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scaled_val = self.0.to_string();
        if scaled_val.len() <= SCALE {
            scaled_val.insert_str(0, &vec!["0"; SCALE - scaled_val.len()].join(""));
            scaled_val.insert_str(0, "0.");
        } else {
            scaled_val.insert(scaled_val.len() - SCALE, '.');
        }
        f.write_str(&scaled_val)
    }
}

impl From<u64> for Decimal {
    fn from(val: u64) -> Self {
        Self(Self::wad().checked_mul(U256::from(val)).unwrap_or(U256::zero()))
    }
}

impl From<U256> for Decimal {
    fn from(val: U256) -> Self {
        Self(val)
    }
}

impl From<Rate> for Decimal {
    fn from(rate: Rate) -> Self {
        Self(rate.0)
    }
}

impl TryAdd for Decimal {
    fn try_add(self, rhs: Self) -> Result<Self, LedgerError> {
        Ok(Self(self.0.checked_add(rhs.0).ok_or(LedgerError::MathOverflow)?))
    }
}

impl TrySub for Decimal {
    fn try_sub(self, rhs: Self) -> Result<Self, LedgerError> {
        Ok(Self(self.0.checked_sub(rhs.0).ok_or(LedgerError::MathOverflow)?))
    }
}

impl TryDiv<Rate> for Decimal {
    fn try_div(self, rhs: Rate) -> Result<Self, LedgerError> {
        self.try_div(Decimal::from(rhs))
    }
}

impl TryDiv<Decimal> for Decimal {
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

impl TryMul<Rate> for Decimal {
    fn try_mul(self, rhs: Rate) -> Result<Self, LedgerError> {
        self.try_mul(Decimal::from(rhs))
    }
}

impl TryMul<Decimal> for Decimal {
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
