//! Identifiers and value types shared across the ledger.

use odra::casper_types::U256;
use odra::prelude::*;

use crate::error::LedgerError;

/// Asset identifier
pub type AssetId = [u8; 6];
/// Series identifier
pub type SeriesId = [u8; 6];
/// Vault identifier
pub type VaultId = [u8; 12];

/// Quote id under which rate oracles report the accrual factor of a base
pub const RATE: AssetId = *b"RATE\0\0";

/// Returns true for the all-zero identifier.
pub fn is_zero_id(id: &[u8]) -> bool {
    id.iter().all(|b| *b == 0)
}

/// Signed change applied to a balance.
#[odra::odra_type]
#[derive(Copy, Default)]
pub struct Delta {
    /// Magnitude of the change
    pub amount: U256,
    /// True when the change decreases the balance
    pub negative: bool,
}

impl Delta {
    /// No change
    pub fn zero() -> Self {
        Self::default()
    }

    /// Increase by `amount`
    pub fn increase(amount: U256) -> Self {
        Self {
            amount,
            negative: false,
        }
    }

    /// Decrease by `amount`
    pub fn decrease(amount: U256) -> Self {
        Self {
            amount,
            negative: true,
        }
    }

    /// True if the change is a no-op
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// True if the change strictly increases the balance
    pub fn is_increase(&self) -> bool {
        !self.negative && !self.amount.is_zero()
    }

    /// Apply the change to `value`.
    pub fn apply(&self, value: U256) -> Result<U256, LedgerError> {
        if self.negative {
            value
                .checked_sub(self.amount)
                .ok_or(LedgerError::ResultBelowZero)
        } else {
            value
                .checked_add(self.amount)
                .ok_or(LedgerError::MathOverflow)
        }
    }
}

/// Roles held in the ledger's access table.
#[odra::odra_type]
#[derive(Copy)]
pub enum Role {
    /// Configures registries, limits, custody and roles
    Admin = 0,
    /// May seize vaults through `grab`
    Liquidator = 1,
}
