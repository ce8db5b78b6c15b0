//! Debt ceilings and dust floors per base and ilk

use odra::casper_types::U256;
use odra::prelude::*;

use crate::error::LedgerError;
use crate::math::{Decimal, Rate};
use crate::types::{AssetId, Delta};

/// Debt ceiling and dust floor for a (base, ilk) pair, with the running total
/// of art issued against it.
#[odra::odra_type]
#[derive(Default)]
pub struct DebtLimit {
    /// Ceiling, in units of 10^dec
    pub max: U256,
    /// Dust floor per vault, in units of 10^dec
    pub min: U256,
    /// Decimal exponent applied to max and min
    pub dec: u8,
    /// Total art currently issued, at par
    pub sum: U256,
}

impl DebtLimit {
    fn scaled(&self, value: U256) -> Result<U256, LedgerError> {
        let unit = U256::from(10u64)
            .checked_pow(U256::from(self.dec))
            .ok_or(LedgerError::MathOverflow)?;
        value.checked_mul(unit).ok_or(LedgerError::MathOverflow)
    }

    /// Ceiling in base units
    pub fn line(&self) -> Result<U256, LedgerError> {
        self.scaled(self.max)
    }

    /// Dust floor in base units
    pub fn dust(&self) -> Result<U256, LedgerError> {
        self.scaled(self.min)
    }

    /// Running total after a vault's art changes by `art`, landing on
    /// `new_art` owed at `accrual`.
    ///
    /// The ceiling only binds when debt grows and is measured at par. The
    /// floor binds on every vault left with debt and is measured in base,
    /// rounded up.
    pub fn apply(&self, art: Delta, new_art: U256, accrual: Rate) -> Result<Self, LedgerError> {
        let sum = art.apply(self.sum)?;
        if art.is_increase() && sum > self.line()? {
            return Err(LedgerError::MaxDebtExceeded);
        }
        if !new_art.is_zero() {
            let owed = Decimal::from(new_art).try_mul_ceil(accrual)?;
            if owed.to_scaled_val() < self.dust()? {
                return Err(LedgerError::MinDebtNotReached);
            }
        }
        Ok(Self { sum, ..self.clone() })
    }
}

/// Debt limits per (base, ilk).
#[odra::module]
pub struct DebtLimits {
    limits: Mapping<(AssetId, AssetId), DebtLimit>,
}

#[odra::module]
impl DebtLimits {
    /// Limits and running total for `ilk_id` against `base_id`
    pub fn debt(&self, base_id: AssetId, ilk_id: AssetId) -> DebtLimit {
        self.limits.get_or_default(&(base_id, ilk_id))
    }
}

impl DebtLimits {
    /// Replace max, min and dec, keeping the running total.
    ///
    /// Both bounds must be representable in base units.
    pub fn set(
        &mut self,
        base_id: AssetId,
        ilk_id: AssetId,
        max: U256,
        min: U256,
        dec: u8,
    ) -> Result<(), LedgerError> {
        let sum = self.debt(base_id, ilk_id).sum;
        let limit = DebtLimit { max, min, dec, sum };
        limit.line()?;
        limit.dust()?;
        self.limits.set(&(base_id, ilk_id), limit);
        Ok(())
    }

    /// Check and record a change of a vault's art
    pub fn record(
        &mut self,
        base_id: AssetId,
        ilk_id: AssetId,
        art: Delta,
        new_art: U256,
        accrual: Rate,
    ) -> Result<(), LedgerError> {
        let updated = self.debt(base_id, ilk_id).apply(art, new_art, accrual)?;
        self.limits.set(&(base_id, ilk_id), updated);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn limit(max: u64, min: u64, dec: u8, sum: u64) -> DebtLimit {
        DebtLimit {
            max: U256::from(max),
            min: U256::from(min),
            dec,
            sum: U256::from(sum),
        }
    }

    #[test]
    fn dust_boundary() {
        let debt = limit(2_000_000, 1, 6, 0);
        assert!(matches!(
            debt.apply(Delta::increase(U256::from(999_999u64)), U256::from(999_999u64), Rate::one()),
            Err(LedgerError::MinDebtNotReached)
        ));
        let updated = debt.apply(
            Delta::increase(U256::from(1_000_000u64)),
            U256::from(1_000_000u64),
            Rate::one(),
        );
        assert_eq!(updated.map(|d| d.sum).ok(), Some(U256::from(1_000_000u64)));
    }

    #[test]
    fn ceiling_only_binds_when_debt_grows() {
        // Limits lowered below the running total after the fact.
        let debt = limit(1, 0, 3, 5_000);
        assert!(matches!(
            debt.apply(Delta::increase(U256::one()), U256::from(5_001u64), Rate::one()),
            Err(LedgerError::MaxDebtExceeded)
        ));
        let repaid = debt.apply(Delta::decrease(U256::from(1_000u64)), U256::from(4_000u64), Rate::one());
        assert_eq!(repaid.map(|d| d.sum).ok(), Some(U256::from(4_000u64)));
    }

    #[test]
    fn full_repayment_skips_dust() {
        let debt = limit(10, 5, 0, 7);
        let closed = debt.apply(Delta::decrease(U256::from(7u64)), U256::zero(), Rate::from_percent(200));
        assert_eq!(closed.map(|d| d.sum).ok(), Some(U256::zero()));
    }

    #[test]
    fn dust_is_measured_in_base() {
        // 950_000 art at 1.10 owes 1_045_000 base
        let debt = limit(2_000_000, 1, 6, 1_000_000);
        let accrual = Rate::from_percent(110);
        let repaid = debt.apply(Delta::decrease(U256::from(50_000u64)), U256::from(950_000u64), accrual);
        assert_eq!(repaid.map(|d| d.sum).ok(), Some(U256::from(950_000u64)));
        assert!(matches!(
            debt.apply(Delta::decrease(U256::from(100_000u64)), U256::from(900_000u64), accrual),
            Err(LedgerError::MinDebtNotReached)
        ));
    }

    #[test]
    fn oversized_exponent_is_an_error() {
        let debt = limit(0, 0, 78, 0);
        assert!(matches!(debt.line(), Err(LedgerError::MathOverflow)));
        assert_eq!(limit(1, 1, 77, 0).dust().ok(), Some(U256::exp10(77)));
    }
}
