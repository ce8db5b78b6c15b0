//! Series, approved ilks and maturity snapshots

use odra::prelude::*;

use crate::error::LedgerError;
use crate::math::Decimal;
use crate::types::{is_zero_id, AssetId, SeriesId};

/// A maturity-dated cohort of debt sharing one debt token.
#[odra::odra_type]
#[derive(Copy)]
pub struct Series {
    /// Asset the debt settles into
    pub base_id: AssetId,
    /// Maturity timestamp in milliseconds
    pub maturity: u64,
    /// Zero-coupon token representing one unit of art
    pub debt_token: Address,
}

impl Series {
    /// Whether the series has reached maturity at `now`
    pub fn is_mature(&self, now: u64) -> bool {
        now >= self.maturity
    }
}

/// Series definitions, their approved ilks and maturity snapshots.
#[odra::module]
pub struct SeriesRegistry {
    series: Mapping<SeriesId, Series>,
    ilks: Mapping<(SeriesId, AssetId), bool>,
    rates_at_maturity: Mapping<SeriesId, Decimal>,
}

#[odra::module]
impl SeriesRegistry {
    /// Series definition
    pub fn series(&self, series_id: SeriesId) -> Option<Series> {
        self.series.get(&series_id)
    }

    /// Whether `ilk_id` may back vaults of `series_id`
    pub fn is_ilk_approved(&self, series_id: SeriesId, ilk_id: AssetId) -> bool {
        self.ilks.get_or_default(&(series_id, ilk_id))
    }
}

impl SeriesRegistry {
    /// Register a series; all cross-registry checks happen in the ledger
    pub fn add(&mut self, series_id: SeriesId, series: Series) -> Result<(), LedgerError> {
        if is_zero_id(&series_id) {
            return Err(LedgerError::IdZero);
        }
        if self.series.get(&series_id).is_some() {
            return Err(LedgerError::IdInUse);
        }
        self.series.set(&series_id, series);
        Ok(())
    }

    /// Series or `SeriesNotFound`
    pub fn find(&self, series_id: SeriesId) -> Result<Series, LedgerError> {
        self.series(series_id).ok_or(LedgerError::SeriesNotFound)
    }

    /// Approve an ilk; approving twice is a no-op
    pub fn approve_ilk(&mut self, series_id: SeriesId, ilk_id: AssetId) {
        self.ilks.set(&(series_id, ilk_id), true);
    }

    /// Recorded accrual at maturity (chi0)
    pub fn rate_at_maturity(&self, series_id: SeriesId) -> Option<Decimal> {
        self.rates_at_maturity.get(&series_id)
    }

    /// Record chi0. A snapshot is written once and never replaced.
    pub fn record_maturity(&mut self, series_id: SeriesId, rate: Decimal) -> Result<(), LedgerError> {
        if self.rates_at_maturity.get(&series_id).is_some() {
            return Err(LedgerError::AlreadyMatured);
        }
        self.rates_at_maturity.set(&series_id, rate);
        Ok(())
    }
}
