//! Reference price and accrual feeds
//!
//! Both modules answer the ledger's `peek`/`get` oracle calls.

use odra::casper_types::U256;
use odra::prelude::*;

use crate::error::LedgerError;
use crate::math::{Decimal, Rate, TryDiv, TryMul};
use crate::types::{AssetId, RATE};

/// Last published price of a pair
#[odra::odra_type]
#[derive(Copy, Default)]
pub struct PricePoint {
    /// Quote per one base, 18 decimals
    pub price: U256,
    /// Publication time in milliseconds
    pub updated_at: u64,
}

/// Spot prices pushed by the admin or approved publishers
#[odra::module(events = [PriceUpdated, PublisherAdded, PublisherRemoved], errors = LedgerError)]
pub struct PriceFeed {
    prices: Mapping<(AssetId, AssetId), PricePoint>,
    approved_publishers: Mapping<Address, bool>,
    admin: Var<Address>,
}

#[odra::module]
impl PriceFeed {
    /// Initialize the feed, owned by the deployer
    pub fn init(&mut self) {
        self.admin.set(self.env().caller());
    }

    /// Publish the price of `base` in `quote`
    pub fn update_price(&mut self, base: AssetId, quote: AssetId, price: U256, updated_at: u64) {
        let caller = self.env().caller();
        if !self.is_admin(caller) && !self.is_approved_publisher(caller) {
            self.env().revert(LedgerError::Unauthorized);
        }

        self.prices.set(&(base, quote), PricePoint { price, updated_at });

        self.env().emit_event(PriceUpdated {
            base,
            quote,
            price,
            updated_at,
            publisher: caller,
        });
    }

    /// Add approved price publisher
    pub fn add_publisher(&mut self, publisher: Address) {
        let caller = self.env().caller();
        if !self.is_admin(caller) {
            self.env().revert(LedgerError::Unauthorized);
        }

        self.approved_publishers.set(&publisher, true);

        self.env().emit_event(PublisherAdded {
            publisher,
            added_by: caller,
        });
    }

    /// Remove price publisher
    pub fn remove_publisher(&mut self, publisher: Address) {
        let caller = self.env().caller();
        if !self.is_admin(caller) {
            self.env().revert(LedgerError::Unauthorized);
        }

        self.approved_publishers.set(&publisher, false);

        self.env().emit_event(PublisherRemoved {
            publisher,
            removed_by: caller,
        });
    }

    /// Check if address is approved publisher
    pub fn is_approved_publisher(&self, address: Address) -> bool {
        self.approved_publishers.get(&address).unwrap_or(false)
    }

    /// Last published price of a pair
    pub fn price(&self, base: AssetId, quote: AssetId) -> Option<PricePoint> {
        self.prices.get(&(base, quote))
    }

    /// Value of `amount` base in quote.
    ///
    /// Falls back to the inverse of the opposite pair.
    pub fn peek(&self, base: AssetId, quote: AssetId, amount: U256) -> (U256, u64) {
        let converted = self.convert(base, quote, amount);
        converted.unwrap_or_else(|error| self.env().revert(error))
    }

    /// Same as `peek`; published prices have nothing to refresh
    pub fn get(&mut self, base: AssetId, quote: AssetId, amount: U256) -> (U256, u64) {
        self.peek(base, quote, amount)
    }
}

impl PriceFeed {
    fn is_admin(&self, address: Address) -> bool {
        self.admin.get() == Some(address)
    }

    fn convert(&self, base: AssetId, quote: AssetId, amount: U256) -> Result<(U256, u64), LedgerError> {
        let amount = Decimal::from_scaled_val(amount);
        if let Some(point) = self.prices.get(&(base, quote)) {
            let value = amount.try_mul(Decimal::from_scaled_val(point.price))?;
            return Ok((value.to_scaled_val(), point.updated_at));
        }
        if let Some(point) = self.prices.get(&(quote, base)) {
            let value = amount.try_div(Decimal::from_scaled_val(point.price))?;
            return Ok((value.to_scaled_val(), point.updated_at));
        }
        Err(LedgerError::SourceNotFound)
    }
}

/// Compounding accumulator of a base
#[odra::odra_type]
#[derive(Copy, Default)]
pub struct Accumulator {
    /// Accrual value at `updated_at`, 18 decimals
    pub value: U256,
    /// Growth factor per elapsed second, 18 decimals
    pub per_second: U256,
    /// Time of the last write in milliseconds
    pub updated_at: u64,
}

impl Accumulator {
    /// Accumulator compounded up to `now`, whole seconds only
    pub fn accrued(&self, now: u64) -> Result<Self, LedgerError> {
        let seconds = now.saturating_sub(self.updated_at) / 1_000;
        let growth = Rate::from_scaled_val(self.per_second).try_pow(seconds)?;
        let value = Decimal::from_scaled_val(self.value).try_mul(growth)?;
        Ok(Self {
            value: value.to_scaled_val(),
            per_second: self.per_second,
            updated_at: self.updated_at + seconds * 1_000,
        })
    }
}

/// Accrual rates per base, quoted against `RATE`
#[odra::module(events = [AccumulatorSet], errors = LedgerError)]
pub struct AccrualFeed {
    accumulators: Mapping<AssetId, Accumulator>,
    admin: Var<Address>,
}

#[odra::module]
impl AccrualFeed {
    /// Initialize the feed, owned by the deployer
    pub fn init(&mut self) {
        self.admin.set(self.env().caller());
    }

    /// Reset the accumulator of `base` as of now
    pub fn set_accumulator(&mut self, base: AssetId, value: U256, per_second: U256) {
        if self.admin.get() != Some(self.env().caller()) {
            self.env().revert(LedgerError::Unauthorized);
        }
        let updated_at = self.env().get_block_time();
        self.accumulators.set(
            &base,
            Accumulator {
                value,
                per_second,
                updated_at,
            },
        );
        self.env().emit_event(AccumulatorSet {
            base,
            value,
            per_second,
        });
    }

    /// Stored accumulator of `base`
    pub fn accumulator(&self, base: AssetId) -> Option<Accumulator> {
        self.accumulators.get(&base)
    }

    /// `amount` scaled by the current accrual of `base`
    pub fn peek(&self, base: AssetId, quote: AssetId, amount: U256) -> (U256, u64) {
        let quoted = self.current(base, quote).and_then(|acc| Self::scale(acc, amount));
        quoted.unwrap_or_else(|error| self.env().revert(error))
    }

    /// Same as `peek`, storing the compounded accumulator
    pub fn get(&mut self, base: AssetId, quote: AssetId, amount: U256) -> (U256, u64) {
        let current = self.current(base, quote);
        let acc = current.unwrap_or_else(|error| self.env().revert(error));
        self.accumulators.set(&base, acc);
        Self::scale(acc, amount).unwrap_or_else(|error| self.env().revert(error))
    }
}

impl AccrualFeed {
    fn current(&self, base: AssetId, quote: AssetId) -> Result<Accumulator, LedgerError> {
        if quote != RATE {
            return Err(LedgerError::SourceNotFound);
        }
        let acc = self
            .accumulators
            .get(&base)
            .ok_or(LedgerError::SourceNotFound)?;
        acc.accrued(self.env().get_block_time())
    }

    fn scale(acc: Accumulator, amount: U256) -> Result<(U256, u64), LedgerError> {
        let value = Decimal::from_scaled_val(amount).try_mul(Decimal::from_scaled_val(acc.value))?;
        Ok((value.to_scaled_val(), acc.updated_at))
    }
}

/// A pair price was published
#[odra::event]
pub struct PriceUpdated {
    /// Asset priced
    pub base: AssetId,
    /// Asset the price is quoted in
    pub quote: AssetId,
    /// Quote per one base, 18 decimals
    pub price: U256,
    /// Publication time in milliseconds
    pub updated_at: u64,
    /// Account that published
    pub publisher: Address,
}

/// A publisher was approved
#[odra::event]
pub struct PublisherAdded {
    /// Publisher account
    pub publisher: Address,
    /// Admin that approved it
    pub added_by: Address,
}

/// A publisher was removed
#[odra::event]
pub struct PublisherRemoved {
    /// Publisher account
    pub publisher: Address,
    /// Admin that removed it
    pub removed_by: Address,
}

/// An accumulator was reset
#[odra::event]
pub struct AccumulatorSet {
    /// Base asset the accumulator tracks
    pub base: AssetId,
    /// Accrual value, 18 decimals
    pub value: U256,
    /// Growth factor per second, 18 decimals
    pub per_second: U256,
}
