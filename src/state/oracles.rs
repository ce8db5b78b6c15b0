//! Spot and rate oracle bindings

use odra::prelude::*;

use crate::error::LedgerError;
use crate::math::Rate;
use crate::types::AssetId;

/// Spot price source for an ilk against a base, with the collateralization
/// ratio required from vaults using it.
#[odra::odra_type]
#[derive(Copy)]
pub struct SpotOracle {
    /// Oracle contract
    pub oracle: Address,
    /// Required ratio in millionths (1_000_000 = 100%)
    pub ratio: u32,
}

impl SpotOracle {
    /// Required ratio as a wad-scaled rate
    pub fn required_ratio(&self) -> Rate {
        Rate::from_millionths(self.ratio)
    }
}

/// Spot and lending (rate) oracle bindings.
#[odra::module]
pub struct OracleRegistry {
    spot: Mapping<(AssetId, AssetId), SpotOracle>,
    lending: Mapping<AssetId, Address>,
}

#[odra::module]
impl OracleRegistry {
    /// Spot binding for `ilk_id` priced in `base_id`
    pub fn spot_oracle(&self, base_id: AssetId, ilk_id: AssetId) -> Option<SpotOracle> {
        self.spot.get(&(base_id, ilk_id))
    }

    /// Rate oracle bound to `base_id`
    pub fn lending_oracle(&self, base_id: AssetId) -> Option<Address> {
        self.lending.get(&base_id)
    }
}

impl OracleRegistry {
    /// Bind a spot source, replacing any previous binding
    pub fn set_spot(&mut self, base_id: AssetId, ilk_id: AssetId, oracle: Address, ratio: u32) {
        self.spot.set(&(base_id, ilk_id), SpotOracle { oracle, ratio });
    }

    /// Bind a rate source, replacing any previous binding
    pub fn set_lending(&mut self, base_id: AssetId, oracle: Address) {
        self.lending.set(&base_id, oracle);
    }

    /// Spot binding or `SpotOracleMissing`
    pub fn spot(&self, base_id: AssetId, ilk_id: AssetId) -> Result<SpotOracle, LedgerError> {
        self.spot_oracle(base_id, ilk_id)
            .ok_or(LedgerError::SpotOracleMissing)
    }

    /// Rate oracle or `RateOracleMissing`
    pub fn rate(&self, base_id: AssetId) -> Result<Address, LedgerError> {
        self.lending_oracle(base_id)
            .ok_or(LedgerError::RateOracleMissing)
    }
}
