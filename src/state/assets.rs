//! Asset registry

use odra::prelude::*;

use crate::error::LedgerError;
use crate::types::{is_zero_id, AssetId};

/// Asset id to underlying asset reference. Entries are permanent.
#[odra::module]
pub struct AssetRegistry {
    assets: Mapping<AssetId, Address>,
}

#[odra::module]
impl AssetRegistry {
    /// Underlying reference of `asset_id`
    pub fn asset(&self, asset_id: AssetId) -> Option<Address> {
        self.assets.get(&asset_id)
    }
}

impl AssetRegistry {
    /// Register a new asset
    pub fn add(&mut self, asset_id: AssetId, asset: Address) -> Result<(), LedgerError> {
        if is_zero_id(&asset_id) {
            return Err(LedgerError::IdZero);
        }
        if self.assets.get(&asset_id).is_some() {
            return Err(LedgerError::IdInUse);
        }
        self.assets.set(&asset_id, asset);
        Ok(())
    }

    /// Reference of a registered base asset
    pub fn base(&self, base_id: AssetId) -> Result<Address, LedgerError> {
        self.assets.get(&base_id).ok_or(LedgerError::BaseNotFound)
    }

    /// Reference of a registered ilk
    pub fn ilk(&self, ilk_id: AssetId) -> Result<Address, LedgerError> {
        self.assets.get(&ilk_id).ok_or(LedgerError::IlkNotFound)
    }
}
