//! Vaults, balances and the safety level

use odra::casper_types::U256;
use odra::prelude::*;

use crate::error::LedgerError;
use crate::math::{Decimal, Rate};
use crate::types::{AssetId, Delta, SeriesId, VaultId};

/// A position: one owner, one series, one ilk.
#[odra::odra_type]
#[derive(Copy)]
pub struct Vault {
    /// Current owner
    pub owner: Address,
    /// Series the debt belongs to
    pub series_id: SeriesId,
    /// Collateral asset
    pub ilk_id: AssetId,
}

/// Collateral and normalized debt of a vault.
#[odra::odra_type]
#[derive(Copy, Default)]
pub struct Balances {
    /// Collateral amount
    pub ink: U256,
    /// Normalized debt, one unit per debt token at maturity
    pub art: U256,
}

impl Balances {
    /// Balances after applying both deltas
    pub fn apply(&self, ink: Delta, art: Delta) -> Result<Self, LedgerError> {
        Ok(Self {
            ink: ink.apply(self.ink)?,
            art: art.apply(self.art)?,
        })
    }

    /// No collateral and no debt
    pub fn is_empty(&self) -> bool {
        self.ink.is_zero() && self.art.is_zero()
    }
}

/// Inputs of a vault's safety check, both in base units.
#[odra::odra_type]
#[derive(Copy, Default)]
pub struct Level {
    /// Collateral converted to base by the spot oracle
    pub ink_value: U256,
    /// Debt scaled by the accrual and the required ratio
    pub art_value: U256,
}

impl Level {
    /// Value the collateral must cover for `art`, rounded up
    pub fn required(art: U256, accrual: Rate, ratio: Rate) -> Result<U256, LedgerError> {
        let value = Decimal::from(art)
            .try_mul_ceil(accrual)?
            .try_mul_ceil(ratio)?;
        Ok(value.to_scaled_val())
    }

    /// Debt-free vaults are always safe
    pub fn is_safe(&self) -> bool {
        self.art_value.is_zero() || self.ink_value >= self.art_value
    }
}

/// Vaults and their balances.
#[odra::module]
pub struct VaultStore {
    vaults: Mapping<VaultId, Option<Vault>>,
    balances: Mapping<VaultId, Balances>,
    nonce: Var<u64>,
}

#[odra::module]
impl VaultStore {
    /// Vault record, if live
    pub fn vault(&self, vault_id: VaultId) -> Option<Vault> {
        self.vaults.get(&vault_id).flatten()
    }

    /// Balances of a vault; zero for unknown ids
    pub fn balances(&self, vault_id: VaultId) -> Balances {
        self.balances.get_or_default(&vault_id)
    }
}

impl VaultStore {
    /// Vault or `VaultNotFound`
    pub fn find(&self, vault_id: VaultId) -> Result<Vault, LedgerError> {
        self.vault(vault_id).ok_or(LedgerError::VaultNotFound)
    }

    /// Vault owned by `caller`, or `OnlyOwner`
    pub fn owned_by(&self, vault_id: VaultId, caller: Address) -> Result<Vault, LedgerError> {
        let vault = self.find(vault_id)?;
        if vault.owner != caller {
            return Err(LedgerError::OnlyOwner);
        }
        Ok(vault)
    }

    /// Store a new empty vault under a fresh id
    pub fn create(&mut self, vault: Vault) -> VaultId {
        let nonce = self.nonce.get_or_default() + 1;
        self.nonce.set(nonce);

        let mut vault_id = [0u8; 12];
        vault_id[4..].copy_from_slice(&nonce.to_be_bytes());

        self.vaults.set(&vault_id, Some(vault));
        self.balances.set(&vault_id, Balances::default());
        vault_id
    }

    /// Overwrite the vault record
    pub fn update(&mut self, vault_id: VaultId, vault: Vault) {
        self.vaults.set(&vault_id, Some(vault));
    }

    /// Overwrite the balances
    pub fn set_balances(&mut self, vault_id: VaultId, balances: Balances) {
        self.balances.set(&vault_id, balances);
    }

    /// Clear a vault and its balances
    pub fn remove(&mut self, vault_id: VaultId) {
        self.vaults.set(&vault_id, None);
        self.balances.set(&vault_id, Balances::default());
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn wad(value: u64) -> U256 {
        U256::from(value) * U256::from(crate::math::WAD)
    }

    #[test]
    fn balances_round_trip() {
        let start = Balances {
            ink: wad(5),
            art: wad(1),
        };
        let topped = start
            .apply(Delta::increase(wad(3)), Delta::zero())
            .ok();
        let back = topped.and_then(|b| b.apply(Delta::decrease(wad(3)), Delta::zero()).ok());
        assert_eq!(back, Some(start));
    }

    #[test]
    fn balances_never_negative() {
        let balances = Balances::default();
        assert!(matches!(
            balances.apply(Delta::zero(), Delta::decrease(U256::one())),
            Err(LedgerError::ResultBelowZero)
        ));
    }

    #[test]
    fn required_value_rounds_up() {
        // 3 wei of art at 1.5x ratio owes 4.5 wei of collateral
        let required = Level::required(U256::from(3u64), Rate::one(), Rate::from_percent(150));
        assert_eq!(required.ok(), Some(U256::from(5u64)));

        let accrued = Level::required(wad(1), Rate::from_percent(110), Rate::from_percent(150));
        assert_eq!(
            accrued.ok(),
            Some(U256::from(1_650_000_000_000_000_000u64))
        );
    }

    #[test]
    fn safety_boundary() {
        let level = Level {
            ink_value: wad(1),
            art_value: wad(1),
        };
        assert!(level.is_safe());
        let short = Level {
            ink_value: wad(1) - U256::one(),
            art_value: wad(1),
        };
        assert!(!short.is_safe());
        assert!(Level::default().is_safe());
    }
}
