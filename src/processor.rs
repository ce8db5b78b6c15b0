//! Ledger state processor

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::error::LedgerError;
use crate::interfaces::{CustodyContractRef, DebtTokenContractRef, OracleContractRef};
use crate::math::{Decimal, Rate, TryDiv, TryMul, WAD};
use crate::state::{
    AccessTable, AssetRegistry, Balances, DebtLimit, DebtLimits, Level, OracleRegistry, Series,
    SeriesRegistry, SpotOracle, Vault, VaultStore,
};
use crate::types::{is_zero_id, AssetId, Delta, Role, SeriesId, VaultId, RATE};


/// Collateralized debt ledger for maturity-dated series.
///
/// Vaults lock one ilk against the base of one series and carry normalized
/// debt (art). One art settles one debt token at maturity; after maturity the
/// debt grows with the base's accrual rate relative to the snapshot taken at
/// maturity.
#[odra::module(
    events = [
        AssetAdded,
        SeriesAdded,
        IlkAdded,
        DebtLimitsSet,
        SpotOracleAdded,
        RateOracleAdded,
        CustodySet,
        RoleGranted,
        RoleRevoked,
        VaultBuilt,
        VaultPoured,
        VaultDestroyed,
        VaultTransfer,
        VaultGrabbed,
        SeriesMatured,
        Redeemed
    ],
    errors = LedgerError
)]
pub struct Ledger {
    access: SubModule<AccessTable>,
    assets: SubModule<AssetRegistry>,
    oracles: SubModule<OracleRegistry>,
    limits: SubModule<DebtLimits>,
    series: SubModule<SeriesRegistry>,
    vaults: SubModule<VaultStore>,
    custody: Mapping<AssetId, Address>,
}

#[odra::module]
impl Ledger {
    // ===========================================================================
    // CONSTRUCTOR
    // ===========================================================================

    /// Grants `Admin` to the deployer
    pub fn init(&mut self) {
        let deployer = self.env().caller();
        self.access.grant(Role::Admin, deployer);
        self.env().emit_event(RoleGranted {
            role: Role::Admin,
            account: deployer,
        });
    }

    // ===========================================================================
    // ADMINISTRATION
    // ===========================================================================

    /// Register an asset under a new id
    pub fn add_asset(&mut self, asset_id: AssetId, asset: Address) {
        self.only(Role::Admin);
        let added = self.assets.add(asset_id, asset);
        self.or_revert(added);
        self.env().emit_event(AssetAdded { asset_id, asset });
    }

    /// Register a series. Maturity is read from the debt token.
    pub fn add_series(&mut self, series_id: SeriesId, base_id: AssetId, debt_token: Option<Address>) {
        self.only(Role::Admin);
        let added = self.register_series(series_id, base_id, debt_token);
        let series = self.or_revert(added);
        self.env().emit_event(SeriesAdded {
            series_id,
            base_id,
            debt_token: series.debt_token,
            maturity: series.maturity,
        });
    }

    /// Approve ilks as collateral for a series
    pub fn add_ilks(&mut self, series_id: SeriesId, ilk_ids: Vec<AssetId>) {
        self.only(Role::Admin);
        let series = self.or_revert(self.series.find(series_id));
        for ilk_id in ilk_ids {
            self.or_revert(self.oracles.spot(series.base_id, ilk_id));
            self.series.approve_ilk(series_id, ilk_id);
            self.env().emit_event(IlkAdded { series_id, ilk_id });
        }
    }

    /// Set the debt ceiling and dust floor for an ilk against a base
    pub fn set_debt_limits(&mut self, base_id: AssetId, ilk_id: AssetId, max: U256, min: U256, dec: u8) {
        self.only(Role::Admin);
        self.or_revert(self.assets.base(base_id));
        self.or_revert(self.assets.ilk(ilk_id));
        let set = self.limits.set(base_id, ilk_id, max, min, dec);
        self.or_revert(set);
        self.env().emit_event(DebtLimitsSet {
            base_id,
            ilk_id,
            max,
            min,
            dec,
        });
    }

    /// Bind the spot oracle and required ratio (millionths) for an ilk
    pub fn set_spot_oracle(&mut self, base_id: AssetId, ilk_id: AssetId, oracle: Address, ratio: u32) {
        self.only(Role::Admin);
        self.or_revert(self.assets.base(base_id));
        self.or_revert(self.assets.ilk(ilk_id));
        self.oracles.set_spot(base_id, ilk_id, oracle, ratio);
        self.env().emit_event(SpotOracleAdded {
            base_id,
            ilk_id,
            oracle,
            ratio,
        });
    }

    /// Bind the rate oracle of a base
    pub fn set_lending_oracle(&mut self, base_id: AssetId, oracle: Address) {
        self.only(Role::Admin);
        self.or_revert(self.assets.base(base_id));
        self.oracles.set_lending(base_id, oracle);
        self.env().emit_event(RateOracleAdded { base_id, oracle });
    }

    /// Bind the custody that pays out redemptions of a base
    pub fn set_custody(&mut self, base_id: AssetId, custody: Address) {
        self.only(Role::Admin);
        self.or_revert(self.assets.base(base_id));
        self.custody.set(&base_id, custody);
        self.env().emit_event(CustodySet { base_id, custody });
    }

    /// Grant a role
    pub fn grant_role(&mut self, role: Role, account: Address) {
        self.only(Role::Admin);
        if self.access.grant(role, account) {
            self.env().emit_event(RoleGranted { role, account });
        }
    }

    /// Revoke a role
    pub fn revoke_role(&mut self, role: Role, account: Address) {
        self.only(Role::Admin);
        if self.access.revoke(role, account) {
            self.env().emit_event(RoleRevoked { role, account });
        }
    }

    // ===========================================================================
    // VAULTS
    // ===========================================================================

    /// Open an empty vault owned by the caller
    pub fn build(&mut self, series_id: SeriesId, ilk_id: AssetId) -> VaultId {
        self.or_revert(self.series.find(series_id));
        if !self.series.is_ilk_approved(series_id, ilk_id) {
            self.env().revert(LedgerError::IlkNotApproved);
        }
        let owner = self.env().caller();
        let vault_id = self.vaults.create(Vault {
            owner,
            series_id,
            ilk_id,
        });
        self.env().emit_event(VaultBuilt {
            vault_id,
            owner,
            series_id,
            ilk_id,
        });
        vault_id
    }

    /// Remove an empty vault
    pub fn destroy(&mut self, vault_id: VaultId) {
        let caller = self.env().caller();
        self.or_revert(self.vaults.owned_by(vault_id, caller));
        if !self.vaults.balances(vault_id).is_empty() {
            self.env().revert(LedgerError::VaultNotEmpty);
        }
        self.vaults.remove(vault_id);
        self.env().emit_event(VaultDestroyed { vault_id });
    }

    /// Transfer a vault to another owner
    pub fn give(&mut self, vault_id: VaultId, receiver: Address) {
        let caller = self.env().caller();
        let vault = self.or_revert(self.vaults.owned_by(vault_id, caller));
        self.vaults.update(
            vault_id,
            Vault {
                owner: receiver,
                ..vault
            },
        );
        self.env().emit_event(VaultTransfer { vault_id, receiver });
    }

    /// Change collateral and debt of a vault.
    ///
    /// Debt limits and the safety check apply to the resulting balances.
    pub fn pour(&mut self, vault_id: VaultId, ink: Delta, art: Delta) -> Balances {
        let caller = self.env().caller();
        let vault = self.or_revert(self.vaults.owned_by(vault_id, caller));
        let poured = self.apply_pour(vault_id, vault, ink, art);
        self.or_revert(poured)
    }

    /// Repay debt denominated in base, changing collateral by `ink`.
    ///
    /// Returns the art repaid.
    pub fn close(&mut self, vault_id: VaultId, ink: Delta, base: U256) -> U256 {
        let caller = self.env().caller();
        let vault = self.or_revert(self.vaults.owned_by(vault_id, caller));
        let closed = self.close_vault(vault_id, vault, ink, base);
        self.or_revert(closed)
    }

    /// Move the balances of a vault into a new vault owned by `liquidator`.
    ///
    /// No safety check; the running debt totals do not change.
    pub fn grab(&mut self, vault_id: VaultId, liquidator: Address) -> VaultId {
        self.only(Role::Liquidator);
        let vault = self.or_revert(self.vaults.find(vault_id));
        let balances = self.vaults.balances(vault_id);

        let new_vault_id = self.vaults.create(Vault {
            owner: liquidator,
            ..vault
        });
        self.vaults.set_balances(new_vault_id, balances);
        self.vaults.set_balances(vault_id, Balances::default());

        self.env().emit_event(VaultBuilt {
            vault_id: new_vault_id,
            owner: liquidator,
            series_id: vault.series_id,
            ilk_id: vault.ilk_id,
        });
        self.env().emit_event(VaultGrabbed {
            vault_id,
            new_vault_id,
            liquidator,
        });
        new_vault_id
    }

    // ===========================================================================
    // MATURITY
    // ===========================================================================

    /// Record the accrual of a series' base at maturity
    pub fn mature(&mut self, series_id: SeriesId) {
        let series = self.or_revert(self.series.find(series_id));
        if !series.is_mature(self.env().get_block_time()) {
            self.env().revert(LedgerError::TooEarly);
        }
        let snapshot = self.snapshot(series_id, series);
        self.or_revert(snapshot);
    }

    /// Burn `amount` debt tokens and pay their accrued value in base to `to`.
    ///
    /// Tokens already held by the ledger are burned first, the rest comes
    /// from the caller. Returns the base paid out.
    pub fn redeem(&mut self, series_id: SeriesId, to: Address, amount: U256) -> U256 {
        let redeemed = self.redeem_series(series_id, to, amount);
        self.or_revert(redeemed)
    }

    // ===========================================================================
    // VIEWS
    // ===========================================================================

    /// Underlying reference of an asset
    pub fn asset(&self, asset_id: AssetId) -> Option<Address> {
        self.assets.asset(asset_id)
    }

    /// Series definition
    pub fn series(&self, series_id: SeriesId) -> Option<Series> {
        self.series.series(series_id)
    }

    /// Whether an ilk is approved for a series
    pub fn is_ilk_approved(&self, series_id: SeriesId, ilk_id: AssetId) -> bool {
        self.series.is_ilk_approved(series_id, ilk_id)
    }

    /// Spot binding of an ilk
    pub fn spot_oracle(&self, base_id: AssetId, ilk_id: AssetId) -> Option<SpotOracle> {
        self.oracles.spot_oracle(base_id, ilk_id)
    }

    /// Rate oracle of a base
    pub fn lending_oracle(&self, base_id: AssetId) -> Option<Address> {
        self.oracles.lending_oracle(base_id)
    }

    /// Debt limits and running total
    pub fn debt(&self, base_id: AssetId, ilk_id: AssetId) -> DebtLimit {
        self.limits.debt(base_id, ilk_id)
    }

    /// Vault record
    pub fn vault(&self, vault_id: VaultId) -> Option<Vault> {
        self.vaults.vault(vault_id)
    }

    /// Vault balances
    pub fn balances(&self, vault_id: VaultId) -> Balances {
        self.vaults.balances(vault_id)
    }

    /// Accrual recorded at maturity, if any
    pub fn rate_at_maturity(&self, series_id: SeriesId) -> Option<U256> {
        self.series
            .rate_at_maturity(series_id)
            .map(|rate| rate.to_scaled_val())
    }

    /// Custody bound to a base
    pub fn custody(&self, base_id: AssetId) -> Option<Address> {
        self.custody.get(&base_id)
    }

    /// Whether `account` holds `role`
    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.access.has_role(role, account)
    }

    /// Current safety inputs of a vault, read without refreshing oracles
    pub fn level(&self, vault_id: VaultId) -> Level {
        let level = self.peek_level(vault_id);
        self.or_revert(level)
    }

    /// Base owed for `art` of a series, rounded up
    pub fn debt_to_base(&self, series_id: SeriesId, art: U256) -> U256 {
        let converted = self
            .peek_accrual(series_id)
            .and_then(|accrual| Decimal::from_scaled_val(art).try_mul_ceil(accrual));
        self.or_revert(converted).to_scaled_val()
    }

    /// Art repaid by `base` of a series, rounded down
    pub fn debt_from_base(&self, series_id: SeriesId, base: U256) -> U256 {
        let converted = self
            .peek_accrual(series_id)
            .and_then(|accrual| Decimal::from_scaled_val(base).try_div(accrual));
        self.or_revert(converted).to_scaled_val()
    }
}

impl Ledger {
    fn or_revert<T>(&self, result: Result<T, LedgerError>) -> T {
        result.unwrap_or_else(|error| self.env().revert(error))
    }

    fn only(&self, role: Role) {
        let caller = self.env().caller();
        self.or_revert(self.access.ensure(role, caller));
    }

    fn register_series(
        &mut self,
        series_id: SeriesId,
        base_id: AssetId,
        debt_token: Option<Address>,
    ) -> Result<Series, LedgerError> {
        if is_zero_id(&series_id) {
            return Err(LedgerError::IdZero);
        }
        let base = self.assets.base(base_id)?;
        let debt_token = debt_token.ok_or(LedgerError::SeriesNeedsDebtToken)?;
        let token = DebtTokenContractRef::new(self.env(), debt_token);
        if token.underlying() != base {
            return Err(LedgerError::MismatchedBase);
        }
        self.oracles.rate(base_id)?;

        let series = Series {
            base_id,
            maturity: token.maturity(),
            debt_token,
        };
        self.series.add(series_id, series)?;
        Ok(series)
    }

    fn apply_pour(
        &mut self,
        vault_id: VaultId,
        vault: Vault,
        ink: Delta,
        art: Delta,
    ) -> Result<Balances, LedgerError> {
        let series = self.series.find(vault.series_id)?;
        let balances = self.vaults.balances(vault_id).apply(ink, art)?;
        let accrual = if balances.art.is_zero() {
            Rate::one()
        } else {
            self.accrual(vault.series_id, series)?
        };
        self.limits
            .record(series.base_id, vault.ilk_id, art, balances.art, accrual)?;

        if !balances.art.is_zero() {
            let level = self.level_of(series, vault.ilk_id, balances, accrual)?;
            if !level.is_safe() {
                return Err(LedgerError::Undercollateralized);
            }
        }

        self.vaults.set_balances(vault_id, balances);
        self.env().emit_event(VaultPoured {
            vault_id,
            series_id: vault.series_id,
            ilk_id: vault.ilk_id,
            ink,
            art,
        });
        Ok(balances)
    }

    fn close_vault(
        &mut self,
        vault_id: VaultId,
        vault: Vault,
        ink: Delta,
        base: U256,
    ) -> Result<U256, LedgerError> {
        let series = self.series.find(vault.series_id)?;
        let accrual = self.accrual(vault.series_id, series)?;
        let art = Decimal::from_scaled_val(base).try_div(accrual)?.to_scaled_val();
        self.apply_pour(vault_id, vault, ink, Delta::decrease(art))?;
        Ok(art)
    }

    fn redeem_series(&mut self, series_id: SeriesId, to: Address, amount: U256) -> Result<U256, LedgerError> {
        let series = self.series.find(series_id)?;
        let chi0 = self
            .series
            .rate_at_maturity(series_id)
            .ok_or(LedgerError::NotMature)?;
        let custody = self
            .custody
            .get(&series.base_id)
            .ok_or(LedgerError::CustodyNotFound)?;
        let accrual = Rate::accrual(self.current_rate(series.base_id, true)?, chi0)?;
        let redeemed = Decimal::from_scaled_val(amount).try_mul(accrual)?.to_scaled_val();

        let caller = self.env().caller();
        let ledger = self.env().self_address();
        let mut token = DebtTokenContractRef::new(self.env(), series.debt_token);
        let held = token.balance_of(ledger).min(amount);
        if !held.is_zero() {
            token.burn(ledger, held);
        }
        let rest = amount - held;
        if !rest.is_zero() {
            token.burn(caller, rest);
        }

        CustodyContractRef::new(self.env(), custody).exit(to, redeemed);
        self.env().emit_event(Redeemed {
            series_id,
            from: caller,
            to,
            amount,
            redeemed,
        });
        Ok(redeemed)
    }

    /// Record chi0 from a refreshed rate read
    fn snapshot(&mut self, series_id: SeriesId, series: Series) -> Result<Decimal, LedgerError> {
        let rate = self.current_rate(series.base_id, true)?;
        self.series.record_maturity(series_id, rate)?;
        self.env().emit_event(SeriesMatured {
            series_id,
            rate_at_maturity: rate.to_scaled_val(),
        });
        Ok(rate)
    }

    /// Accrual of a series, snapshotting maturity on first use after it
    fn accrual(&mut self, series_id: SeriesId, series: Series) -> Result<Rate, LedgerError> {
        if !series.is_mature(self.env().get_block_time()) {
            return Ok(Rate::one());
        }
        let chi0 = match self.series.rate_at_maturity(series_id) {
            Some(chi0) => chi0,
            None => self.snapshot(series_id, series)?,
        };
        Rate::accrual(self.current_rate(series.base_id, true)?, chi0)
    }

    /// Accrual of a series without side effects; an unrecorded snapshot counts
    /// as taken now
    fn peek_accrual(&self, series_id: SeriesId) -> Result<Rate, LedgerError> {
        let series = self.series.find(series_id)?;
        if !series.is_mature(self.env().get_block_time()) {
            return Ok(Rate::one());
        }
        let chi1 = self.current_rate(series.base_id, false)?;
        let chi0 = self.series.rate_at_maturity(series_id).unwrap_or(chi1);
        Rate::accrual(chi1, chi0)
    }

    fn current_rate(&self, base_id: AssetId, refresh: bool) -> Result<Decimal, LedgerError> {
        let source = self.oracles.rate(base_id)?;
        let mut oracle = OracleContractRef::new(self.env(), source);
        let (rate, _) = if refresh {
            oracle.get(base_id, RATE, U256::from(WAD))
        } else {
            oracle.peek(base_id, RATE, U256::from(WAD))
        };
        Ok(Decimal::from_scaled_val(rate))
    }

    fn ink_value(&self, spot: SpotOracle, ilk_id: AssetId, base_id: AssetId, ink: U256, refresh: bool) -> U256 {
        let mut oracle = OracleContractRef::new(self.env(), spot.oracle);
        let (value, _) = if refresh {
            oracle.get(ilk_id, base_id, ink)
        } else {
            oracle.peek(ilk_id, base_id, ink)
        };
        value
    }

    fn level_of(
        &self,
        series: Series,
        ilk_id: AssetId,
        balances: Balances,
        accrual: Rate,
    ) -> Result<Level, LedgerError> {
        let spot = self.oracles.spot(series.base_id, ilk_id)?;
        Ok(Level {
            ink_value: self.ink_value(spot, ilk_id, series.base_id, balances.ink, true),
            art_value: Level::required(balances.art, accrual, spot.required_ratio())?,
        })
    }

    fn peek_level(&self, vault_id: VaultId) -> Result<Level, LedgerError> {
        let vault = self.vaults.find(vault_id)?;
        let series = self.series.find(vault.series_id)?;
        let balances = self.vaults.balances(vault_id);
        let spot = self.oracles.spot(series.base_id, vault.ilk_id)?;
        let accrual = self.peek_accrual(vault.series_id)?;
        Ok(Level {
            ink_value: self.ink_value(spot, vault.ilk_id, series.base_id, balances.ink, false),
            art_value: Level::required(balances.art, accrual, spot.required_ratio())?,
        })
    }
}

// ===========================================================================
// EVENTS
// ===========================================================================

/// An asset was registered
#[odra::event]
pub struct AssetAdded {
    /// Registered id
    pub asset_id: AssetId,
    /// Underlying reference
    pub asset: Address,
}

/// A series was registered
#[odra::event]
pub struct SeriesAdded {
    /// Series id
    pub series_id: SeriesId,
    /// Base asset id
    pub base_id: AssetId,
    /// Debt token settling the series
    pub debt_token: Address,
    /// Maturity in milliseconds
    pub maturity: u64,
}

/// An ilk was approved for a series
#[odra::event]
pub struct IlkAdded {
    /// Series id
    pub series_id: SeriesId,
    /// Collateral asset id
    pub ilk_id: AssetId,
}

/// Debt limits were set for a base and ilk
#[odra::event]
pub struct DebtLimitsSet {
    /// Base asset id
    pub base_id: AssetId,
    /// Collateral asset id
    pub ilk_id: AssetId,
    /// Ceiling, in units of 10^dec
    pub max: U256,
    /// Dust floor, in units of 10^dec
    pub min: U256,
    /// Decimal exponent of max and min
    pub dec: u8,
}

/// A spot oracle was bound
#[odra::event]
pub struct SpotOracleAdded {
    /// Base asset id
    pub base_id: AssetId,
    /// Collateral asset id
    pub ilk_id: AssetId,
    /// Oracle contract
    pub oracle: Address,
    /// Required collateral ratio in millionths
    pub ratio: u32,
}

/// A rate oracle was bound
#[odra::event]
pub struct RateOracleAdded {
    /// Base asset id
    pub base_id: AssetId,
    /// Oracle contract
    pub oracle: Address,
}

/// A custody was bound
#[odra::event]
pub struct CustodySet {
    /// Base asset id
    pub base_id: AssetId,
    /// Custody contract
    pub custody: Address,
}

/// A role was granted
#[odra::event]
pub struct RoleGranted {
    /// Role changed
    pub role: Role,
    /// Account affected
    pub account: Address,
}

/// A role was revoked
#[odra::event]
pub struct RoleRevoked {
    /// Role changed
    pub role: Role,
    /// Account affected
    pub account: Address,
}

/// A vault was opened
#[odra::event]
pub struct VaultBuilt {
    /// Vault id
    pub vault_id: VaultId,
    /// Owner of the vault
    pub owner: Address,
    /// Series id
    pub series_id: SeriesId,
    /// Collateral asset id
    pub ilk_id: AssetId,
}

/// Vault balances changed
#[odra::event]
pub struct VaultPoured {
    /// Vault id
    pub vault_id: VaultId,
    /// Series id
    pub series_id: SeriesId,
    /// Collateral asset id
    pub ilk_id: AssetId,
    /// Collateral change
    pub ink: Delta,
    /// Debt change
    pub art: Delta,
}

/// A vault was removed
#[odra::event]
pub struct VaultDestroyed {
    /// Vault id
    pub vault_id: VaultId,
}

/// A vault changed owner
#[odra::event]
pub struct VaultTransfer {
    /// Vault id
    pub vault_id: VaultId,
    /// New owner
    pub receiver: Address,
}

/// A vault's balances were seized into a new vault
#[odra::event]
pub struct VaultGrabbed {
    /// Vault id
    pub vault_id: VaultId,
    /// Vault now holding the balances
    pub new_vault_id: VaultId,
    /// Owner of the new vault
    pub liquidator: Address,
}

/// Accrual at maturity was recorded
#[odra::event]
pub struct SeriesMatured {
    /// Series id
    pub series_id: SeriesId,
    /// Accrual value recorded, 18 decimals
    pub rate_at_maturity: U256,
}

/// Debt tokens were redeemed for base
#[odra::event]
pub struct Redeemed {
    /// Series id
    pub series_id: SeriesId,
    /// Holder whose tokens were burned
    pub from: Address,
    /// Receiver of the base
    pub to: Address,
    /// Debt tokens burned
    pub amount: U256,
    /// Base paid out
    pub redeemed: U256,
}
