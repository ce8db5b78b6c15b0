//! Collaborator interfaces consumed by the ledger.
//!
//! Oracles, debt tokens and custody live in their own contracts. The ledger
//! only talks to them through the references generated from these traits.

use odra::casper_types::U256;
use odra::prelude::*;

use crate::types::AssetId;

/// Price or accrual source.
///
/// Both calls convert `amount` of `base` into `quote` and report when the
/// underlying data was last updated. `peek` is a pure read, `get` may refresh
/// the source before answering.
#[odra::external_contract]
pub trait Oracle {
    /// Value of `amount` base in quote, without side effects
    fn peek(&self, base: AssetId, quote: AssetId, amount: U256) -> (U256, u64);
    /// Value of `amount` base in quote, refreshing the source first
    fn get(&mut self, base: AssetId, quote: AssetId, amount: U256) -> (U256, u64);
}

/// Zero-coupon debt token of a series.
#[odra::external_contract]
pub trait DebtToken {
    /// Maturity timestamp in milliseconds
    fn maturity(&self) -> u64;
    /// Address of the asset the token settles into
    fn underlying(&self) -> Address;
    /// Token balance of `owner`
    fn balance_of(&self, owner: Address) -> U256;
    /// Destroy `amount` tokens held by `from`
    fn burn(&mut self, from: Address, amount: U256);
}

/// Custody of an asset held on behalf of the ledger.
#[odra::external_contract]
pub trait Custody {
    /// Release `amount` to `user`, returning the amount released
    fn exit(&mut self, user: Address, amount: U256) -> U256;
}
