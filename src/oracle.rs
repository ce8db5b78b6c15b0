//! Multi-hop price oracle

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::error::LedgerError;
use crate::interfaces::OracleContractRef;
use crate::types::AssetId;

/// Resolves pairs without a direct source by walking a path of intermediate
/// assets, converting the amount through each hop.
#[odra::module(events = [SourceSet, PathSet], errors = LedgerError)]
pub struct CompositeOracle {
    admin: Var<Address>,
    sources: Mapping<(AssetId, AssetId), Address>,
    paths: Mapping<(AssetId, AssetId), Vec<AssetId>>,
}

#[odra::module]
impl CompositeOracle {
    /// Initialize the oracle, owned by the deployer
    pub fn init(&mut self) {
        self.admin.set(self.env().caller());
    }

    /// Register the source for a pair, in both directions
    pub fn set_source(&mut self, base: AssetId, quote: AssetId, source: Address) {
        self.only_admin();
        self.sources.set(&(base, quote), source);
        self.sources.set(&(quote, base), source);
        self.env().emit_event(SourceSet { base, quote, source });
    }

    /// Register the intermediate hops from `base` to `quote`.
    ///
    /// Every hop needs a source already; the reversed path is stored for the
    /// opposite direction.
    pub fn set_path(&mut self, base: AssetId, quote: AssetId, path: Vec<AssetId>) {
        self.only_admin();
        let mut from = base;
        for hop in path.iter().copied().chain(core::iter::once(quote)) {
            if self.sources.get(&(from, hop)).is_none() {
                self.env().revert(LedgerError::SourceNotFound);
            }
            from = hop;
        }

        let mut reversed = path.clone();
        reversed.reverse();
        self.paths.set(&(base, quote), path.clone());
        self.paths.set(&(quote, base), reversed);
        self.env().emit_event(PathSet { base, quote, path });
    }

    /// Source registered for a pair
    pub fn source(&self, base: AssetId, quote: AssetId) -> Option<Address> {
        self.sources.get(&(base, quote))
    }

    /// Intermediate hops registered for a pair
    pub fn path(&self, base: AssetId, quote: AssetId) -> Vec<AssetId> {
        self.paths.get_or_default(&(base, quote))
    }

    /// Value of `amount` base in quote and the oldest update time seen
    pub fn peek(&self, base: AssetId, quote: AssetId, amount: U256) -> (U256, u64) {
        let resolved = self.resolve(base, quote, amount, false);
        resolved.unwrap_or_else(|error| self.env().revert(error))
    }

    /// Same as `peek`, refreshing every hop on the way
    pub fn get(&mut self, base: AssetId, quote: AssetId, amount: U256) -> (U256, u64) {
        let resolved = self.resolve(base, quote, amount, true);
        resolved.unwrap_or_else(|error| self.env().revert(error))
    }
}

impl CompositeOracle {
    fn only_admin(&self) {
        if self.admin.get() != Some(self.env().caller()) {
            self.env().revert(LedgerError::Unauthorized);
        }
    }

    fn resolve(
        &self,
        base: AssetId,
        quote: AssetId,
        amount: U256,
        refresh: bool,
    ) -> Result<(U256, u64), LedgerError> {
        let now = self.env().get_block_time();
        if base == quote {
            return Ok((amount, now));
        }

        let mut value = amount;
        let mut oldest = u64::MAX;
        let mut from = base;
        for hop in self.path(base, quote).into_iter().chain(core::iter::once(quote)) {
            let source = self
                .sources
                .get(&(from, hop))
                .ok_or(LedgerError::SourceNotFound)?;
            let mut oracle = OracleContractRef::new(self.env(), source);
            let (converted, updated_at) = if refresh {
                oracle.get(from, hop, value)
            } else {
                oracle.peek(from, hop, value)
            };
            if updated_at > now {
                return Err(LedgerError::InvalidUpdateTime);
            }
            value = converted;
            oldest = oldest.min(updated_at);
            from = hop;
        }
        Ok((value, oldest))
    }
}

/// A pair source was registered
#[odra::event]
pub struct SourceSet {
    /// Asset priced
    pub base: AssetId,
    /// Asset the price is quoted in
    pub quote: AssetId,
    /// Feed answering the pair
    pub source: Address,
}

/// A pair path was registered
#[odra::event]
pub struct PathSet {
    /// Asset priced
    pub base: AssetId,
    /// Asset the price is quoted in
    pub quote: AssetId,
    /// Intermediate assets, in order
    pub path: Vec<AssetId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::{PriceFeed, PriceFeedHostRef};
    use odra::host::{Deployer, HostEnv, HostRef, NoArgs};

    const ETH: AssetId = *b"ETH\0\0\0";
    const DAI: AssetId = *b"DAI\0\0\0";
    const USDC: AssetId = *b"USDC\0\0";

    fn wad(value: u64) -> U256 {
        U256::from(value) * U256::from(crate::math::WAD)
    }

    fn setup() -> (HostEnv, CompositeOracleHostRef, PriceFeedHostRef) {
        let env = odra_test::env();
        let oracle = CompositeOracle::deploy(&env, NoArgs);
        let mut feed = PriceFeed::deploy(&env, NoArgs);
        let now = env.block_time();
        // 1 ETH = 2000 USDC, 1 USDC = 1 DAI
        feed.update_price(ETH, USDC, wad(2_000), now);
        feed.update_price(USDC, DAI, wad(1), now);
        (env, oracle, feed)
    }

    #[test]
    fn direct_and_inverse_source() {
        let (_env, mut oracle, feed) = setup();
        oracle.set_source(ETH, USDC, feed.address().clone());

        assert_eq!(oracle.peek(ETH, USDC, wad(2)).0, wad(4_000));
        assert_eq!(oracle.peek(USDC, ETH, wad(1_000)).0, U256::from(crate::math::common::HALF_WAD));
    }

    #[test]
    fn walks_path_both_ways() {
        let (_env, mut oracle, feed) = setup();
        let source = feed.address().clone();
        oracle.set_source(ETH, USDC, source);
        oracle.set_source(USDC, DAI, source);
        oracle.set_path(ETH, DAI, vec![USDC]);

        assert_eq!(oracle.path(DAI, ETH), vec![USDC]);
        assert_eq!(oracle.get(ETH, DAI, wad(1)).0, wad(2_000));
        assert_eq!(oracle.peek(DAI, ETH, wad(4_000)).0, wad(2));
    }

    #[test]
    fn same_asset_is_identity() {
        let (env, oracle, _feed) = setup();
        assert_eq!(oracle.peek(ETH, ETH, wad(7)), (wad(7), env.block_time()));
    }

    #[test]
    fn missing_source() {
        let (_env, mut oracle, _feed) = setup();
        assert_eq!(
            oracle.try_peek(ETH, DAI, wad(1)),
            Err(LedgerError::SourceNotFound.into())
        );
        assert_eq!(
            oracle.try_set_path(ETH, DAI, vec![USDC]),
            Err(LedgerError::SourceNotFound.into())
        );
    }

    #[test]
    fn future_update_time_fails() {
        let (env, mut oracle, mut feed) = setup();
        feed.update_price(ETH, USDC, wad(2_000), env.block_time() + 60_000);
        oracle.set_source(ETH, USDC, feed.address().clone());
        assert_eq!(
            oracle.try_get(ETH, USDC, wad(1)),
            Err(LedgerError::InvalidUpdateTime.into())
        );
    }

    #[test]
    fn reports_oldest_update() {
        let (env, mut oracle, mut feed) = setup();
        let source = feed.address().clone();
        let start = env.block_time();
        env.advance_block_time(10_000);
        feed.update_price(USDC, DAI, wad(1), env.block_time());
        oracle.set_source(ETH, USDC, source);
        oracle.set_source(USDC, DAI, source);
        oracle.set_path(ETH, DAI, vec![USDC]);

        assert_eq!(oracle.peek(ETH, DAI, wad(1)).1, start);
    }

    #[test]
    fn admin_only() {
        let (env, mut oracle, feed) = setup();
        env.set_caller(env.get_account(1));
        assert_eq!(
            oracle.try_set_source(ETH, USDC, feed.address().clone()),
            Err(LedgerError::Unauthorized.into())
        );
    }
}
