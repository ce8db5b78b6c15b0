//! Reference debt token and custody collaborators

use odra::casper_types::U256;
use odra::prelude::*;

use crate::error::LedgerError;

/// Zero-coupon debt token of one series.
///
/// Minters (the ledger and whoever issues against it) may mint and burn from
/// any holder.
#[odra::module(events = [Transfer, MinterAuthorized], errors = LedgerError)]
pub struct FyToken {
    underlying: Var<Address>,
    maturity: Var<u64>,
    admin: Var<Address>,
    minters: Mapping<Address, bool>,
    balances: Mapping<Address, U256>,
    total_supply: Var<U256>,
}

#[odra::module]
impl FyToken {
    /// Initialize the token for a base asset and maturity (milliseconds)
    pub fn init(&mut self, underlying: Address, maturity: u64) {
        self.underlying.set(underlying);
        self.maturity.set(maturity);
        self.admin.set(self.env().caller());
    }

    /// Maturity timestamp in milliseconds
    pub fn maturity(&self) -> u64 {
        self.maturity.get_or_default()
    }

    /// Asset the token settles into
    pub fn underlying(&self) -> Address {
        self.underlying
            .get()
            .unwrap_or_else(|| self.env().revert(LedgerError::BaseNotFound))
    }

    /// Balance of `owner`
    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get_or_default(&owner)
    }

    /// Tokens in circulation
    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    /// Allow `minter` to mint and burn
    pub fn authorize(&mut self, minter: Address) {
        if self.admin.get() != Some(self.env().caller()) {
            self.env().revert(LedgerError::Unauthorized);
        }
        self.minters.set(&minter, true);
        self.env().emit_event(MinterAuthorized { minter });
    }

    /// Move `amount` from the caller to `to`
    pub fn transfer(&mut self, to: Address, amount: U256) {
        let from = self.env().caller();
        self.debit(from, amount);
        self.credit(to, amount);
        self.env().emit_event(Transfer {
            from: Some(from),
            to: Some(to),
            amount,
        });
    }

    /// Create `amount` for `to`
    pub fn mint(&mut self, to: Address, amount: U256) {
        self.only_minter();
        self.credit(to, amount);
        let supply = self.total_supply() + amount;
        self.total_supply.set(supply);
        self.env().emit_event(Transfer {
            from: None,
            to: Some(to),
            amount,
        });
    }

    /// Destroy `amount` held by `from`
    pub fn burn(&mut self, from: Address, amount: U256) {
        self.only_minter();
        self.debit(from, amount);
        let supply = self.total_supply() - amount;
        self.total_supply.set(supply);
        self.env().emit_event(Transfer {
            from: Some(from),
            to: None,
            amount,
        });
    }
}

impl FyToken {
    fn only_minter(&self) {
        if !self.minters.get_or_default(&self.env().caller()) {
            self.env().revert(LedgerError::Unauthorized);
        }
    }

    fn debit(&mut self, owner: Address, amount: U256) {
        let balance = self.balance_of(owner);
        if balance < amount {
            self.env().revert(LedgerError::InsufficientBalance);
        }
        self.balances.set(&owner, balance - amount);
    }

    fn credit(&mut self, owner: Address, amount: U256) {
        let balance = self.balance_of(owner);
        let updated = balance
            .checked_add(amount)
            .unwrap_or_else(|| self.env().revert(LedgerError::MathOverflow));
        self.balances.set(&owner, updated);
    }
}

/// Holds the base asset paid out on redemption.
///
/// Token movements are outside the ledger; the pool only tracks what it
/// holds and what it released to whom.
#[odra::module(events = [Funded, Exited], errors = LedgerError)]
pub struct CustodyPool {
    asset: Var<Address>,
    admin: Var<Address>,
    operators: Mapping<Address, bool>,
    stored: Var<U256>,
    released: Mapping<Address, U256>,
}

#[odra::module]
impl CustodyPool {
    /// Initialize custody of `asset`
    pub fn init(&mut self, asset: Address) {
        self.asset.set(asset);
        self.admin.set(self.env().caller());
    }

    /// Allow `operator` to fund and release
    pub fn authorize(&mut self, operator: Address) {
        if !self.is_admin(self.env().caller()) {
            self.env().revert(LedgerError::Unauthorized);
        }
        self.operators.set(&operator, true);
    }

    /// Record a deposit into custody
    pub fn fund(&mut self, amount: U256) {
        self.only_operator();
        let stored = self
            .stored()
            .checked_add(amount)
            .unwrap_or_else(|| self.env().revert(LedgerError::MathOverflow));
        self.stored.set(stored);
        self.env().emit_event(Funded {
            from: self.env().caller(),
            amount,
        });
    }

    /// Release `amount` to `user`
    pub fn exit(&mut self, user: Address, amount: U256) -> U256 {
        if !self.operators.get_or_default(&self.env().caller()) {
            self.env().revert(LedgerError::Unauthorized);
        }
        let stored = self.stored();
        if stored < amount {
            self.env().revert(LedgerError::InsufficientCustody);
        }
        self.stored.set(stored - amount);
        let released = self.released(user) + amount;
        self.released.set(&user, released);
        self.env().emit_event(Exited { user, amount });
        amount
    }

    /// Custodied asset
    pub fn asset(&self) -> Option<Address> {
        self.asset.get()
    }

    /// Amount held
    pub fn stored(&self) -> U256 {
        self.stored.get_or_default()
    }

    /// Total released to `user`
    pub fn released(&self, user: Address) -> U256 {
        self.released.get_or_default(&user)
    }
}

impl CustodyPool {
    fn is_admin(&self, address: Address) -> bool {
        self.admin.get() == Some(address)
    }

    /// Admin or an authorized operator
    fn only_operator(&self) {
        let caller = self.env().caller();
        if !self.is_admin(caller) && !self.operators.get_or_default(&caller) {
            self.env().revert(LedgerError::Unauthorized);
        }
    }
}

/// Debt tokens moved; `None` marks mint or burn
#[odra::event]
pub struct Transfer {
    /// Sender, `None` on mint
    pub from: Option<Address>,
    /// Receiver, `None` on burn
    pub to: Option<Address>,
    /// Tokens moved
    pub amount: U256,
}

/// A minter was authorized
#[odra::event]
pub struct MinterAuthorized {
    /// Account allowed to mint and burn
    pub minter: Address,
}

/// Base was deposited into custody
#[odra::event]
pub struct Funded {
    /// Depositor
    pub from: Address,
    /// Base deposited
    pub amount: U256,
}

/// Base was released from custody
#[odra::event]
pub struct Exited {
    /// Receiver of the base
    pub user: Address,
    /// Base released
    pub amount: U256,
}
