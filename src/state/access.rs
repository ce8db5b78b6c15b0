//! Role grants

use odra::prelude::*;

use crate::error::LedgerError;
use crate::types::Role;

/// Explicit (role, account) grant table consulted by privileged entry points.
#[odra::module]
pub struct AccessTable {
    grants: Mapping<(Role, Address), bool>,
}

#[odra::module]
impl AccessTable {
    /// Whether `account` holds `role`
    pub fn has_role(&self, role: Role, account: Address) -> bool {
        self.grants.get_or_default(&(role, account))
    }
}

impl AccessTable {
    /// Grant `role` to `account`. Returns false if it was already held.
    pub fn grant(&mut self, role: Role, account: Address) -> bool {
        if self.has_role(role, account) {
            return false;
        }
        self.grants.set(&(role, account), true);
        true
    }

    /// Revoke `role` from `account`. Returns false if it was not held.
    pub fn revoke(&mut self, role: Role, account: Address) -> bool {
        if !self.has_role(role, account) {
            return false;
        }
        self.grants.set(&(role, account), false);
        true
    }

    /// Fail unless `account` holds `role`
    pub fn ensure(&self, role: Role, account: Address) -> Result<(), LedgerError> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized)
        }
    }
}
