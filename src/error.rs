//! Error types

use core::fmt;
use odra::prelude::*;

/// Errors that may be returned by the ledger and its collaborator modules.
///
/// Codes are stable and grouped by kind, ten per block.
#[odra::odra_error]
pub enum LedgerError {
    // 0 - configuration
    /// Identifier is the all-zero value
    IdZero = 0,
    /// Identifier is already registered
    IdInUse = 1,
    /// Base asset is not registered
    BaseNotFound = 2,
    /// Ilk asset is not registered
    IlkNotFound = 3,
    /// Series is not registered
    SeriesNotFound = 4,
    /// Series was added without a debt token
    SeriesNeedsDebtToken = 5,
    /// Debt token underlying differs from the base asset
    MismatchedBase = 6,
    /// No rate oracle bound for the base
    RateOracleMissing = 7,
    /// No spot oracle bound for the base and ilk
    SpotOracleMissing = 8,
    /// Ilk is not approved for the series
    IlkNotApproved = 9,

    // 10 - configuration (lookups)
    /// Vault does not exist
    VaultNotFound = 10,
    /// No custody bound for the base
    CustodyNotFound = 11,
    /// Oracle has no source or path for the pair
    SourceNotFound = 12,

    // 20 - authorization
    /// Caller is not the vault owner
    OnlyOwner = 20,
    /// Caller lacks the required role
    Unauthorized = 21,

    // 30 - limits
    /// Debt ceiling for the base and ilk exceeded
    MaxDebtExceeded = 30,
    /// Vault debt is below the dust threshold
    MinDebtNotReached = 31,

    // 40 - safety
    /// Collateral value is below the required value
    Undercollateralized = 40,

    // 50 - state
    /// Series has not reached maturity yet
    TooEarly = 50,
    /// Series maturity was already recorded
    AlreadyMatured = 51,
    /// Series maturity has not been recorded
    NotMature = 52,
    /// Vault still holds collateral or debt
    VaultNotEmpty = 53,
    /// Balance would become negative
    ResultBelowZero = 54,
    /// Math operation overflow
    MathOverflow = 55,

    // 60 - staleness
    /// Oracle reported an update time in the future
    InvalidUpdateTime = 60,

    // 70 - collaborators
    /// Token balance too low
    InsufficientBalance = 70,
    /// Custody holds less than requested
    InsufficientCustody = 71,
}

impl LedgerError {
    /// Human readable description of the error.
    pub fn message(&self) -> &str {
        match self {
            LedgerError::IdZero => "Id must not be zero",
            LedgerError::IdInUse => "Id already used",
            LedgerError::BaseNotFound => "Base not found",
            LedgerError::IlkNotFound => "Ilk not found",
            LedgerError::SeriesNotFound => "Series not found",
            LedgerError::SeriesNeedsDebtToken => "Series need a debt token",
            LedgerError::MismatchedBase => "Mismatched series and base",
            LedgerError::RateOracleMissing => "Rate oracle not found",
            LedgerError::SpotOracleMissing => "Spot oracle not found",
            LedgerError::IlkNotApproved => "Ilk not added to series",
            LedgerError::VaultNotFound => "Vault not found",
            LedgerError::CustodyNotFound => "Custody not found",
            LedgerError::SourceNotFound => "Source not found",
            LedgerError::OnlyOwner => "Only vault owner",
            LedgerError::Unauthorized => "Access denied",
            LedgerError::MaxDebtExceeded => "Max debt exceeded",
            LedgerError::MinDebtNotReached => "Min debt not reached",
            LedgerError::Undercollateralized => "Undercollateralized",
            LedgerError::TooEarly => "Only after maturity",
            LedgerError::AlreadyMatured => "Already matured",
            LedgerError::NotMature => "Not mature",
            LedgerError::VaultNotEmpty => "Only empty vaults",
            LedgerError::ResultBelowZero => "Result below zero",
            LedgerError::MathOverflow => "Math operation overflow",
            LedgerError::InvalidUpdateTime => "Invalid updateTime",
            LedgerError::InsufficientBalance => "Insufficient balance",
            LedgerError::InsufficientCustody => "Insufficient custody",
        }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
