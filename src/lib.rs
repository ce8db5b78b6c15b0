#![allow(clippy::arithmetic_side_effects)]
#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]

//! A maturity-dated collateralized debt ledger for the casper blockchain.

pub mod error;
pub mod feeds;
pub mod interfaces;
pub mod math;
pub mod oracle;
pub mod processor;
pub mod state;
pub mod tokens;
pub mod types;

pub use error::LedgerError;
pub use feeds::{AccrualFeed, PriceFeed};
pub use oracle::CompositeOracle;
pub use processor::Ledger;
pub use tokens::{CustodyPool, FyToken};

extern crate alloc;
