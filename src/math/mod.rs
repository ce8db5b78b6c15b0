//! Fixed-point math for amounts, prices and accrual ratios.

pub mod common;
pub mod decimal;
pub mod rate;

pub use common::{TryAdd, TryDiv, TryMul, TrySub, WAD};
pub use decimal::Decimal;
pub use rate::Rate;
