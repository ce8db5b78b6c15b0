//! Storage modules owned by the ledger

pub mod access;
pub mod assets;
pub mod limits;
pub mod oracles;
pub mod series;
pub mod vault;

pub use access::*;
pub use assets::*;
pub use limits::*;
pub use oracles::*;
pub use series::*;
pub use vault::*;
