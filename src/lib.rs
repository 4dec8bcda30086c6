//! Generator and checker for Contract Secured Revenue state test fixtures.

pub mod bytecode;
pub mod eip6968;
pub mod error;
pub mod filler;
pub mod fork;
pub mod hash;
pub mod transaction;
pub mod types;
