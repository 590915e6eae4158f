//! Validation module - transactions and participant checks

mod transaction;

pub use transaction::*;
