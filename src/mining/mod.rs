//! Mining module - block assembly, nonce search, mining steps and races

mod assembler;
mod pow;
mod miner;
mod competition;

pub use assembler::*;
pub use pow::*;
pub use miner::*;
pub use competition::*;
