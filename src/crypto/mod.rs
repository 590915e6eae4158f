//! Cryptography module - pluggable digest oracle and Merkle roots

mod hash;
mod merkle;

pub use hash::*;
pub use merkle::*;
