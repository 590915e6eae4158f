//! Chain simulator core library
//!
//! An in-memory proof-of-work chain over an account ledger: blocks are
//! assembled from a shared mempool, mined against a difficulty that grows
//! with the number of mined blocks, and raced between two independent miners.

pub mod consensus;
pub mod crypto;
pub mod validation;
pub mod storage;
pub mod mining;
pub mod node;
pub mod config;
pub mod export;

/// Protocol defaults
pub mod constants {
    /// Leading zero hex digits required while fewer than `DIFFICULTY_STEP`
    /// blocks have been mined
    pub const BASE_DIFFICULTY: u32 = 3;

    /// Mined blocks per extra zero digit
    pub const DIFFICULTY_STEP: usize = 10;

    /// Maximum transactions accepted into one block
    pub const MAX_TXS_PER_BLOCK: usize = 100;

    /// Block count margin needed to declare a race winner
    pub const WIN_THRESHOLD: usize = 2;
}
