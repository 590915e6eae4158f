//! Block structure
//!
//! Defines the block, its header, and the flat record used for reporting.

use serde::{Deserialize, Serialize};
use crate::crypto::{compute_merkle_root, hex_or_empty, DigestOracle, Hash};
use crate::validation::Transaction;

/// Header version written into every new block
pub const BLOCK_VERSION: u32 = 1;

/// Block header containing all metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockHeader {
    /// Protocol version
    pub version: u32,
    /// Hash of the previous block, `None` for the first block
    pub prev_hash: Option<Hash>,
    /// Merkle root of the transaction ids, `None` when there are none
    pub merkle_root: Option<Hash>,
    /// Block timestamp (seconds since Unix epoch)
    pub timestamp: u64,
    /// Required number of leading zero hex digits
    pub difficulty_target: u32,
    /// Nonce used for PoW
    pub nonce: u64,
}

impl BlockHeader {
    /// Text that is hashed for a given nonce: prev ++ merkle ++ timestamp ++ nonce
    pub fn preimage(&self, nonce: u64) -> String {
        format!(
            "{}{}{}{}",
            hex_or_empty(self.prev_hash.as_ref()),
            hex_or_empty(self.merkle_root.as_ref()),
            self.timestamp,
            nonce
        )
    }

    /// Calculate the hash of this header with its own nonce
    pub fn hash(&self, oracle: &dyn DigestOracle) -> Hash {
        oracle.digest(self.preimage(self.nonce).as_bytes())
    }
}

/// A complete block containing header and transactions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Block {
    /// Block header
    pub header: BlockHeader,
    /// Transactions in inclusion order
    pub transactions: Vec<Transaction>,
    /// Set once the block passed the proof-of-work search
    pub mined: bool,
}

impl Block {
    /// Create an unmined block; the merkle root is derived from `transactions`
    pub fn new(
        oracle: &dyn DigestOracle,
        prev_hash: Option<Hash>,
        transactions: Vec<Transaction>,
        difficulty_target: u32,
        timestamp: u64,
    ) -> Self {
        let merkle_root = compute_merkle_root(oracle, transactions.iter().map(|tx| &tx.id));
        Self {
            header: BlockHeader {
                version: BLOCK_VERSION,
                prev_hash,
                merkle_root,
                timestamp,
                difficulty_target,
                nonce: 0,
            },
            transactions,
            mined: false,
        }
    }

    /// Get the block hash
    pub fn hash(&self, oracle: &dyn DigestOracle) -> Hash {
        self.header.hash(oracle)
    }

    /// Check if this is the first block of a chain
    pub fn is_genesis(&self) -> bool {
        self.header.prev_hash.is_none()
    }

    /// Ids of the included transactions, in order
    pub fn transaction_ids(&self) -> Vec<String> {
        self.transactions.iter().map(|tx| tx.id.clone()).collect()
    }

    /// Flatten into an export record
    pub fn to_record(&self, index: usize, miner: &str, oracle: &dyn DigestOracle) -> BlockRecord {
        BlockRecord {
            index,
            miner: miner.to_string(),
            mined: self.mined,
            nonce: self.header.nonce,
            timestamp: self.header.timestamp,
            previous_hash: hex_or_empty(self.header.prev_hash.as_ref()),
            merkle_root: hex_or_empty(self.header.merkle_root.as_ref()),
            hash: self.hash(oracle).to_hex(),
            transaction_count: self.transactions.len(),
            transaction_ids: self.transaction_ids(),
        }
    }
}

/// Flat block form handed to reporting and export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub index: usize,
    pub miner: String,
    pub mined: bool,
    pub nonce: u64,
    pub timestamp: u64,
    pub previous_hash: String,
    pub merkle_root: String,
    pub hash: String,
    pub transaction_count: usize,
    pub transaction_ids: Vec<String>,
}
