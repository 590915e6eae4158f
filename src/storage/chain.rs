//! Append-only block chain

use serde::{Deserialize, Serialize};
use crate::consensus::{Block, BlockRecord};
use crate::crypto::{DigestOracle, Hash};

/// Ordered sequence of committed blocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// Create an empty chain
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Append a block. Linkage is the caller's responsibility.
    pub(crate) fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Blocks in chain order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Last block, if any
    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Hash the next block must reference as its previous hash
    pub fn tip_hash(&self, oracle: &dyn DigestOracle) -> Option<Hash> {
        self.tip().map(|block| block.hash(oracle))
    }

    /// Number of blocks that passed proof of work
    pub fn mined_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.mined).count()
    }

    /// Flatten every block into an export record
    pub fn records(&self, miner: &str, oracle: &dyn DigestOracle) -> Vec<BlockRecord> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| block.to_record(index, miner, oracle))
            .collect()
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
