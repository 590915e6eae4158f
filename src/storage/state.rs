//! Chain state management
//!
//! Bundles the chain, the account ledger and the mempool. The three always
//! move together: a block is appended in the same call that installs its
//! ledger effects and drops its transactions from the mempool.

use serde::{Deserialize, Serialize};
use crate::consensus::{Block, DifficultyRule};
use crate::crypto::{DigestOracle, Hash};
use super::{Chain, Ledger, Mempool};

/// Complete simulation state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
    chain: Chain,
    ledger: Ledger,
    mempool: Mempool,
}

impl ChainState {
    /// Create a state with an empty chain
    pub fn new(ledger: Ledger, mempool: Mempool) -> Self {
        Self {
            chain: Chain::new(),
            ledger,
            mempool,
        }
    }

    /// Committed blocks
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Live ledger
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Pending transactions
    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    /// Commit a block together with its ledger snapshot.
    ///
    /// `used` marks the mempool positions whose transactions went into
    /// `block`.
    pub(crate) fn commit(&mut self, block: Block, snapshot: Ledger, used: &[bool]) {
        self.chain.push(block);
        self.ledger = snapshot;
        self.mempool.remove_used(used);
    }

    /// Append a block built outside the mempool. Only the chain and the
    /// ledger advance.
    pub(crate) fn append_unmined(&mut self, block: Block, snapshot: Ledger) {
        self.chain.push(block);
        self.ledger = snapshot;
    }

    /// Get statistics about the chain state
    pub fn get_stats(&self, rule: &DifficultyRule, oracle: &dyn DigestOracle) -> ChainStats {
        ChainStats {
            height: self.chain.len(),
            mined_blocks: self.chain.mined_count(),
            tip_hash: self.chain.tip_hash(oracle),
            difficulty: rule.required_zeros(&self.chain),
            pending: self.mempool.len(),
            accounts: self.ledger.len(),
            total_supply: self.ledger.total_supply(),
        }
    }
}

/// Statistics about the chain state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainStats {
    pub height: usize,
    pub mined_blocks: usize,
    pub tip_hash: Option<Hash>,
    pub difficulty: u32,
    pub pending: usize,
    pub accounts: usize,
    pub total_supply: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Blake3Oracle;
    use crate::storage::Account;
    use crate::validation::Transaction;

    #[test]
    fn test_commit_moves_all_three() {
        let oracle = Blake3Oracle;
        let ledger: Ledger = [Account::with_balance("a", "A", 10), Account::new("b", "B")]
            .into_iter()
            .collect();
        let mempool: Mempool = [
            Transaction::new("T1", "A", "B", 5),
            Transaction::new("T2", "X", "B", 5),
        ]
        .into_iter()
        .collect();
        let mut state = ChainState::new(ledger, mempool);

        let mut snapshot = state.ledger().clone();
        snapshot.spend("A", 5).unwrap();
        snapshot.credit("B", 5).unwrap();
        let block = Block::new(&oracle, None, vec![state.mempool().transactions()[0].clone()], 3, 0);

        state.commit(block, snapshot, &[true, false]);

        assert_eq!(state.chain().len(), 1);
        assert_eq!(state.ledger().total_balance("B").unwrap(), 5);
        assert_eq!(state.mempool().transactions()[0].id, "T2");

        let stats = state.get_stats(&DifficultyRule::default(), &oracle);
        assert_eq!(stats.height, 1);
        assert_eq!(stats.mined_blocks, 0);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.total_supply, 10);
        assert_eq!(stats.difficulty, 3);
    }
}
