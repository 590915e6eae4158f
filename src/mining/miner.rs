//! Block miner implementation
//!
//! Assembles candidate blocks and performs PoW. A mining step either commits
//! a block with all of its effects or leaves the state exactly as it was.

use crate::consensus::{Block, DifficultyRule};
use crate::constants::MAX_TXS_PER_BLOCK;
use crate::crypto::{Hash, SharedOracle};
use crate::mining::{assemble, search_nonce, NoncePolicy, SearchResult};
use crate::storage::ChainState;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Mining result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiningResult {
    /// A block was mined and committed
    Mined {
        index: usize,
        hash: Hash,
        nonce: u64,
        attempts: u64,
        transactions: usize,
    },
    /// Nothing pending
    EmptyMempool,
    /// Pending transactions exist but none is payable
    NoIncludableTransactions,
    /// Deadline passed before a nonce was found
    DeadlineExceeded,
    /// Mining was interrupted
    Interrupted,
}

impl MiningResult {
    /// Whether a block was committed
    pub fn is_mined(&self) -> bool {
        matches!(self, MiningResult::Mined { .. })
    }
}

/// Summary of a mining session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Blocks committed during the session
    pub blocks_mined: usize,
    /// The step result that ended the session
    pub ended_by: MiningResult,
}

/// Block miner
///
/// A clone shares the configuration and oracle but gets its own stop
/// signal; use [`Miner::stop_signal`] to stop several searches together.
pub struct Miner {
    /// Label attached to logs and exported records
    label: String,
    /// Nonce selection policy
    policy: NoncePolicy,
    /// Maximum transactions per block
    max_transactions: usize,
    /// Difficulty schedule
    rule: DifficultyRule,
    /// Digest oracle
    oracle: SharedOracle,
    /// Stop signal
    stop_signal: Arc<AtomicBool>,
}

impl Clone for Miner {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            policy: self.policy,
            max_transactions: self.max_transactions,
            rule: self.rule,
            oracle: Arc::clone(&self.oracle),
            stop_signal: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Miner {
    /// Create a new miner with the default block size and difficulty schedule
    pub fn new(label: impl Into<String>, policy: NoncePolicy, oracle: SharedOracle) -> Self {
        Self {
            label: label.into(),
            policy,
            max_transactions: MAX_TXS_PER_BLOCK,
            rule: DifficultyRule::default(),
            oracle,
            stop_signal: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Override the per-block transaction cap
    pub fn with_max_transactions(mut self, max_transactions: usize) -> Self {
        self.max_transactions = max_transactions;
        self
    }

    /// Override the difficulty schedule
    pub fn with_rule(mut self, rule: DifficultyRule) -> Self {
        self.rule = rule;
        self
    }

    /// Miner label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Nonce selection policy
    pub fn policy(&self) -> NoncePolicy {
        self.policy
    }

    /// Get a stop signal handle
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Stop mining
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Reset stop signal
    pub fn reset(&self) {
        self.stop_signal.store(false, Ordering::SeqCst);
    }

    /// Mine one block on top of `state`, giving up at `deadline`.
    pub fn mine_one(&self, state: &mut ChainState, deadline: Instant) -> MiningResult {
        if state.mempool().is_empty() {
            return MiningResult::EmptyMempool;
        }

        let Some(assembly) = assemble(state.mempool(), state.ledger(), self.max_transactions)
        else {
            debug!("[{}] no includable transactions in {} pending", self.label, state.mempool().len());
            return MiningResult::NoIncludableTransactions;
        };

        let oracle = self.oracle.as_ref();
        let difficulty = self.rule.required_zeros(state.chain());
        let mut block = Block::new(
            oracle,
            state.chain().tip_hash(oracle),
            assembly.included,
            difficulty,
            unix_timestamp(),
        );

        let (nonce, hash, attempts) = match search_nonce(
            oracle,
            &block.header,
            difficulty,
            self.policy,
            deadline,
            Some(&self.stop_signal),
        ) {
            SearchResult::Found { nonce, hash, attempts } => (nonce, hash, attempts),
            SearchResult::DeadlineExceeded { attempts } => {
                debug!("[{}] deadline passed after {} attempts", self.label, attempts);
                return MiningResult::DeadlineExceeded;
            }
            SearchResult::Interrupted { .. } => return MiningResult::Interrupted,
        };

        block.header.nonce = nonce;
        block.mined = true;
        let transactions = block.transactions.len();
        let index = state.chain().len();

        state.commit(block, assembly.snapshot, &assembly.used);

        info!(
            "[{}] Mined block {} with nonce {} producing hash {} ({} tx, difficulty {})",
            self.label, index, nonce, hash, transactions, difficulty
        );

        MiningResult::Mined {
            index,
            hash,
            nonce,
            attempts,
            transactions,
        }
    }

    /// Mine repeatedly until the deadline passes or no block can be built.
    pub fn mine_until(&self, state: &mut ChainState, deadline: Instant) -> SessionSummary {
        let mut blocks_mined = 0;
        loop {
            let result = self.mine_one(state, deadline);
            if result.is_mined() {
                blocks_mined += 1;
                continue;
            }
            return SessionSummary {
                blocks_mined,
                ended_by: result,
            };
        }
    }
}

/// Current time in seconds since the Unix epoch
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
