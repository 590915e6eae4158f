//! Two-miner race
//!
//! Each worker mines on its own copy of the chain state for a fixed wall
//! clock budget. The workers share nothing but the deadline; each keeps its
//! own block counter, read only after both have finished.

use crate::consensus::DifficultyRule;
use crate::constants::{MAX_TXS_PER_BLOCK, WIN_THRESHOLD};
use crate::crypto::SharedOracle;
use crate::mining::{Miner, MiningResult, NoncePolicy};
use crate::storage::{Chain, ChainState};
use log::info;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Label of the sequential-nonce worker
pub const MINER_1_LABEL: &str = "miner 1";
/// Label of the random-nonce worker
pub const MINER_2_LABEL: &str = "miner 2";

/// Competition errors
#[derive(Debug, Error)]
pub enum MiningError {
    #[error("Mining worker {label} failed: {source}")]
    WorkerFailed {
        label: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Race outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Winner {
    /// Block counts too close to call
    None,
    Miner1,
    Miner2,
}

impl Winner {
    /// Numeric code: 0 for no winner, otherwise the worker number
    pub fn code(self) -> u8 {
        match self {
            Winner::None => 0,
            Winner::Miner1 => 1,
            Winner::Miner2 => 2,
        }
    }
}

/// Declare a winner only when the counts differ by at least `threshold`
pub fn decide_winner(first: usize, second: usize, threshold: usize) -> Winner {
    if first.abs_diff(second) < threshold {
        Winner::None
    } else if first > second {
        Winner::Miner1
    } else {
        Winner::Miner2
    }
}

/// What one worker produced
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub label: &'static str,
    pub policy: NoncePolicy,
    pub blocks_mined: usize,
    /// The worker's private state after the race
    pub state: ChainState,
}

impl WorkerReport {
    /// The worker's chain
    pub fn chain(&self) -> &Chain {
        self.state.chain()
    }
}

/// Result of a full race
#[derive(Debug, Clone)]
pub struct CompetitionReport {
    pub winner: Winner,
    pub miner1: WorkerReport,
    pub miner2: WorkerReport,
}

/// Race configuration
#[derive(Clone)]
pub struct Competition {
    duration: Duration,
    win_threshold: usize,
    max_transactions: usize,
    rule: DifficultyRule,
    oracle: SharedOracle,
}

impl Competition {
    /// Create a race with the default threshold, block size and schedule
    pub fn new(duration: Duration, oracle: SharedOracle) -> Self {
        Self {
            duration,
            win_threshold: WIN_THRESHOLD,
            max_transactions: MAX_TXS_PER_BLOCK,
            rule: DifficultyRule::default(),
            oracle,
        }
    }

    /// Override the winning margin
    pub fn with_win_threshold(mut self, win_threshold: usize) -> Self {
        self.win_threshold = win_threshold;
        self
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

    fn miner(&self, label: &'static str, policy: NoncePolicy) -> Miner {
        Miner::new(label, policy, Arc::clone(&self.oracle))
            .with_max_transactions(self.max_transactions)
            .with_rule(self.rule)
    }

    /// Run both workers on copies of `state`. `state` itself is not touched.
    pub async fn run(&self, state: &ChainState) -> Result<CompetitionReport, MiningError> {
        let deadline = Instant::now() + self.duration;
        let counter1 = Arc::new(AtomicUsize::new(0));
        let counter2 = Arc::new(AtomicUsize::new(0));

        let worker1 = {
            let miner = self.miner(MINER_1_LABEL, NoncePolicy::Sequential);
            let state = state.clone();
            let counter = Arc::clone(&counter1);
            tokio::task::spawn_blocking(move || run_worker(&miner, state, deadline, &counter))
        };
        let worker2 = {
            let miner = self.miner(MINER_2_LABEL, NoncePolicy::Random);
            let state = state.clone();
            let counter = Arc::clone(&counter2);
            tokio::task::spawn_blocking(move || run_worker(&miner, state, deadline, &counter))
        };

        let (state1, state2) = tokio::join!(worker1, worker2);
        let state1 = state1.map_err(|source| MiningError::WorkerFailed {
            label: MINER_1_LABEL,
            source,
        })?;
        let state2 = state2.map_err(|source| MiningError::WorkerFailed {
            label: MINER_2_LABEL,
            source,
        })?;

        let mined1 = counter1.load(Ordering::SeqCst);
        let mined2 = counter2.load(Ordering::SeqCst);
        let winner = decide_winner(mined1, mined2, self.win_threshold);

        info!(
            "Competition finished: {} mined {}, {} mined {}, winner code {}",
            MINER_1_LABEL,
            mined1,
            MINER_2_LABEL,
            mined2,
            winner.code()
        );

        Ok(CompetitionReport {
            winner,
            miner1: WorkerReport {
                label: MINER_1_LABEL,
                policy: NoncePolicy::Sequential,
                blocks_mined: mined1,
                state: state1,
            },
            miner2: WorkerReport {
                label: MINER_2_LABEL,
                policy: NoncePolicy::Random,
                blocks_mined: mined2,
                state: state2,
            },
        })
    }
}

/// Mine until the local mempool drains or the deadline passes
fn run_worker(
    miner: &Miner,
    mut state: ChainState,
    deadline: Instant,
    counter: &AtomicUsize,
) -> ChainState {
    while !state.mempool().is_empty() && Instant::now() < deadline {
        match miner.mine_one(&mut state, deadline) {
            MiningResult::Mined { .. } => {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            MiningResult::DeadlineExceeded | MiningResult::EmptyMempool => {}
            MiningResult::NoIncludableTransactions | MiningResult::Interrupted => break,
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::validate_chain;
    use crate::crypto::Blake3Oracle;
    use crate::storage::{Account, Ledger, Mempool};
    use crate::validation::Transaction;

    #[test]
    fn test_decide_winner() {
        assert_eq!(decide_winner(5, 2, 2), Winner::Miner1);
        assert_eq!(decide_winner(5, 4, 2), Winner::None);
        assert_eq!(decide_winner(1, 3, 2), Winner::Miner2);
        assert_eq!(decide_winner(0, 0, 2), Winner::None);
        assert_eq!(decide_winner(3, 3, 0), Winner::Miner2);
        assert_eq!(Winner::Miner1.code(), 1);
        assert_eq!(Winner::None.code(), 0);
    }

    fn state() -> ChainState {
        let ledger: Ledger = [
            Account::with_balance("a", "A", 1_000),
            Account::new("b", "B"),
        ]
        .into_iter()
        .collect();
        let mempool: Mempool = (0..20)
            .map(|i| Transaction::new(format!("T{i}"), "A", "B", 10))
            .collect();
        ChainState::new(ledger, mempool)
    }

    #[tokio::test]
    async fn test_race_leaves_caller_state_alone() {
        let rule = DifficultyRule { base: 1, step: 10 };
        let original = state();
        let snapshot = original.clone();

        let report = Competition::new(Duration::from_millis(500), Arc::new(Blake3Oracle))
            .with_max_transactions(2)
            .with_rule(rule)
            .run(&original)
            .await
            .unwrap();

        assert_eq!(original, snapshot);

        for worker in [&report.miner1, &report.miner2] {
            assert_eq!(worker.chain().len(), worker.blocks_mined);
            assert!(validate_chain(worker.chain(), &rule, &Blake3Oracle).is_ok());
            assert_eq!(worker.state.ledger().total_supply(), 1_000);
        }
        assert_eq!(
            report.winner,
            decide_winner(report.miner1.blocks_mined, report.miner2.blocks_mined, WIN_THRESHOLD)
        );
    }

    #[tokio::test]
    async fn test_race_with_no_time() {
        let report = Competition::new(Duration::ZERO, Arc::new(Blake3Oracle))
            .run(&state())
            .await
            .unwrap();

        assert_eq!(report.miner1.blocks_mined, 0);
        assert_eq!(report.miner2.blocks_mined, 0);
        assert_eq!(report.winner, Winner::None);
        assert_eq!(report.miner1.state, state());
    }
}
