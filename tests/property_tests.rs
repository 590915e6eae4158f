//! Property-based and scenario tests for the chain simulator
//!
//! These tests verify ledger, merkle and difficulty invariants under random
//! inputs, plus end-to-end mining scenarios on small chains.

use proptest::prelude::*;
use chain_sim::config::SimConfig;
use chain_sim::consensus::{validate_chain, DifficultyRule};
use chain_sim::crypto::{compute_merkle_root, Blake3Oracle, DigestOracle, Sha256Oracle};
use chain_sim::mining::{assemble, decide_winner, Miner, MiningResult, NoncePolicy, Winner};
use chain_sim::node::{populate_simulated_chain, seed_state, WorkloadGenerator};
use chain_sim::storage::{Account, ChainState, Ledger, Mempool};
use chain_sim::validation::Transaction;
use std::sync::Arc;
use std::time::{Duration, Instant};

const EASY: DifficultyRule = DifficultyRule { base: 1, step: 10 };

fn easy_miner(label: &str) -> Miner {
    Miner::new(label, NoncePolicy::Sequential, Arc::new(Blake3Oracle)).with_rule(EASY)
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

proptest! {
    /// Spending never overdraws and removes exactly the amount spent
    #[test]
    fn prop_spend_preserves_sum(
        outputs in prop::collection::vec(1u64..10_000, 1..20),
        amount in 0u64..200_000,
    ) {
        let mut account = Account::new("user", "KEY");
        for output in &outputs {
            account.credit(*output);
        }
        let before = account.total_balance();
        let snapshot = account.clone();

        match account.spend(amount) {
            Ok(()) => {
                prop_assert!(amount <= before);
                prop_assert_eq!(account.total_balance(), before - amount);
                prop_assert!(account.utxos().iter().all(|v| *v > 0));
            }
            Err(_) => {
                prop_assert!(amount > before);
                prop_assert_eq!(account, snapshot);
            }
        }
    }

    /// Transfers only move value between known accounts
    #[test]
    fn prop_assembly_conserves_supply(seed in any::<u64>(), cap in 1usize..50) {
        let mut generator = WorkloadGenerator::from_seed(seed);
        let accounts = generator.accounts(8);
        let txs = generator.transactions(&accounts, 60);
        let ledger: Ledger = accounts.into_iter().collect();
        let mempool: Mempool = txs.into_iter().collect();

        if let Some(assembly) = assemble(&mempool, &ledger, cap) {
            prop_assert!(assembly.included.len() <= cap);
            prop_assert_eq!(assembly.snapshot.total_supply(), ledger.total_supply());
            prop_assert_eq!(
                assembly.used.iter().filter(|u| **u).count(),
                assembly.included.len()
            );
        }
    }

    /// Recomputing a merkle root from the same ids gives the same root
    #[test]
    fn prop_merkle_root_is_deterministic(ids in prop::collection::vec("[A-F0-9]{8}", 0..40)) {
        let oracle = Blake3Oracle;
        let first = compute_merkle_root(&oracle, &ids);
        let second = compute_merkle_root(&oracle, ids.iter());
        prop_assert_eq!(first, second);
        prop_assert_eq!(first.is_none(), ids.is_empty());
    }

    /// Difficulty is exactly base + mined / step
    #[test]
    fn prop_difficulty_formula(base in 0u32..8, step in 1usize..50, mined in 0usize..10_000) {
        let rule = DifficultyRule { base, step };
        prop_assert_eq!(rule.for_mined_count(mined), base + (mined / step) as u32);
    }

    /// Races are undecided exactly when the margin is below the threshold
    #[test]
    fn prop_winner_margin(a in 0usize..100, b in 0usize..100, threshold in 1usize..10) {
        let winner = decide_winner(a, b, threshold);
        if a.abs_diff(b) < threshold {
            prop_assert_eq!(winner, Winner::None);
        } else if a > b {
            prop_assert_eq!(winner, Winner::Miner1);
        } else {
            prop_assert_eq!(winner, Winner::Miner2);
        }
    }
}

// ============================================================================
// SCENARIO TESTS
// ============================================================================

#[test]
fn test_single_transfer_block() {
    let ledger: Ledger = [
        Account::with_balance("alice", "A", 10),
        Account::new("bob", "B"),
    ]
    .into_iter()
    .collect();
    let mempool: Mempool = [Transaction::new("T1", "A", "B", 5)].into_iter().collect();
    let mut state = ChainState::new(ledger, mempool);

    let result = easy_miner("solo").mine_one(&mut state, Instant::now() + Duration::from_secs(60));

    assert!(result.is_mined());
    assert_eq!(state.ledger().total_balance("A").unwrap(), 5);
    assert_eq!(state.ledger().total_balance("B").unwrap(), 5);
    assert!(state.mempool().is_empty());
    assert_eq!(state.chain().len(), 1);
    assert!(state.chain().blocks()[0].mined);
}

#[test]
fn test_unknown_senders_stay_pending() {
    let ledger: Ledger = [
        Account::with_balance("alice", "A", 1_000),
        Account::new("bob", "B"),
    ]
    .into_iter()
    .collect();

    let mut mempool = Mempool::new();
    for i in 0..250 {
        if i % 5 < 3 {
            mempool.push(Transaction::new(format!("U{i}"), "NOBODY", "B", 1));
        } else {
            mempool.push(Transaction::new(format!("T{i}"), "A", "B", 1));
        }
    }
    let mut state = ChainState::new(ledger, mempool);

    let result = easy_miner("solo").mine_one(&mut state, Instant::now() + Duration::from_secs(60));

    match result {
        MiningResult::Mined { transactions, .. } => assert_eq!(transactions, 100),
        other => panic!("expected a mined block, got {other:?}"),
    }
    assert_eq!(state.mempool().len(), 150);
    assert!(state.mempool().transactions().iter().all(|tx| tx.sender == "NOBODY"));
    assert_eq!(state.ledger().total_balance("B").unwrap(), 100);
}

#[test]
fn test_expired_deadline_leaves_state_untouched() {
    let ledger: Ledger = [
        Account::with_balance("alice", "A", 10),
        Account::new("bob", "B"),
    ]
    .into_iter()
    .collect();
    let mempool: Mempool = [Transaction::new("T1", "A", "B", 5)].into_iter().collect();
    let mut state = ChainState::new(ledger, mempool);
    let before = state.clone();

    let miner = Miner::new("solo", NoncePolicy::Random, Arc::new(Blake3Oracle));
    let result = miner.mine_one(&mut state, Instant::now());

    assert_eq!(result, MiningResult::DeadlineExceeded);
    assert_eq!(state, before);
}

#[test]
fn test_winner_codes() {
    assert_eq!(decide_winner(5, 2, 2).code(), 1);
    assert_eq!(decide_winner(5, 4, 2).code(), 0);
}

#[test]
fn test_single_transaction_merkle_root() {
    for oracle in [&Blake3Oracle as &dyn DigestOracle, &Sha256Oracle] {
        assert_eq!(
            compute_merkle_root(oracle, ["ABC"]),
            Some(oracle.digest(b"ABC"))
        );
    }
}

#[test]
fn test_session_links_blocks() {
    let oracle = Blake3Oracle;
    let mut generator = WorkloadGenerator::from_seed(42);
    let accounts = generator.accounts(20);
    let mut txs = generator.transactions(&accounts, 400);
    let backlog = txs.split_off(300);
    let ledger: Ledger = accounts.into_iter().collect();
    let supply = ledger.total_supply();
    let mut state = ChainState::new(ledger, txs.into_iter().collect());

    populate_simulated_chain(&mut state, &backlog, 2, 50, &EASY, &oracle);
    assert_eq!(state.mempool().len(), 300);
    let summary = easy_miner("solo")
        .with_max_transactions(50)
        .mine_until(&mut state, Instant::now() + Duration::from_secs(30));

    assert!(summary.blocks_mined > 0);
    assert_eq!(state.chain().mined_count(), summary.blocks_mined);

    let blocks = state.chain().blocks();
    assert!(blocks[0].header.prev_hash.is_none());
    for pair in blocks.windows(2) {
        assert_eq!(pair[1].header.prev_hash, Some(pair[0].hash(&oracle)));
    }
    assert!(validate_chain(state.chain(), &EASY, &oracle).is_ok());
    assert_eq!(state.ledger().total_supply(), supply);
}

#[test]
fn test_seeded_default_run_mines() {
    let config = SimConfig::default();
    let oracle = config.oracle();
    let workload = WorkloadGenerator::from_seed(1).workload(&config);
    let mut state = seed_state(workload, &config, oracle.as_ref());
    let pending = state.mempool().len();

    let miner = Miner::new("solo", NoncePolicy::Sequential, oracle.clone())
        .with_max_transactions(config.max_transactions_per_block)
        .with_rule(config.rule());
    let result = miner.mine_one(&mut state, Instant::now() + Duration::from_secs(60));

    assert!(result.is_mined(), "{result:?}");
    assert_eq!(state.chain().mined_count(), 1);
    assert_eq!(state.mempool().len(), pending - config.max_transactions_per_block);
}
